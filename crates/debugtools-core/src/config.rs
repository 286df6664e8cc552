//! Logger configuration loaded from TOML.
//!
//! ```toml
//! label = "com.example.app"
//! level = "debug"
//! failure_policy = "continue"
//!
//! [metadata]
//! env = "staging"
//!
//! [[sinks]]
//! kind = "console"
//! stream = "stdout"
//!
//! [[sinks]]
//! kind = "oslog"
//! category = "network"
//!
//! [[sinks]]
//! kind = "jsonl"
//! dir = "./logs"
//! ```
//!
//! Sinks are built in the order listed, which is also the dispatch order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::handler::{FailurePolicy, MultiLogHandler};
use crate::level::LogLevel;
use crate::metadata::metadata_from_toml;
use crate::provider::MetadataProvider;
use crate::sink::LogSink;
use crate::sinks::{
    ConsoleSink, ConsoleStream, JsonlSink, MemorySink, OsLogHandler, StreamDestination,
    TracingSink,
};

fn default_category() -> String {
    "OSLogHandler".to_string()
}

fn default_capacity() -> usize {
    crate::sinks::memory::DEFAULT_CAPACITY
}

/// One configured sink.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SinkConfig {
    Console {
        #[serde(default)]
        stream: ConsoleStream,
    },
    Oslog {
        /// Defaults to the logger label
        #[serde(default)]
        subsystem: Option<String>,
        #[serde(default = "default_category")]
        category: String,
    },
    Jsonl {
        dir: PathBuf,
        /// Defaults to the logger label
        #[serde(default)]
        instance: Option<String>,
    },
    Memory {
        #[serde(default = "default_capacity")]
        capacity: usize,
    },
    Tracing,
}

impl SinkConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            SinkConfig::Console { .. } => "console",
            SinkConfig::Oslog { .. } => "oslog",
            SinkConfig::Jsonl { .. } => "jsonl",
            SinkConfig::Memory { .. } => "memory",
            SinkConfig::Tracing => "tracing",
        }
    }

    fn build(&self, label: &str) -> Result<Arc<dyn LogSink>, ConfigError> {
        let sink: Arc<dyn LogSink> = match self {
            SinkConfig::Console { stream } => Arc::new(ConsoleSink::new(*stream)),
            SinkConfig::Oslog {
                subsystem,
                category,
            } => {
                let subsystem = subsystem.clone().unwrap_or_else(|| label.to_string());
                let destination = StreamDestination::stderr(subsystem, category.clone());
                Arc::new(OsLogHandler::with_destination(label, Arc::new(destination)))
            }
            SinkConfig::Jsonl { dir, instance } => {
                let instance = instance.clone().unwrap_or_else(|| label.to_string());
                let sink = JsonlSink::new(dir, instance).map_err(|source| {
                    ConfigError::SinkInit {
                        kind: self.kind().to_string(),
                        source,
                    }
                })?;
                Arc::new(sink)
            }
            SinkConfig::Memory { capacity } => Arc::new(MemorySink::with_capacity(label, *capacity)),
            SinkConfig::Tracing => Arc::new(TracingSink::new()),
        };
        Ok(sink)
    }
}

/// Complete configuration for a [`MultiLogHandler`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggerConfig {
    pub label: String,

    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Handler-level default metadata
    #[serde(default)]
    pub metadata: toml::Table,

    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

impl LoggerConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LoggerConfig = toml::from_str(content)?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Semantic checks. Every problem is reported, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.label.trim().is_empty() {
            errors.push("label must not be empty".to_string());
        }

        for (i, sink) in self.sinks.iter().enumerate() {
            match sink {
                SinkConfig::Memory { capacity: 0 } => {
                    errors.push(format!("sinks[{}]: memory capacity must be greater than 0", i));
                }
                SinkConfig::Jsonl { dir, instance } => {
                    if dir.as_os_str().is_empty() {
                        errors.push(format!("sinks[{}]: jsonl dir must not be empty", i));
                    }
                    if instance.as_deref().map(str::trim) == Some("") {
                        errors.push(format!("sinks[{}]: jsonl instance must not be empty", i));
                    }
                }
                SinkConfig::Oslog { category, .. } if category.trim().is_empty() => {
                    errors.push(format!("sinks[{}]: oslog category must not be empty", i));
                }
                _ => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn build(&self) -> Result<MultiLogHandler, ConfigError> {
        self.build_with_provider(None)
    }

    /// Build the handler, opening every sink in order.
    pub fn build_with_provider(
        &self,
        provider: Option<MetadataProvider>,
    ) -> Result<MultiLogHandler, ConfigError> {
        self.validate().map_err(ConfigError::Validation)?;

        let sinks = self
            .sinks
            .iter()
            .map(|sink| sink.build(&self.label))
            .collect::<Result<Vec<_>, _>>()?;

        let handler = match provider {
            Some(provider) => MultiLogHandler::with_metadata_provider(&self.label, sinks, provider),
            None => MultiLogHandler::new(&self.label, sinks),
        };

        tracing::debug!(
            label = %self.label,
            sinks = self.sinks.len(),
            level = %self.level,
            "Built log handler"
        );

        Ok(handler
            .with_log_level(self.level)
            .with_failure_policy(self.failure_policy)
            .with_metadata(metadata_from_toml(self.metadata.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataValue;
    use crate::sink::LogHandler;
    use tempfile::TempDir;

    const FULL: &str = r#"
        label = "com.example.app"
        level = "debug"
        failure_policy = "stop_on_first"

        [metadata]
        env = "staging"
        attempt = 3
        tags = ["a", "b"]

        [[sinks]]
        kind = "console"
        stream = "stdout"

        [[sinks]]
        kind = "oslog"

        [[sinks]]
        kind = "memory"
        capacity = 10

        [[sinks]]
        kind = "tracing"
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = LoggerConfig::from_toml_str(FULL).unwrap();

        assert_eq!(config.label, "com.example.app");
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.failure_policy, FailurePolicy::StopOnFirst);
        assert_eq!(config.sinks.len(), 4);
        assert_eq!(
            config.sinks[0],
            SinkConfig::Console {
                stream: ConsoleStream::Stdout
            }
        );
        assert_eq!(
            config.sinks[1],
            SinkConfig::Oslog {
                subsystem: None,
                category: "OSLogHandler".to_string()
            }
        );
    }

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::from_toml_str(r#"label = "app""#).unwrap();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert!(config.sinks.is_empty());
    }

    #[test]
    fn test_build_applies_settings_in_order() {
        let config = LoggerConfig::from_toml_str(FULL).unwrap();
        let handler = config.build().unwrap();

        assert_eq!(handler.log_level(), LogLevel::Debug);
        assert_eq!(handler.failure_policy(), FailurePolicy::StopOnFirst);
        assert_eq!(
            handler.sink_names(),
            vec!["console", "com.example.app", "com.example.app", "tracing"]
        );
        assert_eq!(
            handler.metadata_value("attempt"),
            Some(&MetadataValue::from("3"))
        );
        assert_eq!(
            handler.metadata_value("tags"),
            Some(&MetadataValue::from(vec!["a", "b"]))
        );
    }

    #[test]
    fn test_build_opens_jsonl_sink() {
        let temp = TempDir::new().unwrap();
        let content = format!(
            "label = \"app\"\n[[sinks]]\nkind = \"jsonl\"\ndir = {:?}\ninstance = \"store\"\n",
            temp.path().display().to_string()
        );
        let handler = LoggerConfig::from_toml_str(&content).unwrap().build().unwrap();

        assert_eq!(handler.sink_names(), vec!["store"]);
        assert!(temp.path().join("raw").exists());
    }

    #[test]
    fn test_validation_reports_every_problem() {
        let content = r#"
            label = " "

            [[sinks]]
            kind = "memory"
            capacity = 0

            [[sinks]]
            kind = "jsonl"
            dir = "logs"
            instance = ""
        "#;

        match LoggerConfig::from_toml_str(content) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 3, "{:?}", errors);
                assert!(errors[0].contains("label"));
                assert!(errors[1].contains("sinks[0]"));
                assert!(errors[2].contains("sinks[1]"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_sink_kind_is_a_parse_error() {
        let content = "label = \"app\"\n[[sinks]]\nkind = \"carrier-pigeon\"\n";
        assert!(matches!(
            LoggerConfig::from_toml_str(content),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = LoggerConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
