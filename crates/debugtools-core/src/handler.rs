//! Multi-sink fan-out handler.
//!
//! A [`MultiLogHandler`] owns a fixed, ordered list of sinks. Each call to
//! [`MultiLogHandler::log`] merges metadata once, builds one [`LogRecord`] and
//! hands it to every sink in registration order, synchronously, on the
//! caller's thread.
//!
//! ## Behaviour
//!
//! - Calls below the handler's `log_level` are dropped before the metadata
//!   provider runs or any sink is touched.
//! - A sink failure is reported through `tracing` and recorded in the returned
//!   [`Dispatch`]. Whether the remaining sinks still receive the record depends
//!   on the [`FailurePolicy`] (by default they do).
//! - An empty sink list is valid; logging is then a no-op.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SinkError;
use crate::level::LogLevel;
use crate::metadata::{merge_metadata, Metadata};
use crate::provider::MetadataProvider;
use crate::record::{Location, LogRecord};
use crate::sink::{LogHandler, LogSink};

/// What the fan-out does after a sink fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep delivering to the remaining sinks
    #[default]
    Continue,
    /// Stop at the first failing sink; later sinks do not see the record
    StopOnFirst,
}

/// A failure of one sink during a dispatch.
#[derive(Debug)]
pub struct SinkFailure {
    /// Position of the sink in registration order
    pub index: usize,
    pub sink: String,
    pub error: SinkError,
}

/// Outcome of a single `log` call.
#[derive(Debug, Default)]
pub struct Dispatch {
    /// The call was below the level threshold and nothing was emitted
    pub filtered: bool,
    /// Sinks that accepted the record
    pub delivered: usize,
    pub failures: Vec<SinkFailure>,
    /// Sinks never invoked because dispatch stopped early
    pub skipped: usize,
}

impl Dispatch {
    fn filtered() -> Self {
        Self {
            filtered: true,
            ..Self::default()
        }
    }

    /// True when every sink received the record.
    pub fn is_complete(&self) -> bool {
        !self.filtered && self.failures.is_empty() && self.skipped == 0
    }
}

/// Fans each log call out to an ordered, fixed list of sinks.
pub struct MultiLogHandler {
    label: String,
    log_level: LogLevel,
    metadata: Metadata,
    metadata_provider: Option<MetadataProvider>,
    failure_policy: FailurePolicy,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl MultiLogHandler {
    /// Create a handler without a metadata provider.
    pub fn new(label: impl Into<String>, sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self {
            label: label.into(),
            log_level: LogLevel::Info,
            metadata: Metadata::new(),
            metadata_provider: None,
            failure_policy: FailurePolicy::default(),
            sinks,
        }
    }

    /// Create a handler that consults `provider` on every log call.
    pub fn with_metadata_provider(
        label: impl Into<String>,
        sinks: Vec<Arc<dyn LogSink>>,
        provider: MetadataProvider,
    ) -> Self {
        let mut handler = Self::new(label, sinks);
        handler.metadata_provider = Some(provider);
        handler
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Names of the registered sinks, in dispatch order.
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Log a message through every sink.
    ///
    /// `metadata` is the per-call metadata and takes precedence over the
    /// handler's metadata and the provider's output.
    pub fn log(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        metadata: Option<Metadata>,
        location: Location,
    ) -> Dispatch {
        if level < self.log_level {
            return Dispatch::filtered();
        }

        let provided = self
            .metadata_provider
            .as_ref()
            .map(MetadataProvider::get)
            .unwrap_or_default();
        let merged = merge_metadata(metadata, &self.metadata, provided);
        let record = LogRecord::new(&self.label, level, message, merged, location);

        self.fan_out(&record)
    }

    /// Deliver an already built record to every sink.
    pub fn fan_out(&self, record: &LogRecord) -> Dispatch {
        let mut dispatch = Dispatch::default();

        for (index, sink) in self.sinks.iter().enumerate() {
            match sink.emit(record) {
                Ok(()) => dispatch.delivered += 1,
                Err(error) => {
                    tracing::warn!(
                        target: "debugtools_core::dispatch",
                        handler = %self.label,
                        sink = sink.name(),
                        index,
                        error = %error,
                        "Sink failed to emit record"
                    );
                    dispatch.failures.push(SinkFailure {
                        index,
                        sink: sink.name().to_string(),
                        error,
                    });

                    if self.failure_policy == FailurePolicy::StopOnFirst {
                        dispatch.skipped = self.sinks.len() - index - 1;
                        break;
                    }
                }
            }
        }

        dispatch
    }
}

impl LogSink for MultiLogHandler {
    fn name(&self) -> &str {
        &self.label
    }

    /// Forward a record built by an outer handler. The record's metadata is
    /// kept as is; only this handler's level threshold applies.
    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        if record.level() < self.log_level {
            return Ok(());
        }

        match self.fan_out(record).failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(()),
        }
    }

    /// Flush every sink, even after one fails. Returns the first error.
    fn flush(&self) -> Result<(), SinkError> {
        let mut first_error = None;

        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                tracing::warn!(
                    target: "debugtools_core::dispatch",
                    sink = sink.name(),
                    error = %e,
                    "Sink failed to flush"
                );
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl LogHandler for MultiLogHandler {
    fn label(&self) -> &str {
        &self.label
    }

    fn log_level(&self) -> LogLevel {
        self.log_level
    }

    fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn metadata_provider(&self) -> Option<&MetadataProvider> {
        self.metadata_provider.as_ref()
    }
}

impl fmt::Debug for MultiLogHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiLogHandler")
            .field("label", &self.label)
            .field("log_level", &self.log_level)
            .field("metadata", &self.metadata)
            .field("metadata_provider", &self.metadata_provider.is_some())
            .field("failure_policy", &self.failure_policy)
            .field("sinks", &self.sink_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata;
    use crate::sinks::memory::MemorySink;

    fn location() -> Location {
        Location::new("tests", "handler.rs", "tests::location", 1)
    }

    #[test]
    fn test_log_merges_all_three_sources() {
        let sink = Arc::new(MemorySink::new("recording"));
        let provider = MetadataProvider::new(|| metadata! { "env" => "prod", "build" => "42" });
        let sinks: Vec<Arc<dyn LogSink>> = vec![sink.clone()];
        let handler = MultiLogHandler::with_metadata_provider("app", sinks, provider)
            .with_metadata(metadata! { "env" => "test" });

        let dispatch = handler.log(
            LogLevel::Info,
            "hello",
            Some(metadata! { "env" => "override" }),
            location(),
        );

        assert!(dispatch.is_complete());
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].record.metadata(),
            &metadata! { "env" => "override", "build" => "42" }
        );
        assert_eq!(records[0].record.label(), "app");
    }

    #[test]
    fn test_below_threshold_is_filtered_before_provider_runs() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider = MetadataProvider::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Metadata::new()
        });
        let sink = Arc::new(MemorySink::new("recording"));
        let sinks: Vec<Arc<dyn LogSink>> = vec![sink.clone()];
        let handler = MultiLogHandler::with_metadata_provider("app", sinks, provider)
            .with_log_level(LogLevel::Warning);

        let dispatch = handler.log(LogLevel::Info, "quiet", None, location());

        assert!(dispatch.filtered);
        assert!(sink.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        handler.log(LogLevel::Warning, "loud", None, location());
        assert_eq!(sink.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_metadata_value_updates_handler_defaults() {
        let sink = Arc::new(MemorySink::new("recording"));
        let mut handler = MultiLogHandler::new("app", vec![sink.clone() as Arc<dyn LogSink>]);

        handler.set_metadata_value("request_id", Some("r-1".into()));
        assert_eq!(
            handler.metadata_value("request_id").and_then(|v| v.as_str()),
            Some("r-1")
        );

        handler.log(LogLevel::Info, "first", None, location());
        handler.set_metadata_value("request_id", None);
        handler.log(LogLevel::Info, "second", None, location());

        let records = sink.records();
        assert!(records[0].record.metadata().contains_key("request_id"));
        assert!(!records[1].record.metadata().contains_key("request_id"));
    }

    #[test]
    fn test_nested_handler_applies_own_threshold() {
        let inner_sink = Arc::new(MemorySink::new("inner"));
        let inner = MultiLogHandler::new("inner", vec![inner_sink.clone() as Arc<dyn LogSink>])
            .with_log_level(LogLevel::Error);
        let outer_sink = Arc::new(MemorySink::new("outer"));
        let sinks: Vec<Arc<dyn LogSink>> = vec![Arc::new(inner), outer_sink.clone()];
        let outer = MultiLogHandler::new("outer", sinks).with_log_level(LogLevel::Trace);

        outer.log(LogLevel::Debug, "detail", None, location());
        outer.log(LogLevel::Error, "broken", None, location());

        assert_eq!(outer_sink.len(), 2);
        assert_eq!(inner_sink.len(), 1);
        assert_eq!(inner_sink.records()[0].record.message(), "broken");
    }

    #[test]
    fn test_debug_lists_sink_names() {
        let handler = MultiLogHandler::new(
            "app",
            vec![
                Arc::new(MemorySink::new("a")) as Arc<dyn LogSink>,
                Arc::new(MemorySink::new("b")),
            ],
        );
        let debug = format!("{:?}", handler);
        assert!(debug.contains("[\"a\", \"b\"]"));
    }
}
