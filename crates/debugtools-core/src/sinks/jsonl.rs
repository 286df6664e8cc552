//! Append-only JSONL log store.
//!
//! Each record becomes one self-contained JSON object on its own line, so a
//! file can be tailed, grepped with `jq`, or read back later for display:
//!
//! ```text
//! logs/
//! └── raw/
//!     ├── 2026-01-21_app.jsonl
//!     └── 2026-01-21_network.jsonl
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::SinkError;
use crate::level::LogLevel;
use crate::metadata::Metadata;
use crate::record::{Location, LogRecord};
use crate::sink::LogSink;

/// A persisted log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonLogEntry {
    /// RFC 3339 timestamp with milliseconds (e.g., "2026-01-21T14:30:45.123Z")
    pub ts: String,

    pub level: LogLevel,

    /// Label of the handler that produced the record
    pub label: String,

    pub source: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,

    #[serde(default)]
    pub line: u32,

    pub msg: String,

    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl JsonLogEntry {
    pub fn from_record(record: &LogRecord) -> Self {
        Self {
            ts: record
                .timestamp()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            level: record.level(),
            label: record.label().to_string(),
            source: record.source().to_string(),
            file: record.file().to_string(),
            function: record.function().to_string(),
            line: record.line(),
            msg: record.message().to_string(),
            metadata: record.metadata().clone(),
        }
    }

    /// Rebuild the record. An unparsable timestamp falls back to the epoch.
    pub fn to_record(&self) -> LogRecord {
        let ts = DateTime::parse_from_rfc3339(&self.ts)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default();

        LogRecord::new(
            self.label.clone(),
            self.level,
            self.msg.clone(),
            self.metadata.clone(),
            Location::new(
                self.source.clone(),
                self.file.clone(),
                self.function.clone(),
                self.line,
            ),
        )
        .at(ts)
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Sink appending records to `<logs_dir>/raw/<date>_<instance>.jsonl`.
pub struct JsonlSink {
    instance: String,
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlSink {
    /// Open (or create) today's file for `instance`.
    pub fn new(logs_dir: impl AsRef<Path>, instance: impl Into<String>) -> std::io::Result<Self> {
        let instance = instance.into();

        let raw_dir = logs_dir.as_ref().join("raw");
        fs::create_dir_all(&raw_dir)?;

        let date = chrono::Local::now().format("%Y-%m-%d");
        let path = raw_dir.join(format!("{}_{}.jsonl", date, instance));

        Self::open(path, instance)
    }

    /// Append to an explicit file path.
    pub fn open(path: impl Into<PathBuf>, instance: impl Into<String>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            instance: instance.into(),
            writer: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for JsonlSink {
    fn name(&self) -> &str {
        &self.instance
    }

    /// Lines are flushed immediately so concurrent readers see whole records.
    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        let json = JsonLogEntry::from_record(record).to_json_line()?;

        let mut writer = self.writer.lock();
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

impl Drop for JsonlSink {
    fn drop(&mut self) {
        let _ = self.writer.get_mut().flush();
    }
}

/// Read one JSONL file. Lines that fail to parse are skipped with a warning.
pub fn read_entries(path: impl AsRef<Path>) -> std::io::Result<Vec<JsonLogEntry>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let mut entries = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match JsonLogEntry::from_json_line(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = number + 1,
                    error = %e,
                    "Skipping unparsable log line"
                );
            }
        }
    }

    Ok(entries)
}

/// Read every `.jsonl` file under `<logs_dir>/raw`, sorted by timestamp.
pub fn read_all_entries(logs_dir: impl AsRef<Path>) -> std::io::Result<Vec<JsonLogEntry>> {
    let raw_dir = logs_dir.as_ref().join("raw");

    if !raw_dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();

    for entry in fs::read_dir(&raw_dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "jsonl").unwrap_or(false) {
            entries.extend(read_entries(&path)?);
        }
    }

    entries.sort_by(|a, b| a.ts.cmp(&b.ts));

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata;
    use tempfile::TempDir;

    fn record(level: LogLevel, message: &str) -> LogRecord {
        LogRecord::new(
            "app",
            level,
            message,
            metadata! { "peer" => "abc123", "tags" => vec!["a", "b"] },
            Location::new("app::sync", "src/sync.rs", "app::sync::connect", 7),
        )
    }

    #[test]
    fn test_sink_creates_directory_structure() {
        let temp = TempDir::new().unwrap();
        let logs_dir = temp.path().join("logs");

        let sink = JsonlSink::new(&logs_dir, "app").unwrap();

        assert!(logs_dir.join("raw").exists());
        assert!(sink.path().exists());
        assert!(sink.path().to_string_lossy().ends_with("_app.jsonl"));
    }

    #[test]
    fn test_sink_appends_one_line_per_record() {
        let temp = TempDir::new().unwrap();
        let sink = JsonlSink::new(temp.path(), "app").unwrap();

        sink.emit(&record(LogLevel::Info, "First message")).unwrap();
        sink.emit(&record(LogLevel::Error, "Second message")).unwrap();

        let content = fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"level\":\"info\""));
        assert!(lines[0].contains("\"peer\":\"abc123\""));
        assert!(lines[1].contains("Second message"));
    }

    #[test]
    fn test_read_back_restores_record_fields() {
        let temp = TempDir::new().unwrap();
        let sink = JsonlSink::new(temp.path(), "app").unwrap();
        let original = record(LogLevel::Notice, "Connected to peer");
        sink.emit(&original).unwrap();

        let entries = read_entries(sink.path()).unwrap();
        assert_eq!(entries.len(), 1);

        let restored = entries[0].to_record();
        assert_eq!(restored.level(), LogLevel::Notice);
        assert_eq!(restored.message(), "Connected to peer");
        assert_eq!(restored.metadata(), original.metadata());
        assert_eq!(restored.location(), original.location());
        assert_eq!(
            restored.timestamp().timestamp_millis(),
            original.timestamp().timestamp_millis()
        );
    }

    #[test]
    fn test_read_all_entries_merges_instances_and_skips_garbage() {
        let temp = TempDir::new().unwrap();

        let app = JsonlSink::new(temp.path(), "app").unwrap();
        let net = JsonlSink::new(temp.path(), "net").unwrap();
        app.emit(&record(LogLevel::Info, "from app")).unwrap();
        net.emit(&record(LogLevel::Info, "from net")).unwrap();

        let garbage = temp.path().join("raw").join("broken.jsonl");
        fs::write(&garbage, "not json\n\n").unwrap();

        drop(app);
        drop(net);

        let entries = read_all_entries(temp.path()).unwrap();
        let messages: Vec<_> = entries.iter().map(|e| e.msg.as_str()).collect();
        assert_eq!(entries.len(), 2);
        assert!(messages.contains(&"from app"));
        assert!(messages.contains(&"from net"));
    }

    #[test]
    fn test_missing_raw_dir_reads_empty() {
        let temp = TempDir::new().unwrap();
        assert!(read_all_entries(temp.path().join("nowhere")).unwrap().is_empty());
    }
}
