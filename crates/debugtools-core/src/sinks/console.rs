//! Human-readable console output.

use std::fmt::Write as FmtWrite;
use std::io::{self, Write};

use chrono::SecondsFormat;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::SinkError;
use crate::record::LogRecord;
use crate::sink::LogSink;

/// Which standard stream a console sink writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStream {
    Stdout,
    #[default]
    Stderr,
}

/// Writes one line per record:
/// `2026-01-21T14:30:45.123Z app info: [env=prod user=ada] message`.
pub struct ConsoleSink {
    name: String,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn new(stream: ConsoleStream) -> Self {
        let out: Box<dyn Write + Send> = match stream {
            ConsoleStream::Stdout => Box::new(io::stdout()),
            ConsoleStream::Stderr => Box::new(io::stderr()),
        };
        Self::with_writer("console", out)
    }

    /// Console sink over any writer.
    pub fn with_writer(name: impl Into<String>, out: Box<dyn Write + Send>) -> Self {
        Self {
            name: name.into(),
            out: Mutex::new(out),
        }
    }
}

/// Render a record the way [`ConsoleSink`] prints it (without newline).
pub fn format_line(record: &LogRecord) -> String {
    let mut line = format!(
        "{} {} {}:",
        record
            .timestamp()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        record.label(),
        record.level()
    );

    if !record.metadata().is_empty() {
        line.push_str(" [");
        for (i, (key, value)) in record.metadata().iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            let _ = write!(line, "{}={}", key, value);
        }
        line.push(']');
    }

    line.push(' ');
    line.push_str(record.message());
    line
}

impl LogSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        let line = format_line(record);
        let mut out = self.out.lock();
        writeln!(out, "{}", line)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.out.lock().flush()?;
        Ok(())
    }
}
