//! Forwards records into the `tracing` ecosystem.
//!
//! `tracing` has five levels, so the mapping is lossy: `notice` is emitted as
//! INFO and `critical` as ERROR. The original level is kept in the `level`
//! field of each event.
//!
//! Events are emitted on target `debugtools_core::forward`, which
//! [`MultiLogLayer`](crate::layer::MultiLogLayer) ignores; pairing the two
//! therefore cannot loop.

use std::fmt::Write as FmtWrite;

use crate::error::SinkError;
use crate::level::LogLevel;
use crate::record::LogRecord;
use crate::sink::LogSink;

/// Target used for every forwarded event.
pub const FORWARD_TARGET: &str = "debugtools_core::forward";

/// Sink emitting each record as a `tracing` event.
#[derive(Debug, Clone)]
pub struct TracingSink {
    name: String,
}

impl TracingSink {
    pub fn new() -> Self {
        Self {
            name: "tracing".to_string(),
        }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten_metadata(record: &LogRecord) -> String {
    let mut out = String::new();
    for (i, (key, value)) in record.metadata().iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}={}", key, value);
    }
    out
}

macro_rules! forward {
    ($mac:ident, $record:expr, $fields:expr) => {
        tracing::$mac!(
            target: FORWARD_TARGET,
            label = $record.label(),
            level = $record.level().as_str(),
            source = $record.source(),
            file = $record.file(),
            line = $record.line(),
            metadata = %$fields,
            "{}",
            $record.message()
        )
    };
}

impl LogSink for TracingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        let fields = flatten_metadata(record);

        match record.level() {
            LogLevel::Trace => forward!(trace, record, fields),
            LogLevel::Debug => forward!(debug, record, fields),
            LogLevel::Info | LogLevel::Notice => forward!(info, record, fields),
            LogLevel::Warning => forward!(warn, record, fields),
            LogLevel::Error | LogLevel::Critical => forward!(error, record, fields),
        }

        Ok(())
    }
}
