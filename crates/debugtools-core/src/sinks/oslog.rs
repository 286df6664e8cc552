//! Adapter for an OS-level unified log.
//!
//! Each [`LogLevel`] maps onto exactly one [`OsLogType`]; nothing is collapsed.
//! Messages are written with a [`Privacy::Public`] annotation, so the
//! destination never redacts them. Record metadata is not re-merged here: the
//! handler in front of this sink already owns that.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::SinkError;
use crate::level::LogLevel;
use crate::metadata::Metadata;
use crate::provider::MetadataProvider;
use crate::record::LogRecord;
use crate::sink::{LogHandler, LogSink};

/// Severity taxonomy of the unified log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsLogType {
    Trace,
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
}

impl OsLogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsLogType::Trace => "Trace",
            OsLogType::Debug => "Debug",
            OsLogType::Info => "Info",
            OsLogType::Notice => "Notice",
            OsLogType::Warning => "Warning",
            OsLogType::Error => "Error",
            OsLogType::Critical => "Critical",
        }
    }
}

impl From<LogLevel> for OsLogType {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => OsLogType::Trace,
            LogLevel::Debug => OsLogType::Debug,
            LogLevel::Info => OsLogType::Info,
            LogLevel::Notice => OsLogType::Notice,
            LogLevel::Warning => OsLogType::Warning,
            LogLevel::Error => OsLogType::Error,
            LogLevel::Critical => OsLogType::Critical,
        }
    }
}

/// Privacy annotation carried with each interpolated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privacy {
    Public,
    Private,
}

/// Where the unified log writes to.
pub trait OsLogDestination: Send + Sync {
    fn write(&self, kind: OsLogType, message: &str, privacy: Privacy) -> Result<(), SinkError>;

    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes `subsystem[category] <Type> message` lines to a stream.
pub struct StreamDestination {
    subsystem: String,
    category: String,
    out: Mutex<Box<dyn Write + Send>>,
}

impl StreamDestination {
    pub fn new(
        subsystem: impl Into<String>,
        category: impl Into<String>,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            subsystem: subsystem.into(),
            category: category.into(),
            out: Mutex::new(out),
        }
    }

    pub fn stderr(subsystem: impl Into<String>, category: impl Into<String>) -> Self {
        Self::new(subsystem, category, Box::new(io::stderr()))
    }
}

impl OsLogDestination for StreamDestination {
    fn write(&self, kind: OsLogType, message: &str, privacy: Privacy) -> Result<(), SinkError> {
        let shown = match privacy {
            Privacy::Public => message,
            Privacy::Private => "<private>",
        };

        let mut out = self.out.lock();
        writeln!(
            out,
            "{}[{}] <{}> {}",
            self.subsystem,
            self.category,
            kind.as_str(),
            shown
        )?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.out.lock().flush()?;
        Ok(())
    }
}

/// Handler that writes records to the unified log.
pub struct OsLogHandler {
    label: String,
    log_level: LogLevel,
    metadata: Metadata,
    metadata_provider: Option<MetadataProvider>,
    destination: Arc<dyn OsLogDestination>,
}

impl OsLogHandler {
    /// Log to stderr under subsystem `label`, category `OSLogHandler`.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let destination = StreamDestination::stderr(label.clone(), "OSLogHandler");
        Self::with_destination(label, Arc::new(destination))
    }

    pub fn with_destination(label: impl Into<String>, destination: Arc<dyn OsLogDestination>) -> Self {
        Self {
            label: label.into(),
            log_level: LogLevel::Trace,
            metadata: Metadata::new(),
            metadata_provider: None,
            destination,
        }
    }

    pub fn with_metadata_provider(mut self, provider: MetadataProvider) -> Self {
        self.metadata_provider = Some(provider);
        self
    }
}

impl LogSink for OsLogHandler {
    fn name(&self) -> &str {
        &self.label
    }

    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.destination
            .write(record.level().into(), record.message(), Privacy::Public)
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.destination.flush()
    }
}

impl LogHandler for OsLogHandler {
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

impl fmt::Debug for OsLogHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsLogHandler")
            .field("label", &self.label)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}
