//! The sink capability and the standalone handler surface.
//!
//! A [`LogSink`] is anything that accepts a finished [`LogRecord`]. The fan-out
//! handler depends on nothing else. A [`LogHandler`] additionally carries a
//! label, a level threshold and its own metadata so it can be used directly,
//! without a fan-out in front of it.
//!
//! ## Thread safety
//!
//! The fan-out performs no synchronization of its own: concurrent `log` calls
//! reach a sink concurrently. Every sink must therefore be `Send + Sync` and do
//! whatever locking its destination needs. The sinks in [`crate::sinks`] all
//! serialize writes internally.

use crate::error::SinkError;
use crate::level::LogLevel;
use crate::metadata::{merge_metadata, Metadata, MetadataValue};
use crate::provider::MetadataProvider;
use crate::record::{Location, LogRecord};

/// A destination for log records.
pub trait LogSink: Send + Sync {
    /// Short name used when reporting failures of this sink.
    fn name(&self) -> &str;

    /// Emit one record. The record's metadata is already merged.
    fn emit(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Flush buffered output, if any.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// A sink that can also be used on its own as a complete log handler.
pub trait LogHandler: LogSink {
    fn label(&self) -> &str;

    fn log_level(&self) -> LogLevel;

    fn set_log_level(&mut self, level: LogLevel);

    /// The handler's default metadata.
    fn metadata(&self) -> &Metadata;

    fn metadata_mut(&mut self) -> &mut Metadata;

    fn metadata_provider(&self) -> Option<&MetadataProvider>;

    /// Read one key of the handler's default metadata.
    fn metadata_value(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata().get(key)
    }

    /// Set or, with `None`, remove one key of the handler's default metadata.
    fn set_metadata_value(&mut self, key: &str, value: Option<MetadataValue>) {
        match value {
            Some(value) => {
                self.metadata_mut().insert(key.to_string(), value);
            }
            None => {
                self.metadata_mut().remove(key);
            }
        }
    }

    /// Filter by level, merge metadata and emit a record.
    fn log(
        &self,
        level: LogLevel,
        message: &str,
        metadata: Option<Metadata>,
        location: Location,
    ) -> Result<(), SinkError> {
        if level < self.log_level() {
            return Ok(());
        }

        let provided = self
            .metadata_provider()
            .map(MetadataProvider::get)
            .unwrap_or_default();
        let merged = merge_metadata(metadata, self.metadata(), provided);
        let record = LogRecord::new(self.label(), level, message, merged, location);

        self.emit(&record)
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        (**self).emit(record)
    }

    fn flush(&self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        (**self).emit(record)
    }

    fn flush(&self) -> Result<(), SinkError> {
        (**self).flush()
    }
}
