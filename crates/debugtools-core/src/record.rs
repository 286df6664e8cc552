//! The immutable record handed to every sink.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::level::LogLevel;
use crate::metadata::Metadata;

/// Where a log call originated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Logical source, usually the module path
    pub source: Cow<'static, str>,
    pub file: Cow<'static, str>,
    pub function: Cow<'static, str>,
    pub line: u32,
}

impl Location {
    pub fn new(
        source: impl Into<Cow<'static, str>>,
        file: impl Into<Cow<'static, str>>,
        function: impl Into<Cow<'static, str>>,
        line: u32,
    ) -> Self {
        Self {
            source: source.into(),
            file: file.into(),
            function: function.into(),
            line,
        }
    }

    /// A location for records that did not come from a Rust call site.
    pub fn unknown(source: impl Into<Cow<'static, str>>) -> Self {
        Self::new(source, "", "", 0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Path of the enclosing function, e.g. `my_app::net::connect`.
#[macro_export]
macro_rules! function_path {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        name.strip_suffix("::__here").unwrap_or(name)
    }};
}

/// Capture the current call site as a [`Location`].
#[macro_export]
macro_rules! location {
    () => {
        $crate::Location::new(
            ::std::module_path!(),
            ::std::file!(),
            $crate::function_path!(),
            ::std::line!(),
        )
    };
}

/// A single log event after metadata has been merged.
///
/// Records are built once per log call and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    timestamp: DateTime<Utc>,
    label: String,
    level: LogLevel,
    message: String,
    metadata: Metadata,
    location: Location,
}

impl LogRecord {
    /// Create a record stamped with the current time.
    pub fn new(
        label: impl Into<String>,
        level: LogLevel,
        message: impl Into<String>,
        metadata: Metadata,
        location: Location,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            label: label.into(),
            level,
            message: message.into(),
            metadata,
            location,
        }
    }

    /// Replace the timestamp, e.g. when replaying persisted records.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Label of the handler that produced the record.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn source(&self) -> &str {
        &self.location.source
    }

    pub fn file(&self) -> &str {
        &self.location.file
    }

    pub fn function(&self) -> &str {
        &self.location.function
    }

    pub fn line(&self) -> u32 {
        self.location.line
    }
}
