//! Error types for DebugTools logging

use thiserror::Error;

/// Failure raised by a single sink while emitting or flushing a record.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Writing to the underlying file or stream failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded for the destination
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The destination is no longer accepting records
    #[error("Sink closed: {0}")]
    Closed(String),

    /// The destination refused the record
    #[error("Record rejected: {0}")]
    Rejected(String),
}

/// Failure raised by a fallible metadata provider.
#[derive(Error, Debug)]
#[error("Metadata provider failed: {0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Errors raised while loading or validating logger configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the configuration file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for the schema
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but is semantically invalid
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<String>),

    /// A configured sink could not be opened
    #[error("Sink '{kind}' could not be opened: {source}")]
    SinkInit {
        kind: String,
        #[source]
        source: std::io::Error,
    },
}

fn join_errors(errors: &[String]) -> String {
    errors.join(", ")
}

/// Top-level error for operations outside the hot logging path.
#[derive(Error, Debug)]
pub enum LogError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Unknown level name
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Malformed `key=value` metadata pair
    #[error("Invalid metadata pair: {0}")]
    InvalidMetadata(String),
}

/// Result type alias using LogError
pub type LogResult<T> = Result<T, LogError>;
