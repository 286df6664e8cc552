//! DebugTools Core Library
//!
//! Multi-sink log handling with layered metadata.
//!
//! ## Overview
//!
//! A [`MultiLogHandler`] accepts one log call and delivers the same record to
//! every registered sink, in order. Metadata attached to the record is merged
//! from three sources, most specific first:
//!
//! 1. metadata passed with the call
//! 2. the handler's own default metadata
//! 3. the output of an optional [`MetadataProvider`]
//!
//! Sinks include an adapter for the OS unified log with a 1:1 level mapping,
//! a console writer, an append-only JSONL store and an in-memory buffer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use debugtools_core::sinks::{ConsoleSink, ConsoleStream, OsLogHandler};
//! use debugtools_core::{metadata, minfo, LogSink, MetadataProvider, MultiLogHandler};
//!
//! let sinks: Vec<Arc<dyn LogSink>> = vec![
//!     Arc::new(ConsoleSink::new(ConsoleStream::Stderr)),
//!     Arc::new(OsLogHandler::new("com.example.app")),
//! ];
//! let provider = MetadataProvider::new(|| metadata! { "request_id" => "r-42" });
//! let logger = MultiLogHandler::with_metadata_provider("com.example.app", sinks, provider);
//!
//! minfo!(logger, { "user" => "ada" }; "signed in after {} attempts", 2);
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod layer;
pub mod level;
pub mod macros;
pub mod metadata;
pub mod provider;
pub mod record;
pub mod sink;
pub mod sinks;

// Re-exports
pub use config::{LoggerConfig, SinkConfig};
pub use error::{ConfigError, LogError, LogResult, ProviderError, SinkError};
pub use handler::{Dispatch, FailurePolicy, MultiLogHandler, SinkFailure};
pub use layer::MultiLogLayer;
pub use level::LogLevel;
pub use metadata::{merge_metadata, parse_pair, Metadata, MetadataValue};
pub use provider::MetadataProvider;
pub use record::{Location, LogRecord};
pub use sink::{LogHandler, LogSink};
