//! Concrete sinks.
//!
//! - [`console`]: human-readable lines on stdout/stderr
//! - [`oslog`]: the OS unified-log adapter with a 1:1 level mapping
//! - [`jsonl`]: append-only JSONL store, readable back for display
//! - [`memory`]: bounded in-memory store, also used as the recording sink in tests
//! - [`forward`]: re-emits records as `tracing` events

pub mod console;
pub mod forward;
pub mod jsonl;
pub mod memory;
pub mod oslog;

pub use console::{ConsoleSink, ConsoleStream};
pub use forward::TracingSink;
pub use jsonl::{read_all_entries, read_entries, JsonLogEntry, JsonlSink};
pub use memory::{MemorySink, StoredRecord};
pub use oslog::{OsLogDestination, OsLogHandler, OsLogType, Privacy, StreamDestination};

#[cfg(test)]
pub(crate) use test_support::SharedBuffer;
