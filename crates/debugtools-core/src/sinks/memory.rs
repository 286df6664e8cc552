//! Bounded in-memory record store.
//!
//! Keeps the most recent records for in-process viewers (the debug overlay's
//! log console) and doubles as the recording sink in tests: every accepted
//! record gets a sequence number that is unique across all memory sinks, so
//! the relative order in which several sinks observed records can be checked.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::SinkError;
use crate::record::LogRecord;
use crate::sink::LogSink;

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Default number of records retained.
pub const DEFAULT_CAPACITY: usize = 1_000;

/// A record as stored by [`MemorySink`].
#[derive(Debug, Clone)]
pub struct StoredRecord {
    /// Process-wide, strictly increasing
    pub sequence: u64,
    pub record: LogRecord,
}

/// Sink that keeps the last `capacity` records in memory.
pub struct MemorySink {
    name: String,
    capacity: usize,
    closed: AtomicBool,
    records: Mutex<VecDeque<StoredRecord>>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, DEFAULT_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name: name.into(),
            capacity,
            closed: AtomicBool::new(false),
            records: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the retained records, oldest first.
    pub fn records(&self) -> Vec<StoredRecord> {
        self.records.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    /// Stop accepting records; further emits fail with [`SinkError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl LogSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SinkError::Closed(self.name.clone()));
        }

        let mut records = self.records.lock();
        // Sequence is taken under the lock so per-sink order matches sequence order
        let sequence = NEXT_SEQUENCE.fetch_add(1, Ordering::SeqCst);
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(StoredRecord {
            sequence,
            record: record.clone(),
        });

        Ok(())
    }
}
