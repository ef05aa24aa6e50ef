//! Session log and its persistence.
//!
//! The [`SessionLog`] is the in-memory, append-only record of every message
//! the fan-out engine has processed, in processing order. It has its own
//! lock, independent of the connection registry. At shutdown its contents
//! are handed once to a [`HistorySink`].

use crate::config::HistoryConfig;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

pub mod file;
pub mod noop;
pub mod types;

pub use crate::error::HistoryError;
pub use types::LogEntry;

/// Build the sink selected by configuration.
pub fn sink_from_config(config: &HistoryConfig) -> Arc<dyn HistorySink> {
    if config.enabled {
        Arc::new(file::FileSink::from_config(config))
    } else {
        Arc::new(noop::NoOpSink)
    }
}

/// Destination for the session log at shutdown.
#[async_trait]
pub trait HistorySink: Send + Sync {
    /// Write all entries, replacing whatever a previous run left behind.
    ///
    /// Returns the number of entries written.
    async fn persist(&self, entries: &[LogEntry]) -> Result<usize, HistoryError>;

    /// Short description for logs (a path, or "disabled").
    fn describe(&self) -> String;
}

#[derive(Default)]
struct LogInner {
    entries: Vec<LogEntry>,
    next_seq: u64,
    taken: bool,
}

/// Ordered record of broadcast messages for the current run.
#[derive(Default)]
pub struct SessionLog {
    inner: Mutex<LogInner>,
}

impl SessionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, returning its sequence number.
    pub fn append(&self, identity: &str, text: &str) -> u64 {
        let mut inner = self.inner.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push(LogEntry::new(seq, identity, text));
        seq
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether no entries are held.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Copy of the current entries.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.inner.lock().entries.clone()
    }

    /// Move the entries out for the single persistence pass.
    ///
    /// The first call returns everything; later calls return nothing, so the
    /// log can only be written once per run.
    pub fn take_persistable(&self) -> Vec<LogEntry> {
        let mut inner = self.inner.lock();
        if inner.taken {
            return Vec::new();
        }
        inner.taken = true;
        std::mem::take(&mut inner.entries)
    }
}
