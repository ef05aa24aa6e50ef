//! No-op history sink that discards the session log.
//!
//! Used when history persistence is disabled.

use super::{HistoryError, HistorySink, LogEntry};
use async_trait::async_trait;

pub struct NoOpSink;

#[async_trait]
impl HistorySink for NoOpSink {
    async fn persist(&self, _entries: &[LogEntry]) -> Result<usize, HistoryError> {
        Ok(0)
    }

    fn describe(&self) -> String {
        "disabled".to_string()
    }
}
