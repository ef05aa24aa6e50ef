//! Type definitions for the session log.

use hub_proto::LogRecord;
use std::fmt;

/// One processed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Position in the fan-out engine's processing order.
    pub seq: u64,
    /// Sender identity at the time the message was read.
    pub identity: String,
    /// Original message text.
    pub text: String,
}

impl LogEntry {
    pub fn new(seq: u64, identity: &str, text: &str) -> Self {
        Self {
            seq,
            identity: identity.to_string(),
            text: text.to_string(),
        }
    }

    /// Record form used by the on-disk codec.
    pub fn to_record(&self) -> LogRecord {
        LogRecord::new(self.identity.as_str(), self.text.as_str())
    }
}

/// `identity: text`, the form peers receive and the plain log stores.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identity, self.text)
    }
}
