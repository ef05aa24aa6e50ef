//! Runtime statistics manager.
//!
//! Atomic counters owned by one hub instance. The disconnect counter is
//! the figure reported when the session log is persisted.

use std::sync::atomic::{AtomicU64, Ordering};

/// Why a connection left the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetireReason {
    /// The peer sent a close frame.
    Closed,
    /// The read side failed: stream ended, protocol or decode error.
    ReadFailure,
    /// A broadcast write failed or timed out.
    WriteFailure,
    /// The hub is shutting down.
    Shutdown,
}

impl RetireReason {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::ReadFailure => "read_failure",
            Self::WriteFailure => "write_failure",
            Self::Shutdown => "shutdown",
        }
    }

    /// Whether the peer vanished mid-session rather than leaving cleanly.
    pub fn is_abnormal(self) -> bool {
        matches!(self, Self::ReadFailure | Self::WriteFailure)
    }
}

/// Hub runtime statistics.
#[derive(Debug, Default)]
pub struct StatsManager {
    admitted: AtomicU64,
    rejected: AtomicU64,
    broadcasts: AtomicU64,
    voluntary_disconnects: AtomicU64,
    abnormal_disconnects: AtomicU64,
}

impl StatsManager {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a retirement. Shutdown retirements are not disconnects.
    pub fn record_retired(&self, reason: RetireReason) {
        match reason {
            RetireReason::Closed => {
                self.voluntary_disconnects.fetch_add(1, Ordering::Relaxed);
            }
            RetireReason::ReadFailure | RetireReason::WriteFailure => {
                self.abnormal_disconnects.fetch_add(1, Ordering::Relaxed);
            }
            RetireReason::Shutdown => {}
        }
    }

    pub fn admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn broadcasts(&self) -> u64 {
        self.broadcasts.load(Ordering::Relaxed)
    }

    pub fn voluntary_disconnects(&self) -> u64 {
        self.voluntary_disconnects.load(Ordering::Relaxed)
    }

    /// Peers lost mid-session.
    pub fn abnormal_disconnects(&self) -> u64 {
        self.abnormal_disconnects.load(Ordering::Relaxed)
    }
}
