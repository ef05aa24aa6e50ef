//! Unified error handling for broadcast-hub.
//!
//! Every error is local to one connection or to one shutdown step; none of
//! them stops the fan-out engine from serving other peers.

use hub_proto::{RecordError, TransportError};
use thiserror::Error;

// ============================================================================
// Connection Errors (admission, upgrade, read/write)
// ============================================================================

/// Errors that end a single connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The admission gate is at capacity; the caller got a 503.
    #[error("admission rejected: server is at max capacity")]
    AdmissionRejected,

    /// The WebSocket upgrade did not complete. No registry entry exists.
    #[error("upgrade failed: {0}")]
    UpgradeFailed(String),

    /// The peer disconnected or sent something undecodable.
    #[error("read failure: {0}")]
    ReadFailure(#[source] TransportError),

    /// A broadcast write to the peer failed or timed out.
    #[error("write failure: {0}")]
    WriteFailure(#[source] TransportError),

    /// Registration was refused because the hub is shutting down.
    #[error("hub is shutting down")]
    ShuttingDown,
}

impl ConnectionError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AdmissionRejected => "admission_rejected",
            Self::UpgradeFailed(_) => "upgrade_failed",
            Self::ReadFailure(_) => "read_failure",
            Self::WriteFailure(_) => "write_failure",
            Self::ShuttingDown => "shutting_down",
        }
    }
}

// ============================================================================
// History Errors (persistence at shutdown)
// ============================================================================

/// Session log persistence failures. Reported, never fatal.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    Encode(#[from] RecordError),
}

// ============================================================================
// Startup Errors
// ============================================================================

/// Errors that prevent the hub from starting.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

// ============================================================================
// Peer Program Errors
// ============================================================================

/// Failures of the interactive peer.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("stdin error: {0}")]
    Stdin(#[from] std::io::Error),
}
