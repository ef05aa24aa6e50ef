//! Error types for the transport boundary and the record codec.

use thiserror::Error;

/// Errors raised by a [`FrameSource`](crate::FrameSource) or
/// [`FrameSink`](crate::FrameSink).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The channel is closed; no further frames can be exchanged.
    #[error("transport closed")]
    Closed,

    /// The peer violated the framing protocol.
    #[error("transport protocol error: {0}")]
    Protocol(String),

    /// A frame could not be decoded as application text.
    #[error("frame decode error: {0}")]
    Decode(String),

    /// A write did not complete within its deadline.
    #[error("write timed out")]
    Timeout,
}

impl TransportError {
    /// Whether this error means the peer went away cleanly rather than misbehaving.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Errors raised when decoding a persisted session log line.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A plain line did not contain the `": "` separator.
    #[error("missing identity separator in line: {0:?}")]
    MissingSeparator(String),

    /// A JSON lines record was malformed.
    #[error("invalid JSON record: {0}")]
    Json(#[from] serde_json::Error),
}
