//! Transport boundary.
//!
//! The hub treats every peer as an opaque bidirectional channel of text
//! frames. Framing, TLS and the upgrade handshake happen below this layer;
//! the hub only reads frames, writes text, and closes.
//!
//! - [`websocket`]: adapter over a `tokio-tungstenite` stream
//! - [`memory`]: in-process duplex pair, used by tests

use async_trait::async_trait;

use crate::error::TransportError;

#[cfg(feature = "tokio")]
pub mod memory;
#[cfg(feature = "tokio")]
pub mod websocket;

/// Close code for a normal, intentional closure.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Close code for an endpoint going away (server shutdown, page navigation).
pub const GOING_AWAY: u16 = 1001;

/// Reason text sent to every peer when the hub shuts down.
pub const SHUTDOWN_REASON: &str = "Shutting down server";

/// Close notification carried by a close frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseNotice {
    /// Close status code.
    pub code: u16,
    /// Human-readable reason.
    pub reason: String,
}

impl CloseNotice {
    /// Create a close notice.
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Notice sent to all peers during server shutdown.
    pub fn shutdown() -> Self {
        Self::new(NORMAL_CLOSURE, SHUTDOWN_REASON)
    }

    /// Notice sent by a peer that disconnects voluntarily.
    pub fn normal() -> Self {
        Self::new(NORMAL_CLOSURE, "")
    }
}

/// An application-level frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A UTF-8 text message.
    Text(String),
    /// A close handshake initiated by the remote side.
    Close(Option<CloseNotice>),
}

/// Read half of a peer connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next application frame.
    ///
    /// Returns `Ok(None)` once the stream has ended without a close frame.
    /// Control frames (ping/pong) never surface here.
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError>;
}

/// Write half of a peer connection.
#[async_trait]
pub trait FrameSink: Send {
    /// Send one text message.
    async fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Send a close notification without tearing down the channel.
    async fn send_close(&mut self, notice: Option<CloseNotice>) -> Result<(), TransportError>;

    /// Terminate the channel. Closing twice is not an error.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Type-erased write half.
pub type BoxedSink = Box<dyn FrameSink>;

/// Type-erased read half.
pub type BoxedSource = Box<dyn FrameSource>;
