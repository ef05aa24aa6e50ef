//! # hub-proto
//!
//! Wire-level building blocks for the broadcast hub.
//!
//! ## Features
//!
//! - [`transport::Frame`] and the [`FrameSource`] / [`FrameSink`] traits that
//!   model a peer connection as an opaque bidirectional text-message channel
//! - A WebSocket adapter over `tokio-tungstenite`
//! - An in-memory duplex transport for tests and simulations
//! - [`record`]: the session log record codec (plain and JSON lines)
//!
//! ## Quick Start
//!
//! ```rust
//! use hub_proto::record::{LogRecord, RecordFormat};
//!
//! let record = LogRecord::new("client1", "hi");
//! assert_eq!(RecordFormat::Plain.encode(&record).unwrap(), "client1: hi");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod record;
pub mod transport;

pub use error::{RecordError, TransportError};
pub use record::{LogRecord, RecordFormat};
pub use transport::{BoxedSink, BoxedSource, CloseNotice, Frame, FrameSink, FrameSource};
