//! broadcast-hub - fan-out text relay over WebSocket.
//!
//! Peers connect over WebSocket and send text; every message is broadcast
//! to every connected peer in one global order and recorded in a session
//! log that is written once at shutdown.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod http;
pub mod metrics;
pub mod network;
pub mod server;
pub mod state;
pub mod telemetry;

pub use config::Config;
pub use error::{ClientError, ConnectionError, HistoryError, HubError};
pub use server::Server;
pub use state::Hub;
