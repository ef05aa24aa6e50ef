//! Network module.
//!
//! Contains the Gateway (WebSocket listener), the per-connection reader,
//! the fan-out engine, and the shutdown coordinator.

pub mod connection;
pub mod fanout;
mod gateway;
pub mod shutdown;

pub use connection::InboundMessage;
pub use fanout::{BroadcastOutcome, FanoutEngine, FanoutSummary};
pub use gateway::{CAPACITY_MESSAGE, Gateway};
pub use shutdown::{ShutdownCoordinator, ShutdownReport, wait_for_signal};
