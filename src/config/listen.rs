//! Network listener configuration.

use serde::Deserialize;
use std::net::SocketAddr;

/// WebSocket listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080").
    #[serde(default = "default_address")]
    pub address: SocketAddr,
    /// Request path that is upgraded to a WebSocket. Other paths get 404.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            path: default_path(),
        }
    }
}

fn default_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_path() -> String {
    "/ws".to_string()
}
