//! Admission and queue limits configuration.

use serde::Deserialize;

/// Admission and queue limits.
///
/// `max_clients` is the admission gate capacity and never changes while the
/// hub runs. The inbound queue is bounded: when it is full, readers wait,
/// so a slow fan-out engine pushes back on readers and never on the accept
/// loop.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum concurrent connections, upgraded or mid-upgrade (default: 100).
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
    /// Inbound queue capacity in messages (default: 1024).
    #[serde(default = "default_inbound_queue_capacity")]
    pub inbound_queue_capacity: usize,
    /// Largest accepted text frame in bytes (default: 64 KiB).
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
    /// Per-peer write deadline during fan-out, in milliseconds (default: 5000).
    /// A peer that misses it is treated as unreachable.
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
    /// Deadline for a new stream to finish the WebSocket handshake, in
    /// milliseconds (default: 5000). The admission ticket is released when
    /// it expires.
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_clients: default_max_clients(),
            inbound_queue_capacity: default_inbound_queue_capacity(),
            max_message_bytes: default_max_message_bytes(),
            write_timeout_ms: default_write_timeout_ms(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
        }
    }
}

fn default_max_clients() -> usize {
    100
}

fn default_inbound_queue_capacity() -> usize {
    1024
}

fn default_max_message_bytes() -> usize {
    64 * 1024
}

fn default_write_timeout_ms() -> u64 {
    5000
}

fn default_handshake_timeout_ms() -> u64 {
    5000
}
