//! Tracing setup and span constructors.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the default `info` filter. `json` switches to
/// machine-readable output.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Standardized span constructors for hub observability.
pub mod spans {
    use std::net::SocketAddr;
    use tracing::{Span, info_span};

    /// Span for one peer connection.
    pub fn connection(identity: &str, addr: Option<SocketAddr>) -> Span {
        match addr {
            Some(addr) => info_span!("connection", identity = %identity, addr = %addr),
            None => info_span!("connection", identity = %identity),
        }
    }

    /// Span for the shutdown sequence.
    pub fn shutdown(server: &str) -> Span {
        info_span!("shutdown", server = %server)
    }
}
