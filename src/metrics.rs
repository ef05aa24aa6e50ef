//! Prometheus metrics collection for broadcast-hub.
//!
//! Metrics live in a process-wide registry and are recorded only after
//! [`init`] has run; before that every helper is a no-op, so hubs created
//! in tests never need a registry.
//!
//! - `hub_connections_admitted_total` - Peers that passed the admission gate
//! - `hub_admission_rejected_total` - Peers refused with 503
//! - `hub_messages_broadcast_total` - Messages processed by the fan-out engine
//! - `hub_write_failures_total` - Broadcast writes that failed or timed out
//! - `hub_disconnects_total{reason}` - Connections retired, by reason
//! - `hub_connected_peers` - Registered connections (gauge)
//! - `hub_message_fanout` - Recipients per message (histogram)

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

pub static CONNECTIONS_ADMITTED: OnceLock<IntCounter> = OnceLock::new();

pub static ADMISSION_REJECTED: OnceLock<IntCounter> = OnceLock::new();

pub static MESSAGES_BROADCAST: OnceLock<IntCounter> = OnceLock::new();

pub static WRITE_FAILURES: OnceLock<IntCounter> = OnceLock::new();

/// Connections retired, labeled by reason.
pub static DISCONNECTS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges and histograms
// ========================================================================

pub static CONNECTED_PEERS: OnceLock<IntGauge> = OnceLock::new();

/// Message fan-out histogram: how many peers received each message.
pub static MESSAGE_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; only the first call registers.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            if $metric.get().is_none() {
                match $init {
                    Ok(m) => {
                        if let Err(e) = r.register(Box::new(m.clone())) {
                            tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                        }
                        let _ = $metric.set(m);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                    }
                }
            }
        };
    }

    register!(CONNECTIONS_ADMITTED, IntCounter::new("hub_connections_admitted_total", "Peers admitted"));
    register!(ADMISSION_REJECTED, IntCounter::new("hub_admission_rejected_total", "Peers refused at capacity"));
    register!(MESSAGES_BROADCAST, IntCounter::new("hub_messages_broadcast_total", "Messages processed by the fan-out engine"));
    register!(WRITE_FAILURES, IntCounter::new("hub_write_failures_total", "Broadcast writes that failed"));
    register!(DISCONNECTS, IntCounterVec::new(Opts::new("hub_disconnects_total", "Connections retired by reason"), &["reason"]));
    register!(CONNECTED_PEERS, IntGauge::new("hub_connected_peers", "Registered connections"));
    register!(MESSAGE_FANOUT, Histogram::with_opts(
        HistogramOpts::new("hub_message_fanout", "Recipients per broadcast message")
            .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

#[inline]
pub fn record_admitted() {
    if let Some(c) = CONNECTIONS_ADMITTED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_rejected() {
    if let Some(c) = ADMISSION_REJECTED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_registered() {
    if let Some(g) = CONNECTED_PEERS.get() {
        g.inc();
    }
}

/// Record a retirement and drop the peer from the connected gauge.
#[inline]
pub fn record_retired(reason: &str) {
    if let Some(c) = DISCONNECTS.get() {
        c.with_label_values(&[reason]).inc();
    }
    if let Some(g) = CONNECTED_PEERS.get() {
        g.dec();
    }
}

/// Record one processed message and how many peers received it.
#[inline]
pub fn record_broadcast(recipients: usize, failures: usize) {
    if let Some(c) = MESSAGES_BROADCAST.get() {
        c.inc();
    }
    if let Some(h) = MESSAGE_FANOUT.get() {
        h.observe(recipients as f64);
    }
    if failures > 0
        && let Some(c) = WRITE_FAILURES.get()
    {
        c.inc_by(failures as u64);
    }
}
