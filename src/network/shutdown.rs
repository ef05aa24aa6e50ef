//! Shutdown coordinator.
//!
//! Waits for SIGINT, SIGTERM, or [`LifecycleManager::request_shutdown`],
//! then takes the hub down in a fixed order:
//!
//! 1. **Draining** - stop admissions and wait for the gateway to hand back
//!    its listener; stop the fan-out engine and wait while it broadcasts
//!    everything already queued; then, under the registry lock, close the
//!    registry and send every remaining peer the shutdown close notice.
//! 2. **Persisting** - write the session log once. Failure is reported in
//!    the [`ShutdownReport`] and does not stop the sequence.
//! 3. **Stopped** - release the listener.
//!
//! [`LifecycleManager::request_shutdown`]: crate::state::LifecycleManager::request_shutdown

use super::fanout::FanoutSummary;
use crate::history::{HistoryError, HistorySink};
use crate::state::{Hub, RetireReason, ShutdownPhase};
use crate::telemetry::spans;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, warn};

/// What the shutdown sequence did.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Entries written to durable storage.
    pub persisted: usize,
    /// Peers that were sent the shutdown close notice.
    pub notified: usize,
    /// Fan-out totals, including messages drained after the stop.
    pub fanout: FanoutSummary,
    /// Peers that left with a close frame during the run.
    pub voluntary_disconnects: u64,
    /// Peers lost to read or write failures during the run.
    pub abnormal_disconnects: u64,
    /// Set when the session log could not be written.
    pub persistence_error: Option<HistoryError>,
}

/// Drives the hub from `Running` to `Stopped`.
pub struct ShutdownCoordinator {
    hub: Arc<Hub>,
    history: Arc<dyn HistorySink>,
    gateway: Option<JoinHandle<TcpListener>>,
    fanout: Option<(JoinHandle<FanoutSummary>, CancellationToken)>,
}

impl ShutdownCoordinator {
    pub fn new(hub: Arc<Hub>, history: Arc<dyn HistorySink>) -> Self {
        Self {
            hub,
            history,
            gateway: None,
            fanout: None,
        }
    }

    /// Gateway task; it must return its listener once admissions stop.
    pub fn with_gateway(mut self, gateway: JoinHandle<TcpListener>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Fan-out task and the token that tells it to stop.
    pub fn with_fanout(mut self, fanout: JoinHandle<FanoutSummary>, stop: CancellationToken) -> Self {
        self.fanout = Some((fanout, stop));
        self
    }

    /// Wait for a termination signal or an explicit request, then shut down.
    pub async fn run(self) -> ShutdownReport {
        tokio::select! {
            _ = wait_for_signal() => {}
            _ = self.hub.lifecycle.shutdown_requested() => {
                info!("Shutdown requested");
            }
        }
        self.shutdown().await
    }

    /// Run the shutdown sequence now.
    pub async fn shutdown(self) -> ShutdownReport {
        let span = spans::shutdown(&self.hub.server_name);
        self.sequence().instrument(span).await
    }

    async fn sequence(self) -> ShutdownReport {
        let Self {
            hub,
            history,
            gateway,
            fanout,
        } = self;
        let mut report = ShutdownReport::default();

        info!("Shutting down server");
        hub.lifecycle.advance(ShutdownPhase::Draining);

        hub.lifecycle.stop_admissions();
        hub.admission.close();
        let listener = match gateway {
            Some(handle) => match handle.await {
                Ok(listener) => Some(listener),
                Err(e) => {
                    warn!(error = %e, "Gateway task ended abnormally");
                    None
                }
            },
            None => None,
        };

        if let Some((handle, stop)) = fanout {
            stop.cancel();
            match handle.await {
                Ok(summary) => report.fanout = summary,
                Err(e) => warn!(error = %e, "Fan-out task ended abnormally"),
            }
        }

        {
            let mut guard = hub.registry.lock().await;
            let remaining = guard.close();
            report.notified = remaining.len();
            for (id, entry) in remaining {
                hub.finish_retire(id, entry, RetireReason::Shutdown).await;
            }
        }
        info!(peers = report.notified, "Peers notified");

        hub.lifecycle.advance(ShutdownPhase::Persisting);
        let entries = hub.session_log.take_persistable();
        match history.persist(&entries).await {
            Ok(count) => {
                report.persisted = count;
                info!(count, sink = %history.describe(), "Session log persisted");
            }
            Err(e) => {
                error!(sink = %history.describe(), error = %e, "Error committing the message history");
                report.persistence_error = Some(e);
            }
        }

        report.voluntary_disconnects = hub.stats.voluntary_disconnects();
        report.abnormal_disconnects = hub.stats.abnormal_disconnects();

        drop(listener);
        hub.lifecycle.advance(ShutdownPhase::Stopped);
        info!(
            persisted = report.persisted,
            abnormal_disconnects = report.abnormal_disconnects,
            "Server gracefully stopped"
        );
        report
    }
}

/// Resolve on SIGINT or (on Unix) SIGTERM; both mean the same thing.
pub async fn wait_for_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
