//! HTTP server for the Prometheus metrics endpoint.
//!
//! Runs on its own tokio task, separate from the WebSocket listener, and
//! serves `/metrics` for scraping plus `/status` with a JSON summary of the
//! hub. It stops when the hub stops admitting peers.

use crate::state::Hub;
use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

/// Body of `GET /status`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub server: String,
    pub phase: &'static str,
    pub peers: usize,
    pub capacity: usize,
    pub admitted: u64,
    pub rejected: u64,
    pub broadcasts: u64,
    pub abnormal_disconnects: u64,
    pub log_entries: usize,
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

async fn status_handler(State(hub): State<Arc<Hub>>) -> Json<StatusReport> {
    Json(status(&hub).await)
}

/// Snapshot of the hub for operators.
pub async fn status(hub: &Hub) -> StatusReport {
    StatusReport {
        server: hub.server_name.clone(),
        phase: hub.lifecycle.phase().as_str(),
        peers: hub.registry.len().await,
        capacity: hub.admission.capacity(),
        admitted: hub.stats.admitted(),
        rejected: hub.stats.rejected(),
        broadcasts: hub.stats.broadcasts(),
        abnormal_disconnects: hub.stats.abnormal_disconnects(),
        log_entries: hub.session_log.len(),
    }
}

/// Routes served by the metrics listener.
pub fn router(hub: Arc<Hub>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/status", get(status_handler))
        .with_state(hub)
}

/// Run the HTTP server for Prometheus metrics.
///
/// Binds to `0.0.0.0:port`. Returns once the hub stops admitting peers, or
/// immediately if the port cannot be bound.
pub async fn run_http_server(port: u16, hub: Arc<Hub>) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let stop = hub.lifecycle.admissions();

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind HTTP server");
            return;
        }
    };
    tracing::info!(%addr, "Prometheus HTTP server listening");

    let serve = axum::serve(listener, router(hub))
        .with_graceful_shutdown(async move { stop.cancelled().await });
    if let Err(e) = serve.await {
        tracing::error!(error = %e, "HTTP server error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;

    #[tokio::test]
    async fn status_reflects_hub_state() {
        let hub = Hub::with_limits(
            "status.hub",
            LimitsConfig {
                max_clients: 7,
                ..LimitsConfig::default()
            },
        );
        hub.session_log.append("client1", "hi");
        hub.stats.record_rejected();

        let report = status(&hub).await;
        assert_eq!(report.server, "status.hub");
        assert_eq!(report.phase, "running");
        assert_eq!(report.capacity, 7);
        assert_eq!(report.peers, 0);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.log_entries, 1);
    }

    #[tokio::test]
    async fn status_serializes_as_flat_json() {
        let hub = Hub::with_limits("status.hub", LimitsConfig::default());
        let value = serde_json::to_value(status(&hub).await).unwrap();

        assert_eq!(value["server"], "status.hub");
        assert_eq!(value["phase"], "running");
        assert_eq!(value["capacity"], 100);
        assert_eq!(value["log_entries"], 0);
    }

    #[tokio::test]
    async fn server_exits_when_admissions_stop() {
        let hub = Arc::new(Hub::with_limits("status.hub", LimitsConfig::default()));
        let task = tokio::spawn(run_http_server(0, Arc::clone(&hub)));

        hub.lifecycle.stop_admissions();
        tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .expect("metrics server did not stop")
            .unwrap();
    }
}
