//! Server assembly.
//!
//! Wires one [`Hub`] to its gateway, fan-out engine, shutdown coordinator,
//! and (optionally) the metrics endpoint. Each `Server` owns its own hub,
//! so tests run several side by side in one process.

use crate::config::Config;
use crate::error::HubError;
use crate::history;
use crate::http;
use crate::metrics;
use crate::network::{FanoutEngine, Gateway, ShutdownCoordinator, ShutdownReport};
use crate::state::Hub;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// A running hub.
pub struct Server {
    hub: Arc<Hub>,
    local_addr: SocketAddr,
    coordinator: JoinHandle<ShutdownReport>,
}

impl Server {
    /// Bind the listener and start every task.
    ///
    /// Shutdown begins on SIGINT, SIGTERM, or [`Server::shutdown`].
    pub async fn start(config: Config) -> Result<Self, HubError> {
        metrics::init();

        let hub = Arc::new(Hub::new(&config));
        let (inbound_tx, inbound_rx) = mpsc::channel(hub.inbound_queue_capacity());

        let gateway = Gateway::bind(&config.listen, Arc::clone(&hub), inbound_tx).await?;
        let local_addr = gateway.local_addr().map_err(|source| HubError::Bind {
            addr: config.listen.address,
            source,
        })?;

        let fanout_stop = CancellationToken::new();
        let fanout = tokio::spawn(FanoutEngine::new(Arc::clone(&hub), fanout_stop.clone()).run(inbound_rx));
        let gateway = tokio::spawn(gateway.run());

        if config.server.metrics_port != 0 {
            tokio::spawn(http::run_http_server(
                config.server.metrics_port,
                Arc::clone(&hub),
            ));
        }

        let history = history::sink_from_config(&config.history);
        info!(history = %history.describe(), "Session log destination");
        let coordinator = ShutdownCoordinator::new(Arc::clone(&hub), history)
            .with_gateway(gateway)
            .with_fanout(fanout, fanout_stop);
        let coordinator = tokio::spawn(coordinator.run());

        info!(
            server = %hub.server_name,
            address = %local_addr,
            path = %config.listen.path,
            max_clients = hub.admission.capacity(),
            "WebSocket server started"
        );

        Ok(Self {
            hub,
            local_addr,
            coordinator,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Shared hub state.
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Begin shutdown now and wait for it to finish.
    pub async fn shutdown(self) -> ShutdownReport {
        self.hub.lifecycle.request_shutdown();
        self.wait().await
    }

    /// Wait for shutdown, however it was triggered.
    pub async fn wait(self) -> ShutdownReport {
        match self.coordinator.await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Shutdown coordinator failed");
                ShutdownReport::default()
            }
        }
    }
}
