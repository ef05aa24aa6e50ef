//! The Hub - shared state of one server instance.
//!
//! Every component receives an `Arc<Hub>` instead of reaching for globals,
//! so several hubs can run side by side in one process.

use super::managers::admission::AdmissionGate;
use super::managers::lifecycle::LifecycleManager;
use super::managers::registry::{ConnectionRegistry, RegistryEntry};
use super::managers::stats::{RetireReason, StatsManager};
use super::uid::ConnId;
use crate::config::{Config, LimitsConfig};
use crate::history::SessionLog;
use crate::metrics;
use hub_proto::CloseNotice;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Shared hub state.
pub struct Hub {
    /// Server name, used in logs.
    pub server_name: String,
    /// Live connections.
    pub registry: ConnectionRegistry,
    /// Concurrent connection budget.
    pub admission: AdmissionGate,
    /// Messages processed this run.
    pub session_log: SessionLog,
    /// Runtime counters, including the disconnect counter.
    pub stats: StatsManager,
    /// Shutdown state machine.
    pub lifecycle: LifecycleManager,
    limits: LimitsConfig,
}

impl Hub {
    /// Build hub state from configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_limits(config.server.name.clone(), config.limits.clone())
    }

    /// Build hub state from limits alone.
    pub fn with_limits(server_name: impl Into<String>, limits: LimitsConfig) -> Self {
        Self {
            server_name: server_name.into(),
            registry: ConnectionRegistry::new(),
            admission: AdmissionGate::new(limits.max_clients),
            session_log: SessionLog::new(),
            stats: StatsManager::new(),
            lifecycle: LifecycleManager::new(),
            limits,
        }
    }

    /// Deadline for one broadcast write.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.limits.write_timeout_ms)
    }

    /// Deadline for a new stream to complete its WebSocket handshake.
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.limits.handshake_timeout_ms)
    }

    /// Largest accepted inbound text, in bytes.
    pub fn max_message_bytes(&self) -> usize {
        self.limits.max_message_bytes
    }

    /// Inbound queue capacity.
    pub fn inbound_queue_capacity(&self) -> usize {
        self.limits.inbound_queue_capacity
    }

    /// Retire a connection: the single teardown path for every reason.
    ///
    /// Removes the registry entry, stops the connection's reader, closes its
    /// sink, and counts the disconnect. Calling it for a connection that is
    /// already gone does nothing and returns `false`. The admission ticket is
    /// owned by the connection task and is released when that task returns.
    pub async fn retire(&self, id: ConnId, reason: RetireReason) -> bool {
        match self.registry.deregister(id).await {
            Some(entry) => {
                self.finish_retire(id, entry, reason).await;
                true
            }
            None => false,
        }
    }

    /// Tear down an entry that has already been removed from the registry.
    ///
    /// Used directly by callers that removed the entry under their own
    /// registry guard.
    pub(crate) async fn finish_retire(&self, id: ConnId, entry: RegistryEntry, reason: RetireReason) {
        let (identity, mut sink, reader) = entry.into_parts();
        reader.cancel();

        let deadline = self.write_timeout();
        if reason == RetireReason::Shutdown {
            match timeout(deadline, sink.send_close(Some(CloseNotice::shutdown()))).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(%identity, error = %e, "Close notification not delivered"),
                Err(_) => debug!(%identity, "Close notification timed out"),
            }
        }
        match timeout(deadline, sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(%identity, error = %e, "Error closing connection"),
            Err(_) => debug!(%identity, "Closing connection timed out"),
        }

        self.stats.record_retired(reason);
        metrics::record_retired(reason.as_str());

        if reason.is_abnormal() {
            warn!(%identity, conn = id.get(), reason = reason.as_str(), "Client disconnected");
        } else {
            info!(%identity, conn = id.get(), reason = reason.as_str(), "Client disconnected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_proto::transport::memory::duplex;
    use hub_proto::{Frame, FrameSource};
    use tokio_util::sync::CancellationToken;

    fn test_hub() -> Hub {
        Hub::with_limits("test.hub", LimitsConfig::default())
    }

    #[tokio::test]
    async fn retire_is_idempotent_and_counts_once() {
        let hub = test_hub();
        let (server, _client) = duplex(4);
        let token = CancellationToken::new();
        let (id, _) = hub
            .registry
            .register(server.boxed().0, token.clone())
            .await
            .unwrap();

        assert!(hub.retire(id, RetireReason::ReadFailure).await);
        assert!(!hub.retire(id, RetireReason::ReadFailure).await);

        assert!(token.is_cancelled());
        assert_eq!(hub.stats.abnormal_disconnects(), 1);
        assert_eq!(hub.registry.len().await, 0);
    }

    #[tokio::test]
    async fn shutdown_retirement_sends_close_notice() {
        let hub = test_hub();
        let (server, mut client) = duplex(4);
        let (id, _) = hub
            .registry
            .register(server.boxed().0, CancellationToken::new())
            .await
            .unwrap();

        hub.retire(id, RetireReason::Shutdown).await;

        assert_eq!(
            client.source.next_frame().await.unwrap(),
            Some(Frame::Close(Some(CloseNotice::shutdown())))
        );
        assert_eq!(client.source.next_frame().await.unwrap(), None);
        assert_eq!(hub.stats.abnormal_disconnects(), 0);
    }
}
