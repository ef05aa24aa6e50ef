//! Fan-out engine.
//!
//! The single consumer of the inbound queue. One consumer means one total
//! order: the session log and every peer see messages in queue-arrival
//! order.
//!
//! For each message the engine appends to the session log, then takes the
//! registry lock and writes to every registered connection while holding
//! it. Connections whose write fails (or misses the write deadline) are
//! removed under that same lock and retired through the hub, which stops
//! their reader and so releases their admission ticket.

use super::connection::InboundMessage;
use crate::error::ConnectionError;
use crate::metrics;
use crate::state::{ConnId, Hub, RetireReason};
use hub_proto::TransportError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Totals for one engine run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanoutSummary {
    /// Messages appended to the session log and broadcast.
    pub messages: u64,
    /// Successful per-peer writes.
    pub deliveries: u64,
    /// Peers dropped because a write failed.
    pub write_failures: u64,
    /// Messages processed after the stop signal.
    pub drained: u64,
}

/// Outcome of broadcasting one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Session log sequence number.
    pub seq: u64,
    /// Peers that received the message.
    pub delivered: usize,
    /// Peers retired because the write failed.
    pub failed: Vec<ConnId>,
}

/// Single consumer of the inbound queue.
pub struct FanoutEngine {
    hub: Arc<Hub>,
    stop: CancellationToken,
}

impl FanoutEngine {
    pub fn new(hub: Arc<Hub>, stop: CancellationToken) -> Self {
        Self { hub, stop }
    }

    /// Consume `rx` until it is exhausted or the stop token fires.
    ///
    /// On stop, the queue is closed to new sends and everything already
    /// buffered is still broadcast before this returns.
    #[instrument(skip_all, name = "fanout")]
    pub async fn run(self, mut rx: mpsc::Receiver<InboundMessage>) -> FanoutSummary {
        let mut summary = FanoutSummary::default();

        loop {
            let message = tokio::select! {
                biased;
                message = rx.recv() => match message {
                    Some(message) => message,
                    None => {
                        debug!("All inbound senders dropped");
                        return summary;
                    }
                },
                _ = self.stop.cancelled() => break,
            };
            self.process(message, &mut summary).await;
        }

        rx.close();
        while let Some(message) = rx.recv().await {
            self.process(message, &mut summary).await;
            summary.drained += 1;
        }

        info!(
            messages = summary.messages,
            drained = summary.drained,
            write_failures = summary.write_failures,
            "Fan-out stopped"
        );
        summary
    }

    async fn process(&self, message: InboundMessage, summary: &mut FanoutSummary) {
        let outcome = self.broadcast(&message).await;
        summary.messages += 1;
        summary.deliveries += outcome.delivered as u64;
        summary.write_failures += outcome.failed.len() as u64;
    }

    /// Log one message and write it to every registered connection.
    pub async fn broadcast(&self, message: &InboundMessage) -> BroadcastOutcome {
        let seq = self
            .hub
            .session_log
            .append(&message.identity, &message.text);
        let line = format!("{}: {}", message.identity, message.text);
        let deadline = self.hub.write_timeout();

        let mut guard = self.hub.registry.lock().await;
        let recipients = guard.len();
        let mut failed = Vec::new();

        for (id, entry) in guard.iter_mut() {
            let result = match tokio::time::timeout(deadline, entry.sink_mut().send_text(&line)).await
            {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout),
            };
            if let Err(e) = result {
                let err = ConnectionError::WriteFailure(e);
                warn!(
                    identity = entry.identity(),
                    code = err.error_code(),
                    error = %err,
                    "Broadcast write failed"
                );
                failed.push(id);
            }
        }

        let retired: Vec<_> = failed
            .iter()
            .filter_map(|&id| guard.remove(id).map(|entry| (id, entry)))
            .collect();
        drop(guard);

        for (id, entry) in retired {
            self.hub
                .finish_retire(id, entry, RetireReason::WriteFailure)
                .await;
        }

        let delivered = recipients - failed.len();
        self.hub.stats.record_broadcast();
        metrics::record_broadcast(recipients, failed.len());
        debug!(
            seq,
            identity = %message.identity,
            delivered,
            failed = failed.len(),
            "Message broadcast"
        );

        BroadcastOutcome {
            seq,
            delivered,
            failed,
        }
    }
}
