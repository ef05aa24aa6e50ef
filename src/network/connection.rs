//! Connection - the per-connection reader.
//!
//! Each admitted connection runs [`serve`] in its own Tokio task:
//!
//! ```text
//!   register (identity assigned)
//!      ↓
//!   tokio::select! { retire token, next frame }
//!      │ Text  → length check → InboundMessage → bounded inbound queue
//!      │ Close → voluntary disconnect
//!      │ error / EOF → read failure
//!      ↓
//!   hub.retire(..)  (unless already retired by fan-out or shutdown)
//!      ↓
//!   admission ticket dropped
//! ```
//!
//! The write half lives in the registry; only the fan-out engine and the
//! shutdown coordinator write to it.

use crate::error::ConnectionError;
use crate::metrics;
use crate::state::{AdmissionTicket, ConnId, Hub, RetireReason};
use crate::telemetry::spans;
use hub_proto::{BoxedSink, BoxedSource, Frame};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

/// A text message on its way from a reader to the fan-out engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sending connection.
    pub conn: ConnId,
    /// Sender identity at the moment the message was read.
    pub identity: String,
    /// Message body, unmodified.
    pub text: String,
}

/// Register an upgraded connection and run its reader until it ends.
///
/// Holds `ticket` for the whole lifetime of the connection; it is released
/// when this function returns, whichever path ended the connection.
/// Returns the reason this reader retired the connection, or `None` when
/// the fan-out engine or the shutdown coordinator retired it first.
pub async fn serve(
    hub: Arc<Hub>,
    inbound: mpsc::Sender<InboundMessage>,
    sink: BoxedSink,
    mut source: BoxedSource,
    ticket: AdmissionTicket,
    addr: Option<SocketAddr>,
) -> Option<RetireReason> {
    let _ticket = ticket;
    let retire = CancellationToken::new();

    let (id, identity) = match hub.registry.register(sink, retire.clone()).await {
        Ok(registered) => registered,
        Err(e) => {
            debug!(?addr, code = e.error_code(), "Connection refused during shutdown");
            return None;
        }
    };

    hub.stats.record_admitted();
    metrics::record_admitted();
    metrics::record_registered();

    let span = spans::connection(&identity, addr);
    async {
        info!("Client connected");
        let reason = read_loop(&hub, &inbound, id, &mut source, &retire).await;
        if let Some(reason) = reason {
            hub.retire(id, reason).await;
        }
        reason
    }
    .instrument(span)
    .await
}

async fn read_loop(
    hub: &Hub,
    inbound: &mpsc::Sender<InboundMessage>,
    id: ConnId,
    source: &mut BoxedSource,
    retire: &CancellationToken,
) -> Option<RetireReason> {
    loop {
        let frame = tokio::select! {
            biased;
            _ = retire.cancelled() => return None,
            frame = source.next_frame() => frame,
        };

        match frame {
            Ok(Some(Frame::Text(text))) => {
                if text.len() > hub.max_message_bytes() {
                    warn!(
                        len = text.len(),
                        max = hub.max_message_bytes(),
                        "Message exceeds size limit"
                    );
                    return Some(RetireReason::ReadFailure);
                }

                // Looked up per message: the entry may already be gone.
                let identity = hub.registry.identity_of(id).await?;
                let message = InboundMessage {
                    conn: id,
                    identity,
                    text,
                };

                tokio::select! {
                    biased;
                    _ = retire.cancelled() => return None,
                    sent = inbound.send(message) => {
                        if sent.is_err() {
                            // Fan-out has stopped; shutdown will retire us.
                            debug!("Inbound queue closed, message dropped");
                            retire.cancelled().await;
                            return None;
                        }
                    }
                }
            }
            Ok(Some(Frame::Close(notice))) => {
                debug!(?notice, "Peer closed connection");
                return Some(RetireReason::Closed);
            }
            Ok(None) => {
                debug!("Connection ended without close handshake");
                return Some(RetireReason::ReadFailure);
            }
            Err(e) => {
                let err = ConnectionError::ReadFailure(e);
                debug!(code = err.error_code(), error = %err, "Read failed");
                return Some(RetireReason::ReadFailure);
            }
        }
    }
}
