//! Gateway - TCP listener that upgrades incoming connections to WebSockets.
//!
//! The Gateway binds the listen socket and spawns a task per accepted
//! stream. Admission is decided before the upgrade: a stream that arrives
//! while the admission gate is empty is answered with `503 Service
//! Unavailable` during the HTTP handshake, and a request for any path other
//! than the configured one gets `404 Not Found`. Every handshake runs under
//! `limits.handshake_timeout_ms`; a stream that stalls past it is dropped and
//! its ticket returns to the gate.

use super::connection::{self, InboundMessage};
use crate::config::ListenConfig;
use crate::error::{ConnectionError, HubError};
use crate::metrics;
use crate::state::{AdmissionTicket, Hub};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async_with_config;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tracing::{debug, error, info, instrument, warn};

/// Body of the 503 answer sent when the hub is full.
pub const CAPACITY_MESSAGE: &str = "Server is at max capacity, try again later";

/// Accepts TCP connections and spawns one connection task per admitted peer.
pub struct Gateway {
    listener: TcpListener,
    path: String,
    hub: Arc<Hub>,
    inbound: mpsc::Sender<InboundMessage>,
}

impl Gateway {
    /// Bind the gateway to the configured address.
    pub async fn bind(
        config: &ListenConfig,
        hub: Arc<Hub>,
        inbound: mpsc::Sender<InboundMessage>,
    ) -> Result<Self, HubError> {
        let listener = TcpListener::bind(config.address)
            .await
            .map_err(|source| HubError::Bind {
                addr: config.address,
                source,
            })?;
        info!(address = %config.address, path = %config.path, "WebSocket listener bound");

        Ok(Self {
            listener,
            path: config.path.clone(),
            hub,
            inbound,
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until admissions stop, then hand back the
    /// listener so the shutdown coordinator decides when it is released.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> TcpListener {
        let stop = self.hub.lifecycle.admissions();

        loop {
            let accepted = tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, addr)) => {
                    // Decided here, synchronously, so a full hub answers
                    // without ever queueing the caller.
                    let ticket = self.hub.admission.try_acquire();
                    if ticket.is_none() {
                        self.hub.stats.record_rejected();
                        metrics::record_rejected();
                        let err = ConnectionError::AdmissionRejected;
                        warn!(%addr, code = err.error_code(), "Connection rejected - server at max capacity");
                    } else {
                        debug!(%addr, "WebSocket connection attempt");
                    }

                    let hub = Arc::clone(&self.hub);
                    let inbound = self.inbound.clone();
                    let path = self.path.clone();
                    tokio::spawn(upgrade(stream, addr, ticket, path, hub, inbound));
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }

        info!("Gateway stopped accepting connections");
        self.listener
    }
}

fn reject(status: StatusCode, body: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(body.to_string()));
    *response.status_mut() = status;
    response
}

/// Answer the HTTP handshake and, if admitted, serve the connection.
async fn upgrade(
    stream: TcpStream,
    addr: SocketAddr,
    ticket: Option<AdmissionTicket>,
    path: String,
    hub: Arc<Hub>,
    inbound: mpsc::Sender<InboundMessage>,
) {
    let admitted = ticket.is_some();
    let callback = |req: &Request, response: Response| {
        if !admitted {
            return Err(reject(StatusCode::SERVICE_UNAVAILABLE, CAPACITY_MESSAGE));
        }
        if req.uri().path() != path {
            debug!(%addr, path = req.uri().path(), "Upgrade requested on unknown path");
            return Err(reject(StatusCode::NOT_FOUND, "Not Found"));
        }
        Ok(response)
    };

    let mut ws_config = WebSocketConfig::default();
    ws_config.max_message_size = Some(hub.max_message_bytes());

    // The whole handshake, refusals included, runs under one deadline.
    let deadline = hub.handshake_timeout();
    let handshake = accept_hdr_async_with_config(stream, callback, Some(ws_config));
    let ws_stream = match tokio::time::timeout(deadline, handshake).await {
        Ok(Ok(ws_stream)) => ws_stream,
        Ok(Err(e)) => {
            // Also covers the 503/404 answers: the handshake "fails" after
            // the error response has been written.
            if admitted {
                let err = ConnectionError::UpgradeFailed(e.to_string());
                warn!(%addr, code = err.error_code(), error = %err, "WebSocket handshake failed");
            }
            return;
        }
        Err(_) => {
            let err = ConnectionError::UpgradeFailed(format!(
                "handshake not completed within {}ms",
                deadline.as_millis()
            ));
            debug!(%addr, admitted, code = err.error_code(), error = %err, "WebSocket handshake timed out");
            return;
        }
    };

    let Some(ticket) = ticket else {
        return;
    };

    debug!(%addr, "WebSocket handshake successful");
    let (sink, source) = hub_proto::transport::websocket::split(ws_stream);
    connection::serve(
        hub,
        inbound,
        Box::new(sink),
        Box::new(source),
        ticket,
        Some(addr),
    )
    .await;
}
