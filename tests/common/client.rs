//! Test WebSocket client.
//!
//! Provides a peer for integration testing that can send text and assert on
//! received broadcasts and close frames.

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// A test peer.
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[allow(dead_code)]
impl TestClient {
    /// Connect to a hub.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let (stream, _) = connect_async(url).await?;
        Ok(Self { stream })
    }

    /// Attempt a connection that the hub is expected to refuse.
    ///
    /// Returns the HTTP status and body of the refusal.
    pub async fn expect_refusal(url: &str) -> anyhow::Result<(u16, String)> {
        match connect_async(url).await {
            Ok(_) => anyhow::bail!("connection to {url} was accepted"),
            Err(WsError::Http(response)) => {
                let body = response
                    .body()
                    .as_ref()
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                    .unwrap_or_default();
                Ok((response.status().as_u16(), body))
            }
            Err(other) => anyhow::bail!("unexpected handshake error: {other}"),
        }
    }

    /// Send a text message.
    pub async fn send(&mut self, text: &str) -> anyhow::Result<()> {
        self.stream.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    /// Send a binary message, which the hub does not accept.
    pub async fn send_binary(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.stream.send(Message::Binary(data.to_vec())).await?;
        Ok(())
    }

    /// Receive the next application message.
    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive the next application message with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Message> {
        loop {
            let msg = timeout(dur, self.stream.next())
                .await?
                .ok_or_else(|| anyhow::anyhow!("stream ended"))??;
            if !matches!(msg, Message::Ping(_) | Message::Pong(_)) {
                return Ok(msg);
            }
        }
    }

    /// Receive a broadcast, failing on anything else.
    pub async fn recv_text(&mut self) -> anyhow::Result<String> {
        match self.recv().await? {
            Message::Text(text) => Ok(text),
            other => anyhow::bail!("expected text, got {other:?}"),
        }
    }

    /// Receive the server's close frame.
    pub async fn recv_close(&mut self) -> anyhow::Result<Option<CloseFrame<'static>>> {
        match self.recv().await? {
            Message::Close(frame) => Ok(frame),
            other => anyhow::bail!("expected close, got {other:?}"),
        }
    }

    /// Whether the connection ends within `dur` (close frame, EOF, or error).
    pub async fn is_closed_within(&mut self, dur: Duration) -> bool {
        matches!(
            timeout(dur, async {
                loop {
                    match self.stream.next().await {
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                        Some(Ok(_)) => continue,
                    }
                }
            })
            .await,
            Ok(())
        )
    }

    /// Perform a clean close handshake.
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.stream.close(None).await?;
        // Drain until the server's close reply arrives.
        while let Ok(Some(Ok(msg))) = timeout(Duration::from_secs(2), self.stream.next()).await {
            if msg.is_close() {
                break;
            }
        }
        Ok(())
    }
}
