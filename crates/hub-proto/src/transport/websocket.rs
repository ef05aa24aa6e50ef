//! WebSocket adapter.
//!
//! Splits an upgraded `tokio-tungstenite` stream into a [`WsSink`] and a
//! [`WsSource`]. Ping/pong is answered by tungstenite itself; binary
//! application frames are rejected because the hub only carries text.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::trace;

use super::{CloseNotice, Frame, FrameSink, FrameSource};
use crate::error::TransportError;

/// Write half of a WebSocket connection.
pub struct WsSink<S> {
    inner: SplitSink<WebSocketStream<S>, WsMessage>,
    closed: bool,
}

/// Read half of a WebSocket connection.
pub struct WsSource<S> {
    inner: SplitStream<WebSocketStream<S>>,
}

/// Split an upgraded WebSocket stream into its two halves.
pub fn split<S>(stream: WebSocketStream<S>) -> (WsSink<S>, WsSource<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (sink, source) = stream.split();
    (
        WsSink {
            inner: sink,
            closed: false,
        },
        WsSource { inner: source },
    )
}

fn map_ws_error(err: WsError) -> TransportError {
    match err {
        WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::Closed,
        WsError::Io(io) => TransportError::Io(io),
        other => TransportError::Protocol(other.to_string()),
    }
}

fn to_close_frame(notice: CloseNotice) -> CloseFrame<'static> {
    CloseFrame {
        code: CloseCode::from(notice.code),
        reason: notice.reason.into(),
    }
}

#[async_trait]
impl<S> FrameSource for WsSource<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            match self.inner.next().await {
                Some(Ok(WsMessage::Text(text))) => return Ok(Some(Frame::Text(text))),
                Some(Ok(WsMessage::Close(frame))) => {
                    let notice = frame
                        .map(|f| CloseNotice::new(u16::from(f.code), f.reason.into_owned()));
                    return Ok(Some(Frame::Close(notice)));
                }
                Some(Ok(WsMessage::Binary(data))) => {
                    return Err(TransportError::Decode(format!(
                        "binary frame of {} bytes on a text-only channel",
                        data.len()
                    )));
                }
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {
                    trace!("skipping control frame");
                    continue;
                }
                Some(Err(e)) => return Err(map_ws_error(e)),
                None => return Ok(None),
            }
        }
    }
}

#[async_trait]
impl<S> FrameSink for WsSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.inner
            .send(WsMessage::Text(text.to_owned()))
            .await
            .map_err(map_ws_error)
    }

    async fn send_close(&mut self, notice: Option<CloseNotice>) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.inner
            .send(WsMessage::Close(notice.map(to_close_frame)))
            .await
            .map_err(map_ws_error)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.inner.close().await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(map_ws_error(e)),
        }
    }
}
