//! In-memory duplex transport.
//!
//! Each side of a [`duplex`] pair gets a sink and a source backed by bounded
//! tokio channels. Dropping or closing one side's sink ends the other side's
//! source; dropping a source makes writes from the other side fail, which is
//! how tests simulate an unreachable peer.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{BoxedSink, BoxedSource, CloseNotice, Frame, FrameSink, FrameSource};
use crate::error::TransportError;

/// Write half of an in-memory channel.
#[derive(Debug)]
pub struct MemorySink {
    tx: Option<mpsc::Sender<Frame>>,
}

/// Read half of an in-memory channel.
#[derive(Debug)]
pub struct MemorySource {
    rx: mpsc::Receiver<Frame>,
}

/// One endpoint of a [`duplex`] pair.
#[derive(Debug)]
pub struct MemoryEnd {
    /// Frames written here arrive at the other endpoint's source.
    pub sink: MemorySink,
    /// Frames written by the other endpoint arrive here.
    pub source: MemorySource,
}

impl MemoryEnd {
    /// Type-erase both halves.
    pub fn boxed(self) -> (BoxedSink, BoxedSource) {
        (Box::new(self.sink), Box::new(self.source))
    }
}

/// Create two connected endpoints, each direction buffering `capacity` frames.
pub fn duplex(capacity: usize) -> (MemoryEnd, MemoryEnd) {
    let (a_tx, a_rx) = mpsc::channel(capacity);
    let (b_tx, b_rx) = mpsc::channel(capacity);
    (
        MemoryEnd {
            sink: MemorySink { tx: Some(a_tx) },
            source: MemorySource { rx: b_rx },
        },
        MemoryEnd {
            sink: MemorySink { tx: Some(b_tx) },
            source: MemorySource { rx: a_rx },
        },
    )
}

impl MemorySink {
    async fn push(&mut self, frame: Frame) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Closed)?;
        tx.send(frame).await.map_err(|_| TransportError::Closed)
    }
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.push(Frame::Text(text.to_owned())).await
    }

    async fn send_close(&mut self, notice: Option<CloseNotice>) -> Result<(), TransportError> {
        self.push(Frame::Close(notice)).await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.tx = None;
        Ok(())
    }
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        Ok(self.rx.recv().await)
    }
}
