//! Serialized writes onto the shared socket.
//!
//! The setup frame, heartbeat pings, pongs and login frames all go through one
//! `FrameSink`; `WsWriter` holds the socket's sink half behind a mutex so at
//! most one write is in flight.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::SinkExt;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use chzzk_chat_core::error::{ChatError, Result};

use crate::obs::SessionMetrics;
use crate::transport::WsSink;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Outbound text channel shared by the dispatcher and the heartbeat.
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn send_text(&self, text: String) -> Result<()>;
}

pub struct WsWriter {
    sink: Mutex<WsSink>,
}

impl WsWriter {
    pub fn new(sink: WsSink) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Best-effort Close frame; errors mean the socket is already gone.
    pub async fn close(&self) {
        let mut sink = self.sink.lock().await;
        if let Ok(Err(e)) = timeout(CLOSE_TIMEOUT, sink.close()).await {
            tracing::debug!(err = %e, "close frame not sent");
        }
    }
}

#[async_trait]
impl FrameSink for WsWriter {
    async fn send_text(&self, text: String) -> Result<()> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::text(text))
            .await
            .map_err(|e| ChatError::Write(e.to_string()))
    }
}

/// Send one control frame. Failures are logged and counted, never retried:
/// a dead socket surfaces through the reader instead.
pub async fn send_frame(
    sink: &dyn FrameSink,
    metrics: &SessionMetrics,
    kind: &str,
    text: String,
) -> bool {
    match sink.send_text(text).await {
        Ok(()) => {
            metrics.frames_out.inc(&[("kind", kind), ("result", "ok")]);
            tracing::debug!(kind, "frame sent");
            true
        }
        Err(e) => {
            metrics.frames_out.inc(&[("kind", kind), ("result", "error")]);
            tracing::warn!(kind, err = %e, "frame dropped");
            false
        }
    }
}
