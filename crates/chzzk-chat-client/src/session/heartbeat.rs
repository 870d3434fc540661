//! Heartbeat worker: one ping per interval for the life of the session.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use chzzk_chat_core::protocol::outbound::ping_frame;

use crate::obs::SessionMetrics;
use crate::session::writer::{send_frame, FrameSink};

/// First ping goes out one full `period` after start. Stops on cancel or on
/// the first failed write.
pub async fn run_heartbeat(
    sink: Arc<dyn FrameSink>,
    metrics: Arc<SessionMetrics>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {
                if !send_frame(sink.as_ref(), &metrics, "ping", ping_frame()).await {
                    tracing::debug!("heartbeat stopped: socket write failed");
                    break;
                }
            }
        }
    }
}
