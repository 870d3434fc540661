//! Reader worker: socket -> bounded queue.

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_util::sync::CancellationToken;

use chzzk_chat_core::error::ChatError;

use crate::transport::codec::{decode, Frame, Inbound};

/// Forward frames in socket order until the peer closes, a read fails, or
/// `cancel` fires. A read failure is queued as `Frame::Closed` and is always
/// the last element. Blocks on a full queue (backpressure).
pub async fn run_reader<S>(mut source: S, tx: mpsc::Sender<Frame>, cancel: CancellationToken)
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("reader cancelled");
                break;
            }
            next = source.next() => next,
        };

        match next {
            Some(Ok(msg)) => match decode(msg) {
                Inbound::Text(text) => {
                    if tx.send(Frame::Text(text)).await.is_err() {
                        break;
                    }
                }
                Inbound::Skip => {}
                Inbound::Close => {
                    tracing::debug!("peer sent close");
                    break;
                }
            },
            Some(Err(e)) => {
                tracing::debug!(err = %e, "read failed");
                let _ = tx.send(Frame::Closed(ChatError::Transport(e.to_string()))).await;
                break;
            }
            None => {
                tracing::debug!("socket stream ended");
                break;
            }
        }
    }
}
