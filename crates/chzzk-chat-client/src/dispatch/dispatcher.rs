//! Routes decoded inbound frames to control replies and the chat callback.

use std::sync::Arc;

use tokio::sync::mpsc;

use chzzk_chat_core::error::Result;
use chzzk_chat_core::protocol::outbound::{login_frame, pong_frame};
use chzzk_chat_core::protocol::{decode_batch, ChatEvent, Cmd, Envelope, EventKind};

use crate::obs::SessionMetrics;
use crate::session::state::LoginState;
use crate::session::writer::{send_frame, FrameSink};
use crate::transport::Frame;

/// Receives each decoded batch, in socket order, one call per frame.
pub type ChatCallback = Arc<dyn Fn(Vec<ChatEvent>) + Send + Sync>;

/// Routes inbound frames by command code: answers pings, logs in on request
/// and hands chat/donation batches to the callback.
pub struct Dispatcher {
    channel_id: String,
    sink: Arc<dyn FrameSink>,
    callback: Option<ChatCallback>,
    login: Arc<LoginState>,
    metrics: Arc<SessionMetrics>,
}

impl Dispatcher {
    pub fn new(
        channel_id: impl Into<String>,
        sink: Arc<dyn FrameSink>,
        callback: Option<ChatCallback>,
        login: Arc<LoginState>,
        metrics: Arc<SessionMetrics>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            sink,
            callback,
            login,
            metrics,
        }
    }

    /// Drain the queue until it closes (`Ok`) or a transport failure arrives
    /// (`Err`). Each frame is fully handled before the next is read.
    pub async fn run(&self, rx: &mut mpsc::Receiver<Frame>) -> Result<()> {
        while let Some(frame) = rx.recv().await {
            match frame {
                Frame::Text(text) => self.handle_text(&text).await,
                Frame::Closed(err) => return Err(err),
            }
        }
        Ok(())
    }

    pub async fn handle_text(&self, text: &str) {
        let env = match Envelope::parse(text) {
            Ok(env) => env,
            Err(e) => {
                self.metrics.decode_errors.inc(&[]);
                tracing::warn!(err = %e, len = text.len(), "skipping undecodable frame");
                return;
            }
        };

        let Some(cmd) = env.cmd() else {
            self.metrics.frames_in.inc(&[("cmd", "none")]);
            tracing::trace!("envelope without cmd ignored");
            return;
        };
        self.metrics.frames_in.inc(&[("cmd", cmd.label())]);

        match cmd {
            Cmd::Ping => {
                send_frame(self.sink.as_ref(), &self.metrics, "pong", pong_frame()).await;
            }
            Cmd::LoginRequired => {
                let Some(sid) = env.sid() else {
                    tracing::warn!("login-required notice without sid");
                    return;
                };
                let frame = login_frame(&self.channel_id, &sid);
                if send_frame(self.sink.as_ref(), &self.metrics, "login", frame).await {
                    self.login.record_login(&sid);
                    tracing::info!(%sid, "login sent");
                }
            }
            Cmd::Chat => self.deliver(EventKind::Chat, &env),
            Cmd::Donation => self.deliver(EventKind::Donation, &env),
            other => tracing::trace!(cmd = other.code(), "ignored"),
        }
    }

    fn deliver(&self, kind: EventKind, env: &Envelope) {
        let batch = decode_batch(kind, env.body());
        let n = batch.len() as u64;
        let Some(callback) = &self.callback else {
            tracing::debug!(events = n, "no chat callback registered; batch dropped");
            return;
        };
        callback(batch);
        self.metrics.batches_delivered.inc(&[]);
        self.metrics.events_delivered.add(&[], n);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chzzk_chat_core::error::ChatError;

    use super::*;
    use crate::session::testing::RecordingSink;

    struct Harness {
        sink: Arc<RecordingSink>,
        batches: Arc<Mutex<Vec<Vec<ChatEvent>>>>,
        login: Arc<LoginState>,
        metrics: Arc<SessionMetrics>,
        dispatcher: Dispatcher,
    }

    fn harness() -> Harness {
        let sink = Arc::new(RecordingSink::default());
        let batches: Arc<Mutex<Vec<Vec<ChatEvent>>>> = Arc::default();
        let login = Arc::new(LoginState::default());
        let metrics = Arc::new(SessionMetrics::new());
        let seen = batches.clone();
        let callback: ChatCallback = Arc::new(move |batch| seen.lock().unwrap().push(batch));
        let dispatcher = Dispatcher::new(
            "C",
            sink.clone(),
            Some(callback),
            login.clone(),
            metrics.clone(),
        );
        Harness { sink, batches, login, metrics, dispatcher }
    }

    #[tokio::test]
    async fn ping_gets_exactly_one_pong() {
        let h = harness();
        h.dispatcher.handle_text(r#"{"cmd":0}"#).await;
        assert_eq!(h.sink.sent(), vec![r#"{"ver":"2","cmd":10000}"#.to_string()]);
        assert!(h.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_required_sends_login_with_sid() {
        let h = harness();
        h.dispatcher.handle_text(r#"{"cmd":10100,"bdy":{"sid":"S1"}}"#).await;
        assert_eq!(
            h.sink.sent(),
            vec![r#"{"ver":"2","cmd":5101,"svcid":"game","cid":"C","sid":"S1","bdy":{"recentMessageCount":50},"tid":2}"#.to_string()]
        );
        assert!(h.login.is_authenticated());
        assert_eq!(h.login.sid().as_deref(), Some("S1"));
    }

    #[tokio::test]
    async fn empty_sid_still_gets_login() {
        let h = harness();
        h.dispatcher.handle_text(r#"{"cmd":10100,"bdy":{"sid":""}}"#).await;
        assert_eq!(h.sink.sent(), vec![login_frame("C", "")]);
        assert!(h.login.is_authenticated());
        assert_eq!(h.login.sid().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn login_required_without_sid_sends_nothing() {
        let h = harness();
        h.dispatcher.handle_text(r#"{"cmd":10100,"bdy":{}}"#).await;
        assert!(h.sink.sent().is_empty());
        assert!(!h.login.is_authenticated());
    }

    #[tokio::test]
    async fn unknown_and_malformed_frames_are_inert() {
        let h = harness();
        for text in [r#"{"cmd":93006,"bdy":{}}"#, r#"{"ver":"2"}"#, "not json", r#"{"cmd":10000}"#] {
            h.dispatcher.handle_text(text).await;
        }
        assert!(h.sink.sent().is_empty());
        assert!(h.batches.lock().unwrap().is_empty());
        assert_eq!(h.metrics.decode_errors.total(), 1);
    }

    #[tokio::test]
    async fn empty_batch_still_invokes_callback() {
        let h = harness();
        h.dispatcher.handle_text(r#"{"cmd":93101,"bdy":[]}"#).await;
        let batches = h.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert!(batches[0].is_empty());
    }

    #[tokio::test]
    async fn run_preserves_order_and_stops_at_transport_error() {
        let h = harness();
        let (tx, mut rx) = mpsc::channel(64);
        tx.send(Frame::Text(r#"{"cmd":93101,"bdy":[{"msg":"a"}]}"#.into())).await.unwrap();
        tx.send(Frame::Text(r#"{"cmd":0}"#.into())).await.unwrap();
        tx.send(Frame::Text(r#"{"cmd":93102,"bdy":[{"msg":"b","extras":"{\"payAmount\":\"500\"}"}]}"#.into())).await.unwrap();
        tx.send(Frame::Closed(ChatError::Transport("connection reset".into()))).await.unwrap();
        tx.send(Frame::Text(r#"{"cmd":93101,"bdy":[{"msg":"late"}]}"#.into())).await.unwrap();

        let err = h.dispatcher.run(&mut rx).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));

        let batches = h.batches.lock().unwrap();
        let msgs: Vec<&str> = batches.iter().flatten().map(|e| e.message.as_str()).collect();
        assert_eq!(msgs, ["a", "b"]);
        assert_eq!(batches[1][0].user.donation.amount, "500");
        assert_eq!(h.sink.sent(), vec![pong_frame()]);
        assert_eq!(h.metrics.batches_delivered.total(), 2);
    }

    #[tokio::test]
    async fn run_returns_ok_when_queue_closes() {
        let h = harness();
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(Frame::Text(r#"{"cmd":0}"#.into())).await.unwrap();
        drop(tx);
        assert!(h.dispatcher.run(&mut rx).await.is_ok());
    }

    #[tokio::test]
    async fn batches_without_callback_are_dropped() {
        let sink = Arc::new(RecordingSink::default());
        let metrics = Arc::new(SessionMetrics::new());
        let d = Dispatcher::new("C", sink, None, Arc::default(), metrics.clone());
        d.handle_text(r#"{"cmd":93101,"bdy":[{"msg":"x"}]}"#).await;
        assert_eq!(metrics.batches_delivered.total(), 0);
        assert_eq!(metrics.frames_in.get(&[("cmd", "chat")]), 1);
    }
}
