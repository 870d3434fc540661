//! Public session handle: server selection, dial, and worker lifecycle.

use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::Instrument;
use tokio_util::sync::CancellationToken;

use chzzk_chat_core::error::{ChatError, Result};
use chzzk_chat_core::protocol::outbound::setup_frame;
use chzzk_chat_core::protocol::ChatEvent;
use chzzk_chat_core::Token;

use crate::config::SessionOptions;
use crate::dispatch::{ChatCallback, Dispatcher};
use crate::obs::SessionMetrics;
use crate::selector::{select_server, Prober, WsProber};
use crate::session::heartbeat::run_heartbeat;
use crate::session::reader::run_reader;
use crate::session::state::{LoginState, SessionState, StateCell};
use crate::session::writer::{send_frame, FrameSink, WsWriter};
use crate::transport::dial;

/// Chat session for one channel.
///
/// Register the callback first, then share the session (e.g. in an `Arc`) if
/// another task needs `close()` or status queries while `connect()` runs.
/// A session is single-use: once `Closed`, `connect` fails.
pub struct Session {
    token: Token,
    options: SessionOptions,
    callback: Option<ChatCallback>,
    prober: Option<Arc<dyn Prober>>,
    state: StateCell,
    login: Arc<LoginState>,
    server_url: Mutex<Option<String>>,
    metrics: Arc<SessionMetrics>,
    cancel: CancellationToken,
}

impl Session {
    pub fn new(token: Token) -> Self {
        Self::with_options(token, SessionOptions::default())
    }

    pub fn with_options(token: Token, options: SessionOptions) -> Self {
        Self {
            token,
            options,
            callback: None,
            prober: None,
            state: StateCell::new(),
            login: Arc::new(LoginState::default()),
            server_url: Mutex::new(None),
            metrics: Arc::new(SessionMetrics::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the latency prober used for server selection.
    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = Some(prober);
        self
    }

    /// Register the batch handler. Replaces any earlier one.
    pub fn on_chat_message<F>(&mut self, callback: F)
    where
        F: Fn(Vec<ChatEvent>) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.state.get() == SessionState::Running
    }

    pub fn is_authenticated(&self) -> bool {
        self.login.is_authenticated()
    }

    /// Session id from the most recent login-required notice.
    pub fn sid(&self) -> Option<String> {
        self.login.sid()
    }

    /// Edge chosen for this session, once known.
    pub fn server_url(&self) -> Option<String> {
        self.server_url
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn metrics(&self) -> Arc<SessionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Stop the session. A running `connect` returns `Ok(())` once the reader
    /// has stopped and the queue has drained; an idle session becomes `Closed`.
    pub fn close(&self) {
        if self
            .state
            .transition(SessionState::Idle, SessionState::Closed)
            .is_ok()
        {
            return;
        }
        self.cancel.cancel();
    }

    /// Select a server, dial, and drive the session until it ends.
    ///
    /// Blocks until the peer closes (`Ok`), `close()` is called (`Ok`), or
    /// the transport fails (`Err` carrying the original failure).
    pub async fn connect(&self) -> Result<()> {
        self.state
            .transition(SessionState::Idle, SessionState::Dialing)
            .map_err(|s| ChatError::InvalidState(format!("connect called in state {s:?}")))?;

        let span = tracing::info_span!("chat_session", channel = %self.token.channel_id);
        let res = self.run().instrument(span).await;
        self.state.set(SessionState::Closed);
        res
    }

    async fn run(&self) -> Result<()> {
        self.options.validate()?;

        let dialed = tokio::select! {
            _ = self.cancel.cancelled() => None,
            res = self.open() => Some(res?),
        };
        let Some((url, ws)) = dialed else {
            tracing::info!("closed while dialing");
            return Ok(());
        };
        tracing::info!(%url, "connected");

        let (sink, source) = ws.split();
        let writer = Arc::new(WsWriter::new(sink));
        let frame_sink: Arc<dyn FrameSink> = writer.clone();
        self.state.set(SessionState::Running);

        let (tx, mut rx) = mpsc::channel(self.options.chat.queue_capacity);
        let workers = self.cancel.child_token();

        let reader = tokio::spawn(run_reader(source, tx, workers.clone()).in_current_span());

        send_frame(
            frame_sink.as_ref(),
            &self.metrics,
            "setup",
            setup_frame(&self.token),
        )
        .await;

        let heartbeat = tokio::spawn(
            run_heartbeat(
                frame_sink.clone(),
                self.metrics.clone(),
                self.options.chat.ping_interval(),
                workers.clone(),
            )
            .in_current_span(),
        );

        let dispatcher = Dispatcher::new(
            self.token.channel_id.clone(),
            frame_sink,
            self.callback.clone(),
            self.login.clone(),
            self.metrics.clone(),
        );
        let mut res = dispatcher.run(&mut rx).await;

        self.state.set(SessionState::Closing);
        workers.cancel();
        drop(rx);
        writer.close().await;
        let joined = [("reader", reader.await), ("heartbeat", heartbeat.await)];
        for (worker, outcome) in joined {
            if let Err(e) = outcome {
                tracing::error!(worker, err = %e, "session worker panicked");
                if res.is_ok() {
                    res = Err(ChatError::Internal(format!("{worker} worker failed: {e}")));
                }
            }
        }

        match &res {
            Ok(()) => tracing::info!("session closed"),
            Err(e) => tracing::info!(err = %e, "session ended with error"),
        }
        res
    }

    async fn open(&self) -> Result<(String, crate::transport::WsStream)> {
        let url = self.resolve_server().await?;
        *self.server_url.lock().unwrap_or_else(|e| e.into_inner()) = Some(url.clone());
        let ws = dial(&url, self.options.chat.handshake_timeout()).await?;
        Ok((url, ws))
    }

    async fn resolve_server(&self) -> Result<String> {
        if let Some(url) = &self.options.chat.server_url {
            return Ok(url.clone());
        }

        let probe = &self.options.probe;
        let prober: Arc<dyn Prober> = match &self.prober {
            Some(p) => p.clone(),
            None => Arc::new(WsProber::new(probe.timeout())),
        };
        let url = select_server(prober.as_ref(), &probe.servers, probe.parallel)
            .await
            .ok_or(ChatError::NoServerReachable)?;
        tracing::info!(%url, "server selected");
        Ok(url)
    }
}
