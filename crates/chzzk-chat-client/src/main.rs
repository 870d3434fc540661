//! chzzk-chat demo client
//!
//! Connects to one channel's chat and logs every delivered event.
//! Usage: `chzzk-chat [config.yaml]` (default `chzzk-chat.yaml`).
//! Ctrl-C closes the session cleanly.

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use chzzk_chat_client::{config, Session};

const DEFAULT_CONFIG: &str = "chzzk-chat.yaml";

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), err = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    let mut session = Session::with_options(cfg.token.clone(), cfg.session_options());
    session.on_chat_message(|batch| {
        for ev in batch {
            tracing::info!(
                kind = ?ev.kind,
                nickname = %ev.user.nickname,
                amount = %ev.user.donation.amount,
                "{}",
                ev.message
            );
        }
    });
    let session = Arc::new(session);

    let closer = session.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received; closing");
            closer.close();
        }
    });

    tracing::info!(channel = %cfg.token.channel_id, "chzzk-chat starting");
    let res = session.connect().await;
    tracing::info!("{}", session.metrics().render().trim_end());

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), err = %e, "session failed");
            ExitCode::FAILURE
        }
    }
}
