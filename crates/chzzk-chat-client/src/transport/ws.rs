//! Dialing the chat edge.

use std::sync::Once;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use chzzk_chat_core::error::{ChatError, Result};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub type WsSink = SplitSink<WsStream, Message>;
pub type WsSource = SplitStream<WsStream>;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring provider for rustls once per process. A provider
/// installed earlier by the embedder wins.
fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Open a WebSocket to `url`, bounding the handshake by `handshake_timeout`.
pub async fn dial(url: &str, handshake_timeout: Duration) -> Result<WsStream> {
    if url.is_empty() {
        return Err(ChatError::NoServerReachable);
    }
    ensure_crypto();

    match timeout(handshake_timeout, connect_async(url)).await {
        Ok(Ok((stream, _resp))) => Ok(stream),
        Ok(Err(e)) => Err(ChatError::Dial(format!("{url}: {e}"))),
        Err(_) => Err(ChatError::Timeout(format!(
            "handshake with {url} exceeded {}ms",
            handshake_timeout.as_millis()
        ))),
    }
}
