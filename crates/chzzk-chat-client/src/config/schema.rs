use std::time::Duration;

use serde::Deserialize;

use chzzk_chat_core::error::{ChatError, Result};
use chzzk_chat_core::Token;

const EDGE_URL_PREFIX: &str = "wss://kr-ss";
const EDGE_URL_SUFFIX: &str = ".chat.naver.com/chat";
const EDGE_FIRST: u32 = 1;
const EDGE_LAST: u32 = 10;

/// The ten published chat edges, in probe order.
pub fn edge_pool() -> Vec<String> {
    (EDGE_FIRST..=EDGE_LAST)
        .map(|n| format!("{EDGE_URL_PREFIX}{n}{EDGE_URL_SUFFIX}"))
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    pub token: Token,

    #[serde(default)]
    pub chat: ChatSection,

    #[serde(default)]
    pub probe: ProbeSection,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ChatError::UnsupportedVersion);
        }
        self.token.validate()?;
        self.chat.validate()?;
        if self.chat.server_url.is_none() {
            if self.probe.servers.is_empty() {
                return Err(ChatError::Config("probe.servers must not be empty".into()));
            }
            self.probe.validate()?;
        }
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            chat: self.chat.clone(),
            probe: self.probe.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatSection {
    /// Fixed edge URL; when set, server selection is skipped.
    #[serde(default)]
    pub server_url: Option<String>,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            server_url: None,
            ping_interval_ms: default_ping_interval_ms(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl ChatSection {
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.server_url {
            validate_ws_url("chat.server_url", url)?;
        }
        if !(1000..=120000).contains(&self.ping_interval_ms) {
            return Err(ChatError::Config(
                "chat.ping_interval_ms must be between 1000 and 120000".into(),
            ));
        }
        if !(1000..=60000).contains(&self.handshake_timeout_ms) {
            return Err(ChatError::Config(
                "chat.handshake_timeout_ms must be between 1000 and 60000".into(),
            ));
        }
        if !(1..=4096).contains(&self.queue_capacity) {
            return Err(ChatError::Config(
                "chat.queue_capacity must be between 1 and 4096".into(),
            ));
        }
        Ok(())
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    #[serde(default = "edge_pool")]
    pub servers: Vec<String>,

    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub parallel: bool,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            servers: edge_pool(),
            timeout_ms: default_probe_timeout_ms(),
            parallel: false,
        }
    }
}

impl ProbeSection {
    /// An empty pool passes here; selection over it finds no server.
    pub fn validate(&self) -> Result<()> {
        for url in &self.servers {
            validate_ws_url("probe.servers", url)?;
        }
        if !(500..=60000).contains(&self.timeout_ms) {
            return Err(ChatError::Config(
                "probe.timeout_ms must be between 500 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Runtime knobs for one session. `Default` matches the edge's published
/// behaviour: 20s heartbeat, 15s handshake, 64-frame queue, ten-edge pool.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub chat: ChatSection,
    pub probe: ProbeSection,
}

impl SessionOptions {
    /// Options that skip server selection and dial `url` directly.
    pub fn fixed_server(url: impl Into<String>) -> Self {
        Self {
            chat: ChatSection {
                server_url: Some(url.into()),
                ..ChatSection::default()
            },
            probe: ProbeSection::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.chat.validate()?;
        if self.chat.server_url.is_none() {
            self.probe.validate()?;
        }
        Ok(())
    }
}

fn validate_ws_url(field: &str, url: &str) -> Result<()> {
    if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok(())
    } else {
        Err(ChatError::Config(format!(
            "{field} must be a ws:// or wss:// url (got {url:?})"
        )))
    }
}

fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_handshake_timeout_ms() -> u64 {
    15000
}
fn default_queue_capacity() -> usize {
    64
}
fn default_probe_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_pool_is_ten_numbered_hosts() {
        let pool = edge_pool();
        assert_eq!(pool.len(), 10);
        assert_eq!(pool[0], "wss://kr-ss1.chat.naver.com/chat");
        assert_eq!(pool[9], "wss://kr-ss10.chat.naver.com/chat");
    }

    #[test]
    fn defaults_validate() {
        let opts = SessionOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.chat.ping_interval(), Duration::from_secs(20));
        assert_eq!(opts.chat.handshake_timeout(), Duration::from_secs(15));
        assert_eq!(opts.chat.queue_capacity, 64);
    }

    #[test]
    fn fixed_server_skips_pool_validation() {
        let mut opts = SessionOptions::fixed_server("ws://127.0.0.1:9/chat");
        opts.probe.servers.clear();
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn rejects_non_ws_url() {
        let opts = SessionOptions::fixed_server("http://example.com");
        assert_eq!(opts.validate().unwrap_err().code().as_str(), "BAD_CONFIG");
    }
}
