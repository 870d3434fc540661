//! Viewer credentials for one chat session.

use serde::Deserialize;

use crate::error::{ChatError, Result};

/// Opaque credentials obtained by the embedder's HTTP bootstrap.
///
/// Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Token {
    /// Chat access token (`accTkn`).
    pub access: String,
    /// Viewer user id (`uid`).
    pub user_id: String,
    /// Chat channel id (`cid`).
    pub channel_id: String,
}

impl Token {
    pub fn new(
        access: impl Into<String>,
        user_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            access: access.into(),
            user_id: user_id.into(),
            channel_id: channel_id.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.access.is_empty() {
            return Err(ChatError::Config("token.access must not be empty".into()));
        }
        if self.user_id.is_empty() {
            return Err(ChatError::Config("token.user_id must not be empty".into()));
        }
        if self.channel_id.is_empty() {
            return Err(ChatError::Config("token.channel_id must not be empty".into()));
        }
        Ok(())
    }
}
