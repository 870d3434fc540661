//! Shared error type across chzzk-chat crates.

use thiserror::Error;

/// Stable error codes, suitable for logs and embedder-side matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Every candidate edge failed its probe.
    NoServer,
    /// WebSocket handshake failed.
    DialFailed,
    /// A bounded operation ran out of time.
    Timeout,
    /// Socket read failed mid-session.
    Transport,
    /// Socket write failed.
    WriteFailed,
    /// Inbound frame could not be decoded.
    Decode,
    /// Operation not allowed in the current session state.
    InvalidState,
    /// Configuration rejected.
    BadConfig,
    /// Unsupported configuration version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NoServer => "NO_SERVER",
            ErrorCode::DialFailed => "DIAL_FAILED",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::WriteFailed => "WRITE_FAILED",
            ErrorCode::Decode => "DECODE",
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Unified error type used by core and client.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    #[error("no chat server reachable")]
    NoServerReachable,
    #[error("dial failed: {0}")]
    Dial(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("write failed: {0}")]
    Write(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("bad config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ChatError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ChatError::NoServerReachable => ErrorCode::NoServer,
            ChatError::Dial(_) => ErrorCode::DialFailed,
            ChatError::Timeout(_) => ErrorCode::Timeout,
            ChatError::Transport(_) => ErrorCode::Transport,
            ChatError::Write(_) => ErrorCode::WriteFailed,
            ChatError::Decode(_) => ErrorCode::Decode,
            ChatError::InvalidState(_) => ErrorCode::InvalidState,
            ChatError::Config(_) => ErrorCode::BadConfig,
            ChatError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            ChatError::Internal(_) => ErrorCode::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_keeps_original_text() {
        let e = ChatError::Transport("connection reset by peer".into());
        assert_eq!(e.to_string(), "transport: connection reset by peer");
        assert_eq!(e.code().as_str(), "TRANSPORT");
    }

    #[test]
    fn no_server_has_distinct_code() {
        assert_eq!(ChatError::NoServerReachable.code(), ErrorCode::NoServer);
        assert_ne!(
            ChatError::NoServerReachable.code(),
            ChatError::Dial(String::new()).code()
        );
    }
}
