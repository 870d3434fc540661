//! Inbound envelope (JSON).
//!
//! Only `cmd` is read eagerly; `bdy` is kept as `RawValue` so ping and login
//! notices never pay for decoding a chat batch.

use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::{ChatError, Result};
use crate::protocol::cmd::Cmd;
use crate::protocol::event::value_text;

/// Server-to-client envelope. Unknown fields (`ver`, `svcid`, `tid`, ...) are
/// tolerated since the edge adds them freely.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Command code; numeric on the wire, occasionally a numeric string.
    #[serde(default)]
    pub cmd: Option<Value>,
    /// Optional body, stored as raw JSON (lazy parsing).
    #[serde(default)]
    pub bdy: Option<Box<RawValue>>,
}

#[derive(Debug, Deserialize)]
struct LoginRequiredBody {
    #[serde(default)]
    sid: Option<Value>,
}

impl Envelope {
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| ChatError::Decode(format!("invalid envelope json: {e}")))
    }

    /// Decoded command, or `None` when the envelope has no numeric `cmd`.
    ///
    /// A missing or non-numeric `cmd` is deliberately not read as 0 (ping):
    /// such frames are ignored rather than answered with a pong.
    pub fn cmd(&self) -> Option<Cmd> {
        let code = match self.cmd.as_ref()? {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => s.trim().parse::<i64>().ok()?,
            _ => return None,
        };
        Some(Cmd::from_code(code))
    }

    /// Session id from a login-required body (`bdy.sid`). `None` only when
    /// the field is absent or null; an empty string is a valid sid.
    pub fn sid(&self) -> Option<String> {
        let raw = self.bdy.as_ref()?;
        let body: LoginRequiredBody = serde_json::from_str(raw.get()).ok()?;
        match body.sid {
            None | Some(Value::Null) => None,
            Some(sid) => Some(value_text(Some(&sid))),
        }
    }

    pub fn body(&self) -> Option<&RawValue> {
        self.bdy.as_deref()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn reads_numeric_cmd() {
        let env = Envelope::parse(r#"{"cmd":0}"#).unwrap();
        assert_eq!(env.cmd(), Some(Cmd::Ping));
        assert!(env.body().is_none());
    }

    #[test]
    fn missing_cmd_is_none() {
        let env = Envelope::parse(r#"{"ver":"2"}"#).unwrap();
        assert_eq!(env.cmd(), None);
    }

    #[test]
    fn string_cmd_is_accepted() {
        let env = Envelope::parse(r#"{"cmd":"93101","bdy":[]}"#).unwrap();
        assert_eq!(env.cmd(), Some(Cmd::Chat));
    }

    #[test]
    fn sid_from_login_required() {
        let env = Envelope::parse(r#"{"cmd":10100,"bdy":{"sid":"S1","uid":"U"}}"#).unwrap();
        assert_eq!(env.cmd(), Some(Cmd::LoginRequired));
        assert_eq!(env.sid().as_deref(), Some("S1"));
    }

    #[test]
    fn sid_missing_is_none() {
        assert!(Envelope::parse(r#"{"cmd":10100}"#).unwrap().sid().is_none());
        assert!(Envelope::parse(r#"{"cmd":10100,"bdy":{}}"#).unwrap().sid().is_none());
        assert!(Envelope::parse(r#"{"cmd":10100,"bdy":{"sid":null}}"#).unwrap().sid().is_none());
    }

    #[test]
    fn empty_sid_is_kept() {
        let env = Envelope::parse(r#"{"cmd":10100,"bdy":{"sid":""}}"#).unwrap();
        assert_eq!(env.sid().as_deref(), Some(""));
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = Envelope::parse("not json").unwrap_err();
        assert_eq!(err.code().as_str(), "DECODE");
    }
}
