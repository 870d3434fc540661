//! Outbound control frames.
//!
//! Frames are built as literal templates so the field order on the wire is
//! fixed. Substituted values are JSON-string escaped.

use serde_json::Value;

use crate::token::Token;

pub const PROTOCOL_VERSION: &str = "2";
pub const SERVICE_ID: &str = "game";
pub const DEVICE_TYPE: u32 = 2001;
pub const AUTH_CAPABILITY: &str = "SEND";
pub const RECENT_MESSAGE_COUNT: u32 = 50;
pub const SETUP_TID: u32 = 1;
pub const LOGIN_TID: u32 = 2;

/// Payload of a latency probe; any server reply counts as the echo.
pub const PROBE_FRAME: &str = "{}";

// Infallible: a JSON string value always serializes.
fn quote(s: &str) -> String {
    Value::String(s.to_owned()).to_string()
}

pub fn ping_frame() -> String {
    format!(r#"{{"ver":"{PROTOCOL_VERSION}","cmd":0}}"#)
}

pub fn pong_frame() -> String {
    format!(r#"{{"ver":"{PROTOCOL_VERSION}","cmd":10000}}"#)
}

/// First frame of a session: authenticates the viewer for `SEND`.
pub fn setup_frame(token: &Token) -> String {
    format!(
        r#"{{"ver":"{PROTOCOL_VERSION}","cmd":100,"svcid":"{SERVICE_ID}","cid":{cid},"bdy":{{"uid":{uid},"devType":{DEVICE_TYPE},"accTkn":{acc},"auth":"{AUTH_CAPABILITY}"}},"tid":{SETUP_TID}}}"#,
        cid = quote(&token.channel_id),
        uid = quote(&token.user_id),
        acc = quote(&token.access),
    )
}

/// Reply to a login-required notice; asks the server to replay recent chat.
pub fn login_frame(channel_id: &str, sid: &str) -> String {
    format!(
        r#"{{"ver":"{PROTOCOL_VERSION}","cmd":5101,"svcid":"{SERVICE_ID}","cid":{cid},"sid":{sid},"bdy":{{"recentMessageCount":{RECENT_MESSAGE_COUNT}}},"tid":{LOGIN_TID}}}"#,
        cid = quote(channel_id),
        sid = quote(sid),
    )
}
