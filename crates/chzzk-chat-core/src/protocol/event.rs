//! Chat and donation event batches.
//!
//! Each element of `bdy` carries `msg` plus a `profile` that is itself a
//! JSON document encoded as a string; donations add a string-encoded
//! `extras`. Decoding is best-effort: missing or malformed fields become empty
//! strings, and the element is still delivered.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

/// Which batch an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    #[default]
    Chat,
    Donation,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ActivityBadge {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Donation {
    /// Paid amount as sent by the server; empty for chat events.
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct User {
    /// Stable opaque viewer id (`userIdHash`).
    pub hash: String,
    pub nickname: String,
    /// Role code (`userRoleCode`).
    pub role: String,
    /// Raw JSON of the `badge` sub-object.
    pub badge: String,
    /// Raw JSON of the `title` sub-object.
    pub title: String,
    pub verified: bool,
    /// Always present, possibly empty; server order preserved.
    pub activity_badges: Vec<ActivityBadge>,
    pub donation: Donation,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ChatEvent {
    pub kind: EventKind,
    pub message: String,
    pub user: User,
}

/// One element of `bdy`. `profile` and `extras` stay raw until their second
/// decode pass.
#[derive(Debug, Default, Deserialize)]
struct RawEvent {
    #[serde(default)]
    msg: Option<Value>,
    #[serde(default)]
    profile: Option<Box<RawValue>>,
    #[serde(default)]
    extras: Option<Box<RawValue>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    #[serde(default)]
    nickname: Option<Value>,
    #[serde(default)]
    user_id_hash: Option<Value>,
    #[serde(default)]
    user_role_code: Option<Value>,
    #[serde(default)]
    verified_mark: Option<Value>,
    /// Kept as raw text: key order and spacing are passed through untouched.
    #[serde(default)]
    badge: Option<Box<RawValue>>,
    #[serde(default)]
    title: Option<Box<RawValue>>,
    #[serde(default)]
    activity_badges: Option<Value>,
}

/// Text view of a JSON value: strings verbatim, `null`/absent as empty,
/// anything else as its raw JSON text.
pub(crate) fn value_text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Same rules as [`value_text`], applied to undecoded JSON so objects keep
/// their exact wire text.
fn raw_text(v: Option<&RawValue>) -> String {
    let Some(raw) = v else {
        return String::new();
    };
    let text = raw.get();
    if text == "null" {
        String::new()
    } else if text.starts_with('"') {
        serde_json::from_str::<String>(text).unwrap_or_default()
    } else {
        text.to_owned()
    }
}

fn value_truthy(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(s.as_str(), "1" | "t" | "T" | "true" | "TRUE" | "True"),
        _ => false,
    }
}

/// Second decode pass for string-encoded documents. Inline objects are
/// accepted as-is.
fn inner_doc<T: DeserializeOwned>(v: Option<&RawValue>) -> Option<T> {
    let text = v?.get();
    if text.starts_with('"') {
        let doc: String = serde_json::from_str(text).ok()?;
        serde_json::from_str(&doc).ok()
    } else if text.starts_with('{') {
        serde_json::from_str(text).ok()
    } else {
        None
    }
}

fn activity_badges(v: Option<&Value>) -> Vec<ActivityBadge> {
    let Some(Value::Array(items)) = v else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| {
            let title = match item {
                Value::Object(_) => value_text(item.get("title")),
                Value::String(s) => serde_json::from_str::<Value>(s)
                    .map(|doc| value_text(doc.get("title")))
                    .unwrap_or_default(),
                _ => String::new(),
            };
            ActivityBadge { title }
        })
        .collect()
}

fn decode_event(kind: EventKind, item: &RawValue) -> ChatEvent {
    let raw: RawEvent = serde_json::from_str(item.get()).unwrap_or_default();
    let profile: Profile = inner_doc(raw.profile.as_deref()).unwrap_or_default();

    let amount = match kind {
        EventKind::Donation => inner_doc::<Value>(raw.extras.as_deref())
            .map(|extras| value_text(extras.get("payAmount")))
            .unwrap_or_default(),
        EventKind::Chat => String::new(),
    };

    ChatEvent {
        kind,
        message: value_text(raw.msg.as_ref()),
        user: User {
            hash: value_text(profile.user_id_hash.as_ref()),
            nickname: value_text(profile.nickname.as_ref()),
            role: value_text(profile.user_role_code.as_ref()),
            badge: raw_text(profile.badge.as_deref()),
            title: raw_text(profile.title.as_deref()),
            verified: value_truthy(profile.verified_mark.as_ref()),
            activity_badges: activity_badges(profile.activity_badges.as_ref()),
            donation: Donation { amount },
        },
    }
}

/// Decode one batch body. A missing or non-array body is an empty batch.
pub fn decode_batch(kind: EventKind, bdy: Option<&RawValue>) -> Vec<ChatEvent> {
    let Some(raw) = bdy else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<Box<RawValue>>>(raw.get()) {
        Ok(items) => items.iter().map(|item| decode_event(kind, item)).collect(),
        Err(e) => {
            tracing::debug!(err = %e, "chat batch body is not an array");
            Vec::new()
        }
    }
}
