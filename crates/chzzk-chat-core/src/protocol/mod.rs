//! Chat edge wire protocol (version "2").
//!
//! All frames are UTF-8 JSON carried in WebSocket text frames:
//! - Outbound: fixed control templates (ping, pong, setup, login).
//! - Inbound: an envelope keyed by numeric `cmd`, with chat and donation
//!   batches in `bdy` whose `profile`/`extras` fields are JSON-in-a-string.
//!
//! Inbound decoding never panics and never fails a session: an undecodable
//! envelope is reported as `ChatError::Decode`, and a malformed event inside a
//! batch degrades to empty fields.

pub mod cmd;
pub mod event;
pub mod inbound;
pub mod outbound;

pub use cmd::Cmd;
pub use event::{decode_batch, ActivityBadge, ChatEvent, Donation, EventKind, User};
pub use inbound::Envelope;
