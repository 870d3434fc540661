//! Top-level facade crate for chzzk-chat.
//!
//! Re-exports the protocol types and the client runtime so users can depend on a single crate.

pub mod core {
    pub use chzzk_chat_core::*;
}

pub mod client {
    pub use chzzk_chat_client::*;
}

pub use chzzk_chat_client::{Session, SessionOptions, SessionState};
pub use chzzk_chat_core::protocol::{ChatEvent, EventKind};
pub use chzzk_chat_core::{ChatError, Token};
