//! chzzk-chat core: transport-free protocol primitives, token, and errors.
//!
//! This crate defines the wire-level contracts of the chat edge (command
//! codes, outbound control frames, inbound envelopes and event batches) and the
//! error surface shared with the client runtime. It carries no transport or
//! runtime dependencies so decoding can be tested and reused in isolation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Inbound decoding is
//! best-effort: malformed events degrade to empty fields instead of failing.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod token;

/// Shared result type.
pub use error::{ChatError, ErrorCode, Result};
pub use token::Token;
