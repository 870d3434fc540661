//! One authenticated chat session and its workers.
//!
//! A session runs three cooperating tasks over one socket: the reader
//! (socket -> queue), the heartbeat (periodic ping) and the dispatcher, which
//! runs on the caller's task and performs on-demand writes.

pub mod heartbeat;
pub mod reader;
#[allow(clippy::module_inception)]
mod session;
pub mod state;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use session::Session;
pub use state::SessionState;
pub use writer::{FrameSink, WsWriter};
