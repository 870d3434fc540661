//! Dispatcher module exports.
//!
//! Re-exports the dispatcher and callback type so downstream consumers can
//! depend on this module directly.

pub mod dispatcher;

pub use dispatcher::{ChatCallback, Dispatcher};
