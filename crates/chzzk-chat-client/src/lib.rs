//! chzzk-chat client runtime.
//!
//! This crate wires server selection, transport, the session workers (reader,
//! writer, heartbeat) and the dispatcher into a subscribe-and-run chat client.
//! It is consumed by the demo binary (`main.rs`) and by integration tests.

pub mod config;
pub mod dispatch;
pub mod obs;
pub mod selector;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, SessionOptions};
pub use session::{Session, SessionState};
