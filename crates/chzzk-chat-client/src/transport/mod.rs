//! Transport layer (WebSocket client).
//!
//! Exposes the dialer and the codec that lifts tungstenite messages into queue
//! frames before they reach the dispatcher.

pub mod codec;
pub mod ws;

pub use codec::{Frame, Inbound};
pub use ws::{dial, WsSink, WsSource, WsStream};
