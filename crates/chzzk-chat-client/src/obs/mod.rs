//! Lightweight in-process session metrics.
//!
//! Counters are atomics keyed by label set and rendered in Prometheus text
//! format on demand; the embedder decides where (or whether) to expose them.

pub mod metrics;

pub use metrics::{CounterVec, SessionMetrics};
