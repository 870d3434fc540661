//! Edge server selection by latency probe.
//!
//! Each candidate is scored as handshake time plus the round trip of one `{}`
//! frame. The lowest score wins; ties go to the earlier candidate, whether the
//! probes run serially or concurrently.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::future::join_all;
use futures_util::{SinkExt, StreamExt};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use chzzk_chat_core::error::{ChatError, Result};
use chzzk_chat_core::protocol::outbound::PROBE_FRAME;

use crate::transport::dial;

/// Two-sample latency measurement for one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSample {
    pub setup: Duration,
    pub round_trip: Duration,
}

impl ProbeSample {
    pub fn total(&self) -> Duration {
        self.setup + self.round_trip
    }
}

/// Measures one candidate. Swappable so selection can be tested offline.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> Result<ProbeSample>;
}

/// Real prober: dial, send `{}`, wait for any reply, close.
pub struct WsProber {
    timeout: Duration,
}

impl WsProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn measure(&self, url: &str) -> Result<ProbeSample> {
        let start = Instant::now();
        let mut ws = dial(url, self.timeout).await?;
        let setup = start.elapsed();

        let start = Instant::now();
        ws.send(Message::text(PROBE_FRAME))
            .await
            .map_err(|e| ChatError::Write(e.to_string()))?;
        match ws.next().await {
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(ChatError::Transport(e.to_string())),
            None => return Err(ChatError::Transport("closed before echo".into())),
        }
        let round_trip = start.elapsed();

        let _ = ws.close(None).await;
        Ok(ProbeSample { setup, round_trip })
    }
}

#[async_trait]
impl Prober for WsProber {
    async fn probe(&self, url: &str) -> Result<ProbeSample> {
        timeout(self.timeout, self.measure(url))
            .await
            .map_err(|_| ChatError::Timeout(format!("probe {url}")))?
    }
}

/// Pick the fastest reachable candidate, or `None` if every probe failed.
pub async fn select_server(
    prober: &dyn Prober,
    candidates: &[String],
    parallel: bool,
) -> Option<String> {
    let results: Vec<Result<ProbeSample>> = if parallel {
        join_all(candidates.iter().map(|url| prober.probe(url))).await
    } else {
        let mut out = Vec::with_capacity(candidates.len());
        for url in candidates {
            out.push(prober.probe(url).await);
        }
        out
    };

    let mut best: Option<(&String, Duration)> = None;
    for (url, res) in candidates.iter().zip(results) {
        match res {
            Ok(sample) => {
                let total = sample.total();
                tracing::debug!(%url, setup_ms = sample.setup.as_millis() as u64, rtt_ms = sample.round_trip.as_millis() as u64, "probe ok");
                if best.map_or(true, |(_, t)| total < t) {
                    best = Some((url, total));
                }
            }
            Err(e) => tracing::debug!(%url, err = %e, "probe failed"),
        }
    }

    best.map(|(url, _)| url.clone())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Scripted prober: url -> (setup ms, rtt ms); missing urls fail.
    struct FakeProber {
        samples: HashMap<String, (u64, u64)>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeProber {
        fn new(samples: &[(&str, u64, u64)]) -> Self {
            Self {
                samples: samples
                    .iter()
                    .map(|(u, s, r)| (u.to_string(), (*s, *r)))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Prober for FakeProber {
        async fn probe(&self, url: &str) -> Result<ProbeSample> {
            self.calls.lock().unwrap().push(url.to_string());
            let (s, r) = self
                .samples
                .get(url)
                .ok_or_else(|| ChatError::Dial(format!("{url}: refused")))?;
            Ok(ProbeSample {
                setup: Duration::from_millis(*s),
                round_trip: Duration::from_millis(*r),
            })
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("ws://edge{i}")).collect()
    }

    #[tokio::test]
    async fn lowest_combined_latency_wins() {
        // edge2 has the fastest handshake but the slowest echo.
        let p = FakeProber::new(&[
            ("ws://edge1", 40, 10),
            ("ws://edge2", 5, 80),
            ("ws://edge3", 20, 20),
        ]);
        let best = select_server(&p, &urls(3), false).await;
        assert_eq!(best.as_deref(), Some("ws://edge3"));
        assert_eq!(p.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn failed_probes_are_skipped() {
        let p = FakeProber::new(&[("ws://edge3", 90, 90)]);
        let best = select_server(&p, &urls(4), false).await;
        assert_eq!(best.as_deref(), Some("ws://edge3"));
    }

    #[tokio::test]
    async fn all_failed_is_none() {
        let p = FakeProber::new(&[]);
        assert!(select_server(&p, &urls(10), false).await.is_none());
        assert!(select_server(&p, &urls(10), true).await.is_none());
    }

    #[tokio::test]
    async fn ties_resolve_to_first_candidate() {
        let p = FakeProber::new(&[
            ("ws://edge1", 30, 30),
            ("ws://edge2", 10, 10),
            ("ws://edge3", 15, 5),
        ]);
        assert_eq!(select_server(&p, &urls(3), false).await.as_deref(), Some("ws://edge2"));
        assert_eq!(select_server(&p, &urls(3), true).await.as_deref(), Some("ws://edge2"));
    }

    #[tokio::test]
    async fn serial_probes_run_in_candidate_order() {
        let p = FakeProber::new(&[("ws://edge1", 1, 1), ("ws://edge2", 1, 1)]);
        let _ = select_server(&p, &urls(3), false).await;
        assert_eq!(*p.calls.lock().unwrap(), urls(3));
    }
}
