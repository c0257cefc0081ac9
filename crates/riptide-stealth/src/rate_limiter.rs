//! Per-host adaptive pacer: tightens on success streaks, loosens
//! exponentially on rate-limit/server errors.
//!
//! Each host maintains independent state so one slow or hostile target
//! never throttles the rest of the crawl.

use async_trait::async_trait;
use dashmap::DashMap;
use rand::Rng;
use riptide_types::ports::{DomainStats, PerHostRateLimiter};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, warn};

const SUCCESS_STREAK_THRESHOLD: u32 = 10;
const SPEEDUP_FACTOR: f64 = 0.9;
const MAX_CONSECUTIVE_FOR_BACKOFF: u32 = 5;
const MAX_INTERVAL: Duration = Duration::from_secs(60);
const JITTER_FRACTION: f64 = 0.10;

/// Per-host adaptive pacer, keyed by hostname.
pub struct AdaptivePacer {
    state: Arc<DashMap<String, DomainState>>,
    min_interval: Duration,
}

#[derive(Debug, Clone)]
struct DomainState {
    current_interval: Duration,
    last_request: Instant,
    consecutive_successes: u32,
    consecutive_failures: u32,
    success_count: u64,
    failure_count: u64,
}

impl DomainState {
    fn new(min_interval: Duration) -> Self {
        Self {
            current_interval: min_interval,
            last_request: Instant::now() - min_interval,
            consecutive_successes: 0,
            consecutive_failures: 0,
            success_count: 0,
            failure_count: 0,
        }
    }
}

impl AdaptivePacer {
    /// `min_interval` is `1/R` for the target requests-per-second `R`.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            state: Arc::new(DashMap::new()),
            min_interval,
        }
    }

    fn jittered(&self, interval: Duration) -> Duration {
        let mut rng = rand::thread_rng();
        let jitter = rng.gen_range(-JITTER_FRACTION..=JITTER_FRACTION);
        let factor = (1.0 + jitter).max(0.0);
        interval.mul_f64(factor)
    }
}

#[async_trait]
impl PerHostRateLimiter for AdaptivePacer {
    async fn acquire(&self, host: &str) {
        let wait = {
            let mut entry = self
                .state
                .entry(host.to_string())
                .or_insert_with(|| DomainState::new(self.min_interval));
            let state = entry.value_mut();
            let target = self.jittered(state.current_interval);
            let elapsed = state.last_request.elapsed();
            let wait = target.saturating_sub(elapsed);
            state.last_request = Instant::now() + wait;
            wait
        };
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }

    fn report_success(&self, host: &str) {
        let mut entry = self
            .state
            .entry(host.to_string())
            .or_insert_with(|| DomainState::new(self.min_interval));
        let state = entry.value_mut();
        state.success_count += 1;
        state.consecutive_successes += 1;
        state.consecutive_failures = 0;

        if state.consecutive_successes >= SUCCESS_STREAK_THRESHOLD {
            state.current_interval = state
                .current_interval
                .mul_f64(SPEEDUP_FACTOR)
                .max(self.min_interval);
            state.consecutive_successes = 0;
            debug!(host, interval_ms = state.current_interval.as_millis(), "pacer: speeding up");
        }
    }

    fn report_error(&self, host: &str, status: Option<u16>) {
        let is_backoff_trigger = matches!(status, Some(s) if s == 429 || (500..600).contains(&s));
        let mut entry = self
            .state
            .entry(host.to_string())
            .or_insert_with(|| DomainState::new(self.min_interval));
        let state = entry.value_mut();
        state.failure_count += 1;

        if is_backoff_trigger {
            state.consecutive_failures += 1;
            state.consecutive_successes = 0;
            let exponent = state.consecutive_failures.min(MAX_CONSECUTIVE_FOR_BACKOFF);
            let multiplier = 2u32.pow(exponent) as f64;
            state.current_interval = state
                .current_interval
                .mul_f64(multiplier)
                .min(MAX_INTERVAL);
            warn!(
                host,
                interval_ms = state.current_interval.as_millis(),
                consecutive = state.consecutive_failures,
                "pacer: backing off"
            );
        } else {
            state.consecutive_successes = 0;
        }
    }

    fn stats(&self, host: &str) -> Option<DomainStats> {
        self.state.get(host).map(|s| DomainStats {
            consecutive_successes: s.consecutive_successes,
            consecutive_failures: s.consecutive_failures,
            current_interval_ms: s.current_interval.as_millis() as u64,
            success_count: s.success_count,
            failure_count: s.failure_count,
        })
    }

    fn cleanup_stale(&self, older_than: Duration) {
        let stale: Vec<String> = self
            .state
            .iter()
            .filter(|e| e.value().last_request.elapsed() >= older_than)
            .map(|e| e.key().clone())
            .collect();
        for host in &stale {
            self.state.remove(host);
        }
    }
}
