//! Spider configuration: the single value threaded through
//! `SpiderBuilder` into the Orchestrator, Worker Pool, and Rate Limiter.

use riptide_reliability::RetryPolicy;
use riptide_types::ports::FetchOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level crawl configuration.
///
/// # Valid Ranges
/// - `concurrency`: > 0
/// - `max_depth`: recommended ≤ 1000
/// - `max_pages`: > 0 when specified
/// - `global_rate_limit_rps`: > 0.0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiderConfig {
    /// Number of concurrent workers
    pub concurrency: usize,
    /// Maximum link depth from any seed (seeds are depth 0)
    pub max_depth: usize,
    /// Maximum number of pages to fetch before the orchestrator stops
    /// enqueueing new links (in-flight fetches still complete and record)
    pub max_pages: Option<usize>,
    /// Per-fetch deadline
    pub fetch_timeout: Duration,
    /// How long a worker waits on an empty queue before checking for drain
    pub dequeue_poll_timeout: Duration,
    /// Global token-bucket rate (requests/sec across all hosts)
    pub global_rate_limit_rps: u32,
    /// Adaptive per-host pacer floor (1/R for the busiest host)
    pub per_host_min_interval: Duration,
    /// Retry/backoff policy for transient fetch failures
    pub retry: RetryPolicy,
    /// Default fetch options applied to every request
    pub fetch_options: FetchOptions,
    /// Periodic checkpoint interval; `None` disables periodic snapshots
    /// (a final snapshot is still taken on stop)
    pub checkpoint_interval: Option<Duration>,
    /// Distributed mode: shared-store connection string (e.g. a Redis
    /// URL). `None` runs the in-memory, single-process adapters.
    pub shared_store_url: Option<String>,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_depth: 10,
            max_pages: Some(1000),
            fetch_timeout: Duration::from_secs(30),
            dequeue_poll_timeout: Duration::from_millis(500),
            global_rate_limit_rps: 5,
            per_host_min_interval: Duration::from_millis(500),
            retry: RetryPolicy::default(),
            fetch_options: FetchOptions::default(),
            checkpoint_interval: Some(Duration::from_secs(30)),
            shared_store_url: None,
        }
    }
}

impl SpiderConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_shared_store_url(mut self, url: Option<String>) -> Self {
        self.shared_store_url = url;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }
        if self.max_depth > 1000 {
            return Err(format!(
                "max_depth should not exceed 1000 (current: {})",
                self.max_depth
            ));
        }
        if let Some(0) = self.max_pages {
            return Err("max_pages must be greater than 0 when specified".to_string());
        }
        if self.fetch_timeout.is_zero() {
            return Err("fetch_timeout must be greater than 0".to_string());
        }
        if self.global_rate_limit_rps == 0 {
            return Err("global_rate_limit_rps must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn is_distributed(&self) -> bool {
        self.shared_store_url.is_some()
    }
}
