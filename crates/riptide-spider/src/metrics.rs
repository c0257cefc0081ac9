//! Process-lifetime crawl counters, read by the Orchestrator for
//! termination/progress reporting. Explicitly excluded from the
//! checkpoint — it is derivable from `results`, not authoritative state.

use riptide_types::model::ErrorKind;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct CrawlMetrics {
    pub pages_fetched: AtomicU64,
    pub pages_failed: AtomicU64,
    pub scope_rejections: AtomicU64,
    pub dedup_rejections: AtomicU64,
    failed_invalid_url: AtomicU64,
    failed_timeout: AtomicU64,
    failed_transport: AtomicU64,
    failed_client: AtomicU64,
    failed_rate_limited: AtomicU64,
    failed_server: AtomicU64,
    failed_parse: AtomicU64,
    failed_cancelled: AtomicU64,
}

impl CrawlMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed fetch that did not succeed. `OutOfScope` is
    /// routed here too for link-discovery rejections that never reach
    /// the queue, but does not count toward `pages_failed` since no
    /// fetch was attempted.
    pub fn record_failure(&self, kind: ErrorKind) {
        if matches!(kind, ErrorKind::OutOfScope) {
            self.scope_rejections.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
        let counter = match kind {
            ErrorKind::InvalidUrl => &self.failed_invalid_url,
            ErrorKind::OutOfScope => unreachable!("handled above"),
            ErrorKind::FetchTimeout => &self.failed_timeout,
            ErrorKind::TransportError => &self.failed_transport,
            ErrorKind::HttpClientError => &self.failed_client,
            ErrorKind::HttpRateLimited => &self.failed_rate_limited,
            ErrorKind::HttpServerError => &self.failed_server,
            ErrorKind::ParseError => &self.failed_parse,
            ErrorKind::CancelledShutdown => &self.failed_cancelled,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dedup_rejection(&self) {
        self.dedup_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    pub fn pages_failed(&self) -> u64 {
        self.pages_failed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_scope_counts_as_scope_rejection_not_failure() {
        let metrics = CrawlMetrics::new();
        metrics.record_failure(ErrorKind::OutOfScope);
        assert_eq!(metrics.pages_failed(), 0);
        assert_eq!(metrics.scope_rejections.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn success_increments_fetched_count() {
        let metrics = CrawlMetrics::new();
        metrics.record_success();
        metrics.record_success();
        assert_eq!(metrics.pages_fetched(), 2);
    }
}
