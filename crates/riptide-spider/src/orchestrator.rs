//! Orchestrator: lifecycle owner for one crawl. Normalizes and
//! scope-filters seeds, spawns the worker pool, drives termination, and
//! answers snapshot/restore for the checkpointer.

use crate::config::SpiderConfig;
use crate::frontier::Frontier;
use crate::metrics::CrawlMetrics;
use crate::results::ResultStore;
use riptide_scope::{Decision, ScopeEngine};
use riptide_types::model::ErrorKind;
use riptide_types::ports::{FetchOptions, FetchOutcome, FetcherAdapter, GlobalRateLimiter, PerHostRateLimiter, SharedStore};
use riptide_types::{CanonicalUrl, CrawlState, Fingerprint, PageRecord, Result, RiptideError};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

pub struct Orchestrator {
    config: SpiderConfig,
    scope: Arc<ScopeEngine>,
    fetcher: Arc<dyn FetcherAdapter>,
    global_limiter: Arc<dyn GlobalRateLimiter>,
    host_limiter: Arc<dyn PerHostRateLimiter>,
    shared_store: Arc<dyn SharedStore>,
    fingerprints: Arc<Mutex<riptide_stealth::FingerprintSource>>,
    frontier: Arc<Frontier>,
    results: Arc<ResultStore>,
    metrics: Arc<CrawlMetrics>,
    in_flight: Arc<AtomicUsize>,
    worker_pool: riptide_workers::WorkerPool,
    stop: watch::Sender<bool>,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SpiderConfig,
        scope: ScopeEngine,
        fetcher: Arc<dyn FetcherAdapter>,
        global_limiter: Arc<dyn GlobalRateLimiter>,
        host_limiter: Arc<dyn PerHostRateLimiter>,
        shared_store: Arc<dyn SharedStore>,
        fingerprints: riptide_stealth::FingerprintSource,
    ) -> Self {
        let (stop, _) = watch::channel(false);
        let worker_pool = riptide_workers::WorkerPool::new(config.concurrency.max(1));
        Self {
            config,
            scope: Arc::new(scope),
            fetcher,
            global_limiter,
            host_limiter,
            frontier: Arc::new(Frontier::new(shared_store.clone())),
            shared_store,
            fingerprints: Arc::new(Mutex::new(fingerprints)),
            results: Arc::new(ResultStore::new()),
            metrics: Arc::new(CrawlMetrics::new()),
            in_flight: Arc::new(AtomicUsize::new(0)),
            worker_pool,
            stop,
        }
    }

    pub fn request_stop(&self) {
        let _ = self.stop.send(true);
    }

    pub fn metrics(&self) -> &CrawlMetrics {
        &self.metrics
    }

    /// Per-worker throughput counters, for progress reporting.
    pub fn worker_pool_stats(&self) -> Vec<riptide_workers::PoolStatsSnapshot> {
        self.worker_pool.snapshot()
    }

    /// Number of work items currently being processed by a worker
    /// (dequeued but not yet acknowledged).
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn config_fingerprint(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.config.concurrency.hash(&mut hasher);
        self.config.max_depth.hash(&mut hasher);
        self.config.max_pages.hash(&mut hasher);
        self.config.global_rate_limit_rps.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }

    /// Capture the current Crawl State: results, the visited set, and the
    /// pending queue, read from the frontier so a periodic or final
    /// checkpoint can `restore` a functioning resume rather than an empty
    /// one (the queue and visited set live in the `SharedStore`, not in
    /// `self`, so they must be read back from it here).
    pub async fn snapshot(&self) -> CrawlState {
        let mut state = CrawlState::new(self.config_fingerprint(), self.scope.rules());
        state.results = self.results.snapshot().await;
        state.visited = self.frontier.visited_snapshot().await;
        state.pending = self.frontier.pending_snapshot().await;
        state
    }

    /// Re-seed the frontier and result store from a loaded checkpoint.
    /// Must run before `run` spawns any workers. Visited URLs are marked
    /// first, then pending items are pushed onto the queue directly via
    /// `restore_pending` — going through `try_enqueue` here would see the
    /// URL already visited and silently drop it.
    pub async fn restore(&self, state: CrawlState) -> Result<()> {
        for record in state.results {
            self.results.append(record).await;
        }
        for url in &state.visited {
            self.shared_store
                .add_if_absent("visited", url.as_str())
                .await?;
        }
        for item in state.pending {
            self.frontier.restore_pending(item).await?;
        }
        Ok(())
    }

    /// Normalize and scope-filter `seeds`, then drive the crawl to
    /// completion (or until stopped / page cap reached).
    pub async fn run(&self, seeds: &[String]) -> Result<Vec<PageRecord>> {
        let mut enqueued_any = false;
        for raw in seeds {
            let Ok(canonical) = riptide_url::normalize(raw) else {
                warn!(url = raw, "seed failed to normalize, dropping");
                continue;
            };
            match self.scope.decide(canonical.as_str()) {
                Ok(Decision::In) => {
                    if self.frontier.try_enqueue(canonical, 0).await {
                        enqueued_any = true;
                    }
                }
                Ok(Decision::Out) => {
                    debug!(url = canonical.as_str(), "seed out of scope, dropping");
                }
                Err(err) => {
                    warn!(url = canonical.as_str(), %err, "seed host unparseable, dropping");
                }
            }
        }

        if !enqueued_any && self.frontier.pending_count() == 0 {
            return Err(RiptideError::ScopeTooStrict);
        }

        let handles = self.spawn_workers();
        for handle in handles {
            let _ = handle.await;
        }

        let records = self.results.snapshot().await;
        info!(
            pages = records.len(),
            fetched = self.metrics.pages_fetched(),
            failed = self.metrics.pages_failed(),
            "crawl finished"
        );
        Ok(records)
    }

    /// Spawn one worker per configured concurrency slot through the
    /// generic worker pool, each running the dequeue/fetch/extract/enqueue
    /// loop until the frontier drains or a stop is requested.
    fn spawn_workers(&self) -> Vec<tokio::task::JoinHandle<()>> {
        let config = self.config.clone();
        let scope = self.scope.clone();
        let fetcher = self.fetcher.clone();
        let global_limiter = self.global_limiter.clone();
        let host_limiter = self.host_limiter.clone();
        let frontier = self.frontier.clone();
        let results = self.results.clone();
        let metrics = self.metrics.clone();
        let fingerprints = self.fingerprints.clone();
        let in_flight = self.in_flight.clone();
        let stop_tx = self.stop.clone();

        self.worker_pool.spawn_each(move |worker_id, pool_stats| {
            let config = config.clone();
            let scope = scope.clone();
            let fetcher = fetcher.clone();
            let global_limiter = global_limiter.clone();
            let host_limiter = host_limiter.clone();
            let frontier = frontier.clone();
            let results = results.clone();
            let metrics = metrics.clone();
            let fingerprints = fingerprints.clone();
            let in_flight = in_flight.clone();
            let mut stop = stop_tx.subscribe();

            async move {
                loop {
                    if *stop.borrow() {
                        break;
                    }

                    let item = tokio::select! {
                        biased;
                        _ = stop.changed() => break,
                        item = frontier.dequeue(config.dequeue_poll_timeout) => item,
                    };

                    let Some(item) = item else {
                        if frontier.pending_count() == 0 {
                            break;
                        }
                        continue;
                    };

                    in_flight.fetch_add(1, Ordering::SeqCst);
                    let host = host_of(item.url.as_str());

                    global_limiter.acquire().await;
                    if let Some(host) = &host {
                        host_limiter.acquire(host).await;
                    }

                    let fingerprint = fingerprints.lock().await.next();
                    let record = run_one(
                        worker_id,
                        item.url.clone(),
                        item.depth,
                        &config,
                        &fetcher,
                        &fingerprint,
                        host.as_deref(),
                        &host_limiter,
                    )
                    .await;

                    match record.error_kind {
                        None => {
                            metrics.record_success();
                            pool_stats.record_success();
                        }
                        Some(kind) => {
                            metrics.record_failure(kind);
                            pool_stats.record_failure();
                        }
                    }

                    if record.error_kind.is_none() && !config_allows_more_depth(&config, item.depth)
                    {
                        debug!(url = item.url.as_str(), "max depth reached, not following links");
                    } else if record.error_kind.is_none()
                        && !stop_has_hit_page_cap(&metrics, &config)
                    {
                        for link in &record.discovered_links {
                            let decision = scope.decide(link.as_str());
                            if !matches!(decision, Ok(Decision::In)) {
                                continue;
                            }
                            if item.depth + 1 > config.max_depth {
                                continue;
                            }
                            if !frontier.try_enqueue(link.clone(), item.depth + 1).await {
                                metrics.record_dedup_rejection();
                            }
                        }
                    }

                    results.append(record).await;
                    frontier.task_done();
                    in_flight.fetch_sub(1, Ordering::SeqCst);

                    if stop_has_hit_page_cap(&metrics, &config) {
                        break;
                    }
                }
            }
        })
    }
}

fn config_allows_more_depth(config: &SpiderConfig, depth: usize) -> bool {
    depth < config.max_depth
}

fn stop_has_hit_page_cap(metrics: &CrawlMetrics, config: &SpiderConfig) -> bool {
    match config.max_pages {
        Some(cap) => metrics.pages_fetched() as usize >= cap,
        None => false,
    }
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn content_hash(body: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    hasher.finish()
}

#[allow(clippy::too_many_arguments)]
async fn run_one(
    _worker_id: usize,
    url: CanonicalUrl,
    depth: usize,
    config: &SpiderConfig,
    fetcher: &Arc<dyn FetcherAdapter>,
    fingerprint: &Fingerprint,
    host: Option<&str>,
    host_limiter: &Arc<dyn PerHostRateLimiter>,
) -> PageRecord {
    let started_at_ms = now_ms();
    let mut options = config.fetch_options.clone();
    options.timeout = config.fetch_timeout;

    let mut last_kind = ErrorKind::TransportError;
    let mut last_status = None;
    let mut attempt = 0;
    loop {
        match timeout_fetch(fetcher, url.as_str(), fingerprint, &options).await {
            FetchOutcome::Success(outcome) => {
                if let Some(host) = host {
                    host_limiter.report_success(host);
                }
                let discovered_links = riptide_extraction::extract(&outcome.final_url, &outcome.body);
                return PageRecord {
                    url,
                    http_status: outcome.status,
                    success: true,
                    title: outcome.title,
                    headers: outcome.headers,
                    discovered_links,
                    depth,
                    started_at_ms,
                    completed_at_ms: now_ms(),
                    error_kind: None,
                    content_hash: content_hash(&outcome.body),
                    fingerprint_used: fingerprint.clone(),
                };
            }
            FetchOutcome::Permanent { kind, status } => {
                if let Some(host) = host {
                    host_limiter.report_error(host, status);
                }
                return failed_record(url, depth, started_at_ms, kind, status, fingerprint);
            }
            FetchOutcome::Retryable { kind, status } => {
                if let Some(host) = host {
                    host_limiter.report_error(host, status);
                }
                last_kind = kind;
                last_status = status;
                attempt += 1;
                if attempt >= config.retry.max_attempts {
                    return failed_record(url, depth, started_at_ms, last_kind, last_status, fingerprint);
                }
                tokio::time::sleep(config.retry.backoff_duration(attempt)).await;
            }
        }
    }
}

async fn timeout_fetch(
    fetcher: &Arc<dyn FetcherAdapter>,
    url: &str,
    fingerprint: &Fingerprint,
    options: &FetchOptions,
) -> FetchOutcome {
    match tokio::time::timeout(options.timeout, fetcher.fetch(url, fingerprint, options)).await {
        Ok(outcome) => outcome,
        Err(_) => FetchOutcome::Retryable {
            kind: ErrorKind::FetchTimeout,
            status: None,
        },
    }
}

fn failed_record(
    url: CanonicalUrl,
    depth: usize,
    started_at_ms: u64,
    kind: ErrorKind,
    status: Option<u16>,
    fingerprint: &Fingerprint,
) -> PageRecord {
    PageRecord {
        url,
        http_status: status,
        success: false,
        title: None,
        headers: Default::default(),
        discovered_links: Vec::new(),
        depth,
        started_at_ms,
        completed_at_ms: now_ms(),
        error_kind: Some(kind),
        content_hash: 0,
        fingerprint_used: fingerprint.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riptide_cache::MemoryStore;
    use riptide_stealth::{FingerprintSource, UserAgentConfig, UserAgentManager};
    use std::sync::atomic::AtomicUsize as StdAtomicUsize;

    struct StubFetcher {
        calls: StdAtomicUsize,
    }

    #[async_trait::async_trait]
    impl FetcherAdapter for StubFetcher {
        async fn fetch(
            &self,
            url: &str,
            _fingerprint: &Fingerprint,
            _options: &FetchOptions,
        ) -> FetchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            riptide_types::ports::FetchOutcome::Success(riptide_types::ports::PageOutcome {
                final_url: url.to_string(),
                status: Some(200),
                headers: Default::default(),
                body: "<html><body>no links here</body></html>".to_string(),
                title: Some("Test".to_string()),
                screenshot: None,
            })
        }
    }

    /// Returns `Retryable` 429 once, then succeeds — the literal §8
    /// rate-limiter scenario.
    struct FlakyFetcher {
        calls: StdAtomicUsize,
    }

    #[async_trait::async_trait]
    impl FetcherAdapter for FlakyFetcher {
        async fn fetch(
            &self,
            url: &str,
            _fingerprint: &Fingerprint,
            _options: &FetchOptions,
        ) -> FetchOutcome {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                return FetchOutcome::Retryable {
                    kind: ErrorKind::HttpRateLimited,
                    status: Some(429),
                };
            }
            FetchOutcome::Success(riptide_types::ports::PageOutcome {
                final_url: url.to_string(),
                status: Some(200),
                headers: Default::default(),
                body: "<html><body>ok</body></html>".to_string(),
                title: None,
                screenshot: None,
            })
        }
    }

    struct NoopGlobalLimiter;
    #[async_trait::async_trait]
    impl GlobalRateLimiter for NoopGlobalLimiter {
        async fn acquire(&self) {}
        fn check(&self) -> bool {
            true
        }
    }

    fn build_orchestrator(fetcher: Arc<dyn FetcherAdapter>) -> Orchestrator {
        let config = SpiderConfig::default()
            .with_concurrency(1)
            .with_max_pages(Some(5));
        Orchestrator::new(
            config,
            ScopeEngine::new(),
            fetcher,
            Arc::new(NoopGlobalLimiter),
            Arc::new(riptide_stealth::AdaptivePacer::new(Duration::from_millis(1))),
            Arc::new(MemoryStore::new()),
            FingerprintSource::new(UserAgentManager::new(UserAgentConfig::default())),
        )
    }

    #[tokio::test]
    async fn single_seed_with_no_links_produces_one_record() {
        let fetcher = Arc::new(StubFetcher {
            calls: StdAtomicUsize::new(0),
        });
        let orchestrator = build_orchestrator(fetcher.clone());
        let records = orchestrator
            .run(&["https://example.com/".to_string()])
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].success);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let pool_stats = orchestrator.worker_pool_stats();
        assert_eq!(pool_stats.len(), 1);
        assert_eq!(pool_stats[0].items_processed, 1);
        assert_eq!(pool_stats[0].items_failed, 0);
    }

    #[tokio::test]
    async fn empty_scope_match_is_scope_too_strict() {
        let fetcher = Arc::new(StubFetcher {
            calls: StdAtomicUsize::new(0),
        });
        let config = SpiderConfig::default().with_concurrency(1);
        let mut scope = ScopeEngine::new();
        scope.add_include("*.other.com").unwrap();
        let orchestrator = Orchestrator::new(
            config,
            scope,
            fetcher,
            Arc::new(NoopGlobalLimiter),
            Arc::new(riptide_stealth::AdaptivePacer::new(Duration::from_millis(1))),
            Arc::new(MemoryStore::new()),
            FingerprintSource::new(UserAgentManager::new(UserAgentConfig::default())),
        );
        let result = orchestrator.run(&["https://example.com/".to_string()]).await;
        assert!(matches!(result, Err(RiptideError::ScopeTooStrict)));
    }

    #[tokio::test]
    async fn restored_frontier_allows_empty_seed_run() {
        let fetcher = Arc::new(StubFetcher {
            calls: StdAtomicUsize::new(0),
        });
        let orchestrator = build_orchestrator(fetcher.clone());
        let canonical = riptide_url::normalize("https://example.com/").unwrap();
        // A realistic checkpoint: mark-at-enqueue means a pending item is
        // always also in `visited`.
        let state = riptide_types::CrawlState {
            schema_version: riptide_types::CHECKPOINT_SCHEMA_VERSION,
            visited: vec![canonical.clone()],
            pending: vec![riptide_types::WorkItem {
                url: canonical,
                depth: 0,
            }],
            results: Vec::new(),
            config_fingerprint: "test".to_string(),
            scope_rules: Vec::new(),
        };
        orchestrator.restore(state).await.unwrap();
        let records = orchestrator.run(&[]).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn snapshot_captures_visited_and_pending_before_a_drained_run() {
        let fetcher = Arc::new(StubFetcher {
            calls: StdAtomicUsize::new(0),
        });
        let orchestrator = build_orchestrator(fetcher.clone());
        let canonical = riptide_url::normalize("https://example.com/").unwrap();
        orchestrator.frontier.try_enqueue(canonical.clone(), 0).await;

        let state = orchestrator.snapshot().await;
        assert_eq!(state.visited, vec![canonical.clone()]);
        assert_eq!(state.pending.len(), 1);
        assert_eq!(state.pending[0].url, canonical);
    }

    #[tokio::test]
    async fn restore_round_trips_a_snapshot_taken_before_any_run() {
        let fetcher = Arc::new(StubFetcher {
            calls: StdAtomicUsize::new(0),
        });
        let producer = build_orchestrator(fetcher.clone());
        let canonical = riptide_url::normalize("https://example.com/").unwrap();
        producer.frontier.try_enqueue(canonical.clone(), 0).await;
        let state = producer.snapshot().await;

        let consumer = build_orchestrator(fetcher);
        consumer.restore(state).await.unwrap();
        let records = consumer.run(&[]).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, canonical);
    }

    #[tokio::test]
    async fn a_429_then_200_leaves_the_pacer_slower_than_the_floor() {
        let fetcher = Arc::new(FlakyFetcher {
            calls: StdAtomicUsize::new(0),
        });
        let host_limiter = Arc::new(riptide_stealth::AdaptivePacer::new(Duration::from_millis(10)));
        let config = SpiderConfig::default();
        let mut fingerprints = riptide_stealth::FingerprintSource::new(UserAgentManager::new(
            UserAgentConfig::default(),
        ));
        let fingerprint = fingerprints.next();

        let record = run_one(
            0,
            CanonicalUrl("https://example.com/".to_string()),
            0,
            &config,
            &(fetcher as Arc<dyn FetcherAdapter>),
            &fingerprint,
            Some("example.com"),
            &(host_limiter.clone() as Arc<dyn PerHostRateLimiter>),
        )
        .await;

        assert!(record.success);
        let stats = host_limiter.stats("example.com").unwrap();
        assert!(stats.current_interval_ms > 10);
    }

    #[tokio::test]
    async fn a_permanent_404_retains_its_http_status() {
        struct NotFoundFetcher;
        #[async_trait::async_trait]
        impl FetcherAdapter for NotFoundFetcher {
            async fn fetch(
                &self,
                _url: &str,
                _fingerprint: &Fingerprint,
                _options: &FetchOptions,
            ) -> FetchOutcome {
                FetchOutcome::Permanent {
                    kind: ErrorKind::HttpClientError,
                    status: Some(404),
                }
            }
        }

        let config = SpiderConfig::default();
        let mut fingerprints = riptide_stealth::FingerprintSource::new(UserAgentManager::new(
            UserAgentConfig::default(),
        ));
        let fingerprint = fingerprints.next();
        let host_limiter: Arc<dyn PerHostRateLimiter> =
            Arc::new(riptide_stealth::AdaptivePacer::new(Duration::from_millis(10)));

        let record = run_one(
            0,
            CanonicalUrl("https://example.com/missing".to_string()),
            0,
            &config,
            &(Arc::new(NotFoundFetcher) as Arc<dyn FetcherAdapter>),
            &fingerprint,
            Some("example.com"),
            &host_limiter,
        )
        .await;

        assert!(!record.success);
        assert_eq!(record.http_status, Some(404));
        assert_eq!(record.error_kind, Some(ErrorKind::HttpClientError));
    }
}
