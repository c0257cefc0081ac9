pub mod crawl;
pub mod resume;

/// Shared flags that assemble a [`riptide_spider::SpiderConfig`] and
/// [`riptide_scope::ScopeEngine`]. Used by both `crawl` and `resume`.
#[derive(clap::Args, Clone, Debug)]
pub struct CrawlOptions {
    /// Maximum number of pages to fetch
    #[arg(long = "max-pages")]
    pub max_pages: Option<usize>,

    /// Number of concurrent workers
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Maximum link depth from any seed
    #[arg(long = "max-depth", default_value_t = 10)]
    pub max_depth: usize,

    /// Include-scope host pattern (repeatable); `*.base` or `**.base`
    #[arg(long = "in-scope")]
    pub in_scope: Vec<String>,

    /// Exclude-scope host pattern (repeatable)
    #[arg(long = "out-scope")]
    pub out_scope: Vec<String>,

    /// Global requests/second across all hosts
    #[arg(long = "rate-limit", default_value_t = 5)]
    pub rate_limit: u32,

    /// Per-fetch timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Maximum retry attempts for a transient fetch failure
    #[arg(long, default_value_t = 3)]
    pub retries: usize,

    /// Wait this long after load for dynamic content (headless mode)
    #[arg(long = "js-wait-ms", default_value_t = 0)]
    pub js_wait_ms: u64,

    /// Scroll to trigger lazy-loaded content (headless mode)
    #[arg(long)]
    pub scroll: bool,

    /// Number of scroll iterations when `--scroll` is set
    #[arg(long = "scroll-times", default_value_t = 0)]
    pub scroll_times: u32,

    /// CSS selector to click after load (headless mode)
    #[arg(long = "click-selector")]
    pub click_selector: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Write the final page records to this path as JSON
    #[arg(long)]
    pub output: Option<std::path::PathBuf>,

    /// Result export format; accepted for shape, a no-op in this crate
    #[arg(long)]
    pub export: Option<String>,

    /// Save a checkpoint after every N newly-fetched pages
    #[arg(long = "flush-every", default_value_t = 50)]
    pub flush_every: usize,

    /// Directory for checkpoint files
    #[arg(long = "cache-dir", default_value = ".riptide-checkpoints")]
    pub cache_dir: std::path::PathBuf,

    /// Live progress dashboard; accepted for shape, a no-op in this crate
    #[arg(long)]
    pub dashboard: bool,

    /// Upstream proxy URL; accepted for shape, a no-op in this crate
    #[arg(long)]
    pub proxy: Option<String>,

    /// File of proxy URLs to rotate through; accepted for shape, a no-op
    #[arg(long = "proxy-file")]
    pub proxy_file: Option<std::path::PathBuf>,

    /// Authenticated-session type; accepted for shape, a no-op in this crate
    #[arg(long = "auth-type")]
    pub auth_type: Option<String>,

    /// CAPTCHA-solving collaborator; accepted for shape, a no-op here
    #[arg(long)]
    pub captcha: Option<String>,

    /// Vision-model collaborator; accepted for shape, a no-op here
    #[arg(long)]
    pub vision: Option<String>,

    /// Webhook URL(s) to notify; accepted for shape, a no-op in this crate
    #[arg(long)]
    pub webhooks: Vec<String>,

    /// Distributed mode: shared-store (Redis) connection string
    #[arg(long = "shared-store-url", env = "RIPTIDE_SHARED_STORE_URL")]
    pub shared_store_url: Option<String>,
}

impl CrawlOptions {
    pub fn build_scope(&self) -> anyhow::Result<riptide_scope::ScopeEngine> {
        let mut scope = riptide_scope::ScopeEngine::new();
        for pattern in &self.in_scope {
            scope
                .add_include(pattern)
                .map_err(|e| anyhow::anyhow!("invalid --in-scope pattern {pattern:?}: {e}"))?;
        }
        for pattern in &self.out_scope {
            scope
                .add_exclude(pattern)
                .map_err(|e| anyhow::anyhow!("invalid --out-scope pattern {pattern:?}: {e}"))?;
        }
        Ok(scope)
    }

    pub fn build_config(&self) -> riptide_spider::SpiderConfig {
        use riptide_reliability::RetryPolicy;
        use riptide_types::ports::FetchOptions;
        use std::time::Duration;

        riptide_spider::SpiderConfig {
            concurrency: self.concurrency,
            max_depth: self.max_depth,
            max_pages: self.max_pages,
            fetch_timeout: Duration::from_secs(self.timeout),
            dequeue_poll_timeout: Duration::from_millis(500),
            global_rate_limit_rps: self.rate_limit,
            per_host_min_interval: Duration::from_millis(500),
            retry: RetryPolicy {
                max_attempts: self.retries,
                ..RetryPolicy::default()
            },
            fetch_options: FetchOptions {
                timeout: Duration::from_secs(self.timeout),
                js_wait: Duration::from_millis(self.js_wait_ms),
                scroll: self.scroll,
                scroll_times: self.scroll_times,
                click_selector: self.click_selector.clone(),
                insecure: self.insecure,
            },
            checkpoint_interval: Some(Duration::from_secs(30)),
            shared_store_url: self.shared_store_url.clone(),
        }
    }

    /// Warn about flags this crate accepts for shape but does not wire to
    /// any collaborator. Keeps the no-op contract visible instead of silent.
    pub fn warn_stub_flags(&self) {
        let stubs: &[(&str, bool)] = &[
            ("--export", self.export.is_some()),
            ("--dashboard", self.dashboard),
            ("--proxy", self.proxy.is_some()),
            ("--proxy-file", self.proxy_file.is_some()),
            ("--auth-type", self.auth_type.is_some()),
            ("--captcha", self.captcha.is_some()),
            ("--vision", self.vision.is_some()),
            ("--webhooks", !self.webhooks.is_empty()),
        ];
        for (flag, set) in stubs {
            if *set {
                tracing::warn!(flag = %flag, "flag accepted but not wired to a collaborator in this build");
            }
        }
    }
}
