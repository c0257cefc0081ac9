//! Fetcher Adapter port — the contract-only boundary to a page-fetching
//! capability (headless browser or plain HTTP client).

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::model::{ErrorKind, Fingerprint};

/// Options controlling a single fetch invocation.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Hard deadline for the whole fetch, including any dynamic-content wait
    pub timeout: Duration,
    /// Wait this long after initial load for dynamic content (headless mode)
    pub js_wait: Duration,
    /// Scroll to trigger lazy-loaded content
    pub scroll: bool,
    /// Number of scroll iterations to perform when `scroll` is set
    pub scroll_times: u32,
    /// CSS selector to click after load, if any (headless mode)
    pub click_selector: Option<String>,
    /// Skip TLS certificate verification
    pub insecure: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            js_wait: Duration::from_millis(0),
            scroll: false,
            scroll_times: 0,
            click_selector: None,
            insecure: false,
        }
    }
}

/// A successful page fetch.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    /// Final URL after following redirects
    pub final_url: String,
    /// HTTP status code, if a response was received
    pub status: Option<u16>,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Rendered HTML body
    pub body: String,
    /// Page title, if discoverable
    pub title: Option<String>,
    /// Raw screenshot bytes, if the adapter supports it
    pub screenshot: Option<Vec<u8>>,
}

/// The result of one fetch attempt. Failure is data, not a thrown error —
/// callers pattern-match to decide whether to retry. The HTTP status (when
/// a response was actually received) travels with the error kind so a
/// failed Page Record still carries it, and so the per-host rate limiter
/// can be driven from the status of a single attempt rather than waiting
/// for the terminal outcome of the whole retry sequence.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success(PageOutcome),
    /// Transient failure; the worker should retry with backoff.
    Retryable { kind: ErrorKind, status: Option<u16> },
    /// Non-retryable failure; the worker records it and moves on.
    Permanent { kind: ErrorKind, status: Option<u16> },
}

/// Capability interface for fetching a single page. Exactly one concrete,
/// in-core implementation (`ReqwestFetcher` in `riptide-fetch`) ships with
/// this crate; a headless-browser adapter is an out-of-core collaborator
/// satisfying the same contract.
#[async_trait]
pub trait FetcherAdapter: Send + Sync {
    /// Fetch `url`, applying `fingerprint` and honoring `options`.
    async fn fetch(
        &self,
        url: &str,
        fingerprint: &Fingerprint,
        options: &FetchOptions,
    ) -> FetchOutcome;
}
