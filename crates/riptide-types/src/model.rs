//! The shared crawl data model: canonical URLs, work items, page records,
//! crawl state, and fingerprints.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current checkpoint schema version. Bump whenever `CrawlState`'s shape
/// changes in a way that breaks `resume` against older checkpoints.
pub const CHECKPOINT_SCHEMA_VERSION: u32 = 1;

/// A canonical URL: the normalized string used for equality, hashing, and
/// visited-set membership. Kept as a thin newtype so call sites can't
/// accidentally mix raw and normalized strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalUrl(pub String);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CanonicalUrl {
    fn from(s: String) -> Self {
        CanonicalUrl(s)
    }
}

/// A unit of pending work: a canonical URL and the depth at which it was
/// discovered. Invariant: at most one work item per canonical URL is ever
/// enqueued for a given crawl (enforced by the Visited Set's
/// `add_if_absent` at enqueue time, not here).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub url: CanonicalUrl,
    pub depth: usize,
}

/// Per-fetch data describing why a page was not fetched successfully.
/// This is data carried inside a `PageRecord`, not a propagating error —
/// see [`crate::error::RiptideError`] for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidUrl,
    OutOfScope,
    FetchTimeout,
    TransportError,
    HttpClientError,
    HttpRateLimited,
    HttpServerError,
    ParseError,
    CancelledShutdown,
}

impl ErrorKind {
    /// Whether a worker should retry after this failure, per the
    /// classification in the error-handling design: transport/timeout and
    /// 429/5xx are retryable, 4xx (other than 408/429) is not.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::FetchTimeout
                | ErrorKind::TransportError
                | ErrorKind::HttpRateLimited
                | ErrorKind::HttpServerError
        )
    }
}

/// The immutable, structured output for one attempted fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: CanonicalUrl,
    pub http_status: Option<u16>,
    pub success: bool,
    pub title: Option<String>,
    pub headers: HashMap<String, String>,
    pub discovered_links: Vec<CanonicalUrl>,
    pub depth: usize,
    pub started_at_ms: u64,
    pub completed_at_ms: u64,
    pub error_kind: Option<ErrorKind>,
    pub content_hash: u64,
    pub fingerprint_used: Fingerprint,
}

/// A per-page browser fingerprint: randomized identity surfaced to the
/// fetched site. Never reused deterministically within the same session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub timezone: String,
    pub locale: String,
}

/// A single scope rule: host pattern plus polarity. See
/// [`crate::model::ScopeRuleKind`] for the matching semantics of each kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRule {
    pub kind: ScopeRuleKind,
    pub pattern: String,
    pub polarity: ScopePolarity,
}

/// The three host-pattern shapes a scope rule may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeRuleKind {
    /// Match the host literally
    Exact,
    /// `*.base` — exactly one subdomain label
    SingleWildcard,
    /// `**.base` — `base` itself or any depth of subdomain
    DeepWildcard,
}

/// Whether a matching rule includes or excludes the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopePolarity {
    Include,
    Exclude,
}

/// The checkpointable snapshot of a crawl: everything needed to resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlState {
    pub schema_version: u32,
    pub visited: Vec<CanonicalUrl>,
    pub pending: Vec<WorkItem>,
    pub results: Vec<PageRecord>,
    pub config_fingerprint: String,
    pub scope_rules: Vec<ScopeRule>,
}

impl CrawlState {
    pub fn new(config_fingerprint: String, scope_rules: Vec<ScopeRule>) -> Self {
        Self {
            schema_version: CHECKPOINT_SCHEMA_VERSION,
            visited: Vec::new(),
            pending: Vec::new(),
            results: Vec::new(),
            config_fingerprint,
            scope_rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_retryability_matches_design() {
        assert!(ErrorKind::FetchTimeout.is_retryable());
        assert!(ErrorKind::HttpRateLimited.is_retryable());
        assert!(ErrorKind::HttpServerError.is_retryable());
        assert!(!ErrorKind::HttpClientError.is_retryable());
        assert!(!ErrorKind::OutOfScope.is_retryable());
        assert!(!ErrorKind::InvalidUrl.is_retryable());
    }

    #[test]
    fn crawl_state_starts_empty_with_current_schema() {
        let state = CrawlState::new("cfg-hash".into(), vec![]);
        assert_eq!(state.schema_version, CHECKPOINT_SCHEMA_VERSION);
        assert!(state.visited.is_empty());
        assert!(state.pending.is_empty());
    }
}
