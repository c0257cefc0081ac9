//! Rate limiting port for hexagonal architecture.
//!
//! Provides backend-agnostic traits for the two-tier limiter: a global
//! token bucket and an optional per-host adaptive pacer. Concrete adapters
//! (`riptide-reliability`, `riptide-stealth`) implement these to provide
//! actual limiting logic.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::RiptideError;

/// Result type for rate limiting operations
pub type Result<T> = std::result::Result<T, RiptideError>;

/// Global token-bucket rate limiter port.
///
/// # Example
///
/// ```rust,ignore
/// use riptide_types::ports::GlobalRateLimiter;
///
/// async fn throttled(limiter: &dyn GlobalRateLimiter) {
///     limiter.acquire().await;
/// }
/// ```
#[async_trait]
pub trait GlobalRateLimiter: Send + Sync {
    /// Block cooperatively until a token is available, then consume it.
    async fn acquire(&self);

    /// Non-blocking check: true if a token is available right now.
    fn check(&self) -> bool;
}

/// Per-host adaptive pacer port.
#[async_trait]
pub trait PerHostRateLimiter: Send + Sync {
    /// Block until this host's current interval has elapsed, then record
    /// the attempt.
    async fn acquire(&self, host: &str);

    /// Report a successful fetch for `host`, tightening its interval once
    /// a success streak threshold is reached.
    fn report_success(&self, host: &str);

    /// Report a failed fetch for `host` with the observed status code (if
    /// any), loosening its interval on rate-limit/server errors.
    fn report_error(&self, host: &str, status: Option<u16>);

    /// Current observability snapshot for a host, if tracked.
    fn stats(&self, host: &str) -> Option<DomainStats>;

    /// Drop tracking state for hosts untouched since `older_than`.
    fn cleanup_stale(&self, older_than: Duration);
}

/// Per-host observability record surfaced by the adaptive pacer.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DomainStats {
    /// Consecutive successes since the last error
    pub consecutive_successes: u32,
    /// Consecutive errors since the last success
    pub consecutive_failures: u32,
    /// Current inter-request interval, in milliseconds
    pub current_interval_ms: u64,
    /// Total successful fetches recorded
    pub success_count: u64,
    /// Total failed fetches recorded
    pub failure_count: u64,
}
