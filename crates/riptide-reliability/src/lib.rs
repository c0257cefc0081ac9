//! Global rate limiting and retry/backoff, shared across the fetch and
//! worker-pool layers.

pub mod retry;
pub mod token_bucket;

pub use retry::RetryPolicy;
pub use token_bucket::{RateLimiterBuilder, SimpleRateLimiter};
