//! Per-host adaptive rate pacing and per-page fingerprint randomization.

pub mod fingerprint;
pub mod rate_limiter;
pub mod user_agent;

pub use fingerprint::FingerprintSource;
pub use rate_limiter::AdaptivePacer;
pub use user_agent::{BrowserType, RotationStrategy, UserAgentConfig, UserAgentManager};
