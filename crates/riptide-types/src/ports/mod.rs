//! Capability ports (hexagonal boundaries) shared across the crawl engine.

pub mod coordination;
pub mod fetch;
pub mod rate_limit;

pub use coordination::{CoordinationResult, SharedStore, WorkerMetadata};
pub use fetch::{FetchOptions, FetchOutcome, FetcherAdapter, PageOutcome};
pub use rate_limit::{DomainStats, GlobalRateLimiter, PerHostRateLimiter};
