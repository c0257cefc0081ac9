//! Concurrency-limited worker pool used by `riptide-spider` to run its
//! per-item crawl loop across a fixed number of concurrent workers.

pub mod pool;

pub use pool::{PoolStatsSnapshot, WorkerPool, WorkerStats};
