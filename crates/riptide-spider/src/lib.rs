//! The crawl core: Orchestrator lifecycle, local/distributed Work Queue +
//! Visited Set (`Frontier`), Result Store, and the Checkpointer. Wires
//! together `riptide-scope`, `riptide-fetch`, `riptide-reliability`,
//! `riptide-stealth`, `riptide-extraction`, and `riptide-cache` behind the
//! explicit-dependency `SpiderBuilder`.

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod frontier;
pub mod metrics;
pub mod orchestrator;
pub mod results;

pub use builder::SpiderBuilder;
pub use checkpoint::{CheckpointSink, JsonFileSink};
pub use config::SpiderConfig;
pub use frontier::Frontier;
pub use metrics::CrawlMetrics;
pub use orchestrator::Orchestrator;
pub use results::ResultStore;
