//! Shared data model and capability ports for the crawl engine.
//!
//! Every other crate in this workspace depends on `riptide-types` for the
//! types that cross a boundary: the error enum, the `PageRecord`/`CrawlState`
//! data model, and the hexagonal ports (`FetcherAdapter`, rate limiters,
//! `SharedStore`) that let adapters be swapped without touching the core.

pub mod error;
pub mod model;
pub mod ports;

pub use error::{Result, RiptideError};
pub use model::{
    CanonicalUrl, CrawlState, ErrorKind, Fingerprint, PageRecord, ScopePolarity, ScopeRule,
    ScopeRuleKind, WorkItem, CHECKPOINT_SCHEMA_VERSION,
};
