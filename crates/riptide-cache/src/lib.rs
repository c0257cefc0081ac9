//! Shared-store adapters: an in-memory implementation for local/single
//! process crawls and a Redis-backed implementation for distributed mode.
//! Both implement `riptide_types::ports::SharedStore` identically from
//! the core's point of view.

pub mod adapters;

pub use adapters::{MemoryStore, RedisStore};
