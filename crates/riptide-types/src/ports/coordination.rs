//! Shared-store port for distributed-mode coordination.
//!
//! Provides a backend-agnostic interface over four primitives — a FIFO
//! queue, an atomic-add set, an append-only list, and worker registration —
//! that the local (in-process) and distributed (Redis-backed) adapters both
//! implement identically from the core's point of view. `set_members`/
//! `queue_snapshot` give a read-only view over the set and queue without
//! consuming them, used by the checkpointer to persist the visited set and
//! pending work alongside results.
//!
//! # Example
//!
//! ```rust,ignore
//! use riptide_types::ports::SharedStore;
//!
//! async fn claim(store: &dyn SharedStore, url: &str) -> bool {
//!     store.add_if_absent("visited", url).await.unwrap_or(false)
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::RiptideError;

/// Result type for shared-store operations
pub type CoordinationResult<T> = std::result::Result<T, RiptideError>;

/// Shared-store interface used by the Work Queue, Visited Set, and Result
/// Store when the crawl runs in distributed mode.
///
/// All implementations must be thread-safe (Send + Sync) since a single
/// instance is shared across every worker task.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Push a value onto the named FIFO queue.
    async fn enqueue(&self, queue: &str, value: Vec<u8>) -> CoordinationResult<()>;

    /// Pop the next value from the named FIFO queue, waiting up to
    /// `timeout` before returning `Ok(None)`.
    async fn dequeue(&self, queue: &str, timeout: Duration) -> CoordinationResult<Option<Vec<u8>>>;

    /// Atomically add `member` to the named set, returning whether it was
    /// newly inserted (`true`) or already present (`false`). This is the
    /// distributed-mode implementation of the mark-at-enqueue invariant.
    async fn add_if_absent(&self, set: &str, member: &str) -> CoordinationResult<bool>;

    /// Append a value to the named durable list (the distributed result
    /// log).
    async fn list_append(&self, list: &str, value: Vec<u8>) -> CoordinationResult<()>;

    /// Read the full contents of a named durable list.
    async fn list_read(&self, list: &str) -> CoordinationResult<Vec<Vec<u8>>>;

    /// Enumerate the current members of the named set, for checkpointing
    /// the visited set. Order is not guaranteed.
    async fn set_members(&self, set: &str) -> CoordinationResult<Vec<String>>;

    /// Peek the named queue's current contents without removing them, for
    /// checkpointing the pending work queue. Preserves FIFO order; items
    /// already claimed by an in-flight `dequeue` are not included.
    async fn queue_snapshot(&self, queue: &str) -> CoordinationResult<Vec<Vec<u8>>>;

    /// Register this worker's identity, with a heartbeat TTL.
    async fn register_worker(&self, worker_id: &str, ttl: Duration) -> CoordinationResult<()>;

    /// Remove this worker's registration (graceful shutdown).
    async fn unregister_worker(&self, worker_id: &str) -> CoordinationResult<()>;

    /// Refresh a worker's registration TTL.
    async fn heartbeat_worker(&self, worker_id: &str, ttl: Duration) -> CoordinationResult<()>;
}

/// Metadata recorded for a registered worker, surfaced by adapters that
/// track more than bare liveness (used for diagnostics only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerMetadata {
    /// Opaque worker identifier
    pub worker_id: String,
    /// Unix timestamp (seconds) of the last heartbeat
    pub last_heartbeat_secs: u64,
}
