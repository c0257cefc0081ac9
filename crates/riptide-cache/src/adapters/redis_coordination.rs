//! Redis-backed implementation of the shared-store port, used when the
//! crawl runs in distributed mode across multiple worker processes.
//!
//! Atomicity is pushed onto Redis itself: `SADD` for the visited set
//! (mark-at-enqueue), `RPUSH`/`BLPOP` for the FIFO queue, `SET ... EX` for
//! worker leases. Grounded on the namespaced-key and lease-TTL patterns in
//! `riptide-workers`'s `JobQueue`.
//!
//! # Example
//!
//! ```rust,ignore
//! use riptide_cache::adapters::RedisStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = RedisStore::connect("redis://localhost:6379", "riptide").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use riptide_types::error::RiptideError;
use riptide_types::ports::{CoordinationResult, SharedStore};
use std::time::Duration;
use tracing::debug;

/// Redis-backed shared-store adapter.
///
/// Holds a [`MultiplexedConnection`], which is cheap to clone and safe to
/// share across tasks — each method below clones its own handle rather
/// than taking `&mut self`, since the port's methods take `&self`.
pub struct RedisStore {
    conn: MultiplexedConnection,
    namespace: String,
}

impl RedisStore {
    pub async fn connect(redis_url: &str, namespace: impl Into<String>) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            conn,
            namespace: namespace.into(),
        })
    }

    fn key(&self, kind: &str, name: &str) -> String {
        format!("{}:{}:{}", self.namespace, kind, name)
    }

    fn map_err(context: &str, err: redis::RedisError) -> RiptideError {
        RiptideError::SharedStoreUnavailable(format!("{context}: {err}"))
    }
}

#[async_trait]
impl SharedStore for RedisStore {
    async fn enqueue(&self, queue: &str, value: Vec<u8>) -> CoordinationResult<()> {
        let key = self.key("queue", queue);
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(&key, value)
            .await
            .map_err(|e| Self::map_err("enqueue", e))
    }

    async fn dequeue(
        &self,
        queue: &str,
        timeout: Duration,
    ) -> CoordinationResult<Option<Vec<u8>>> {
        let key = self.key("queue", queue);
        let mut conn = self.conn.clone();
        // BLPOP takes a whole-second timeout; round up so a short
        // requested wait is never silently treated as non-blocking.
        let secs = timeout.as_secs_f64().ceil().max(1.0);
        let result: Option<(String, Vec<u8>)> = conn
            .blpop(&key, secs)
            .await
            .map_err(|e| Self::map_err("dequeue", e))?;
        Ok(result.map(|(_, value)| value))
    }

    async fn add_if_absent(&self, set: &str, member: &str) -> CoordinationResult<bool> {
        let key = self.key("set", set);
        let mut conn = self.conn.clone();
        let added: i64 = conn
            .sadd(&key, member)
            .await
            .map_err(|e| Self::map_err("add_if_absent", e))?;
        Ok(added > 0)
    }

    async fn list_append(&self, list: &str, value: Vec<u8>) -> CoordinationResult<()> {
        let key = self.key("list", list);
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(&key, value)
            .await
            .map_err(|e| Self::map_err("list_append", e))
    }

    async fn list_read(&self, list: &str) -> CoordinationResult<Vec<Vec<u8>>> {
        let key = self.key("list", list);
        let mut conn = self.conn.clone();
        conn.lrange(&key, 0, -1)
            .await
            .map_err(|e| Self::map_err("list_read", e))
    }

    async fn set_members(&self, set: &str) -> CoordinationResult<Vec<String>> {
        let key = self.key("set", set);
        let mut conn = self.conn.clone();
        conn.smembers(&key)
            .await
            .map_err(|e| Self::map_err("set_members", e))
    }

    async fn queue_snapshot(&self, queue: &str) -> CoordinationResult<Vec<Vec<u8>>> {
        let key = self.key("queue", queue);
        let mut conn = self.conn.clone();
        conn.lrange(&key, 0, -1)
            .await
            .map_err(|e| Self::map_err("queue_snapshot", e))
    }

    async fn register_worker(&self, worker_id: &str, ttl: Duration) -> CoordinationResult<()> {
        let key = self.key("worker", worker_id);
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(&key, "alive", ttl.as_secs().max(1))
            .await
            .map_err(|e| Self::map_err("register_worker", e))?;
        debug!(worker_id, "registered worker lease");
        Ok(())
    }

    async fn unregister_worker(&self, worker_id: &str) -> CoordinationResult<()> {
        let key = self.key("worker", worker_id);
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(&key)
            .await
            .map_err(|e| Self::map_err("unregister_worker", e))
    }

    async fn heartbeat_worker(&self, worker_id: &str, ttl: Duration) -> CoordinationResult<()> {
        let key = self.key("worker", worker_id);
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(&key, "alive", ttl.as_secs().max(1))
            .await
            .map_err(|e| Self::map_err("heartbeat_worker", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Key-building only; round-trip behavior against a live Redis
    // instance is covered by riptide-workers's integration tests.

    #[test]
    fn namespaced_keys_are_distinct_per_kind() {
        let keyed = |ns: &str, kind: &str, name: &str| format!("{ns}:{kind}:{name}");
        assert_eq!(keyed("riptide", "queue", "frontier"), "riptide:queue:frontier");
        assert_eq!(keyed("riptide", "set", "visited"), "riptide:set:visited");
        assert_ne!(
            keyed("riptide", "queue", "x"),
            keyed("riptide", "set", "x")
        );
    }
}
