//! In-memory implementation of the shared-store port.
//!
//! ⚠️ **Single-Process Only** ⚠️
//!
//! All coordination is local to this process; nothing here is visible to
//! another process. Use `RedisStore` for distributed mode. Suitable for
//! development, testing, and single-instance deployments.
//!
//! # Example
//!
//! ```rust
//! use riptide_cache::adapters::MemoryStore;
//! use riptide_types::ports::SharedStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! assert!(store.add_if_absent("visited", "https://example.com/").await?);
//! assert!(!store.add_if_absent("visited", "https://example.com/").await?);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use riptide_types::ports::{CoordinationResult, SharedStore};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};
use tokio::time::timeout as tokio_timeout;

struct Queue {
    items: Mutex<VecDeque<Vec<u8>>>,
    notify: Notify,
}

impl Queue {
    fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
        }
    }
}

/// In-memory shared-store adapter, backing the local (single-process)
/// crawl mode's distributed-style components.
pub struct MemoryStore {
    queues: DashMap<String, Arc<Queue>>,
    sets: DashMap<String, Arc<DashSet<String>>>,
    lists: DashMap<String, Arc<Mutex<Vec<Vec<u8>>>>>,
    workers: DashMap<String, Instant>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            queues: DashMap::new(),
            sets: DashMap::new(),
            lists: DashMap::new(),
            workers: DashMap::new(),
        }
    }

    fn queue(&self, name: &str) -> Arc<Queue> {
        self.queues
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Queue::new()))
            .clone()
    }

    fn set(&self, name: &str) -> Arc<DashSet<String>> {
        self.sets
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(DashSet::new()))
            .clone()
    }

    fn list(&self, name: &str) -> Arc<Mutex<Vec<Vec<u8>>>> {
        self.lists
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn enqueue(&self, queue: &str, value: Vec<u8>) -> CoordinationResult<()> {
        let q = self.queue(queue);
        q.items.lock().await.push_back(value);
        q.notify.notify_one();
        Ok(())
    }

    async fn dequeue(
        &self,
        queue: &str,
        timeout: Duration,
    ) -> CoordinationResult<Option<Vec<u8>>> {
        let q = self.queue(queue);
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(value) = q.items.lock().await.pop_front() {
                return Ok(Some(value));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let _ = tokio_timeout(remaining, q.notify.notified()).await;
        }
    }

    async fn add_if_absent(&self, set: &str, member: &str) -> CoordinationResult<bool> {
        Ok(self.set(set).insert(member.to_string()))
    }

    async fn list_append(&self, list: &str, value: Vec<u8>) -> CoordinationResult<()> {
        self.list(list).lock().await.push(value);
        Ok(())
    }

    async fn list_read(&self, list: &str) -> CoordinationResult<Vec<Vec<u8>>> {
        Ok(self.list(list).lock().await.clone())
    }

    async fn set_members(&self, set: &str) -> CoordinationResult<Vec<String>> {
        Ok(self.set(set).iter().map(|m| m.clone()).collect())
    }

    async fn queue_snapshot(&self, queue: &str) -> CoordinationResult<Vec<Vec<u8>>> {
        let q = self.queue(queue);
        Ok(q.items.lock().await.iter().cloned().collect())
    }

    async fn register_worker(&self, worker_id: &str, _ttl: Duration) -> CoordinationResult<()> {
        self.workers.insert(worker_id.to_string(), Instant::now());
        Ok(())
    }

    async fn unregister_worker(&self, worker_id: &str) -> CoordinationResult<()> {
        self.workers.remove(worker_id);
        Ok(())
    }

    async fn heartbeat_worker(&self, worker_id: &str, _ttl: Duration) -> CoordinationResult<()> {
        self.workers.insert(worker_id.to_string(), Instant::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_if_absent_is_atomic_per_member() {
        let store = MemoryStore::new();
        assert!(store.add_if_absent("visited", "a").await.unwrap());
        assert!(!store.add_if_absent("visited", "a").await.unwrap());
        assert!(store.add_if_absent("visited", "b").await.unwrap());
    }

    #[tokio::test]
    async fn queue_is_fifo() {
        let store = MemoryStore::new();
        store.enqueue("q", b"1".to_vec()).await.unwrap();
        store.enqueue("q", b"2".to_vec()).await.unwrap();
        assert_eq!(
            store.dequeue("q", Duration::from_millis(10)).await.unwrap(),
            Some(b"1".to_vec())
        );
        assert_eq!(
            store.dequeue("q", Duration::from_millis(10)).await.unwrap(),
            Some(b"2".to_vec())
        );
    }

    #[tokio::test]
    async fn dequeue_times_out_on_empty_queue() {
        let store = MemoryStore::new();
        let result = store.dequeue("empty", Duration::from_millis(20)).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn set_members_reflects_inserted_members() {
        let store = MemoryStore::new();
        store.add_if_absent("visited", "a").await.unwrap();
        store.add_if_absent("visited", "b").await.unwrap();
        let mut members = store.set_members("visited").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn queue_snapshot_does_not_remove_items() {
        let store = MemoryStore::new();
        store.enqueue("q", b"1".to_vec()).await.unwrap();
        store.enqueue("q", b"2".to_vec()).await.unwrap();
        assert_eq!(
            store.queue_snapshot("q").await.unwrap(),
            vec![b"1".to_vec(), b"2".to_vec()]
        );
        assert_eq!(
            store.dequeue("q", Duration::from_millis(10)).await.unwrap(),
            Some(b"1".to_vec())
        );
    }

    #[tokio::test]
    async fn list_append_and_read_round_trips() {
        let store = MemoryStore::new();
        store.list_append("results", b"r1".to_vec()).await.unwrap();
        store.list_append("results", b"r2".to_vec()).await.unwrap();
        let all = store.list_read("results").await.unwrap();
        assert_eq!(all, vec![b"r1".to_vec(), b"r2".to_vec()]);
    }

    #[tokio::test]
    async fn worker_registration_round_trips() {
        let store = MemoryStore::new();
        store
            .register_worker("w1", Duration::from_secs(30))
            .await
            .unwrap();
        store
            .heartbeat_worker("w1", Duration::from_secs(30))
            .await
            .unwrap();
        store.unregister_worker("w1").await.unwrap();
    }
}
