//! Work Queue + Visited Set, unified over the `SharedStore` port so the
//! same code drives both local (in-memory) and distributed (Redis) mode.
//!
//! `try_enqueue` performs the mark-at-enqueue check-then-insert atomically
//! via `SharedStore::add_if_absent`: a URL is added to Visited and pushed
//! to the queue in the same logical step, from the caller's point of view
//! — no other caller can observe the set-membership without also having
//! lost the race to enqueue.

use riptide_types::ports::SharedStore;
use riptide_types::{CanonicalUrl, Result, WorkItem};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::warn;

const QUEUE_NAME: &str = "frontier";
const VISITED_NAME: &str = "visited";

/// Local view over the shared work queue and visited set for one crawl.
pub struct Frontier {
    store: Arc<dyn SharedStore>,
    pending: AtomicUsize,
    drained: Notify,
}

impl Frontier {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self {
            store,
            pending: AtomicUsize::new(0),
            drained: Notify::new(),
        }
    }

    /// Attempt to claim and enqueue a URL at the given depth. Returns
    /// `true` if this caller won the race (the URL was previously
    /// unvisited); `false` if it was already claimed, in which case the
    /// item is silently dropped per the Visited Set contract.
    pub async fn try_enqueue(&self, url: CanonicalUrl, depth: usize) -> bool {
        let won = match self.store.add_if_absent(VISITED_NAME, url.as_str()).await {
            Ok(won) => won,
            Err(err) => {
                warn!(%err, url = url.as_str(), "shared store unavailable during add_if_absent");
                return false;
            }
        };
        if !won {
            return false;
        }
        let item = WorkItem { url, depth };
        let Ok(bytes) = serde_json::to_vec(&item) else {
            warn!(url = item.url.as_str(), "failed to serialize work item");
            return false;
        };
        if let Err(err) = self.store.enqueue(QUEUE_NAME, bytes).await {
            warn!(%err, "shared store unavailable during enqueue");
            return false;
        }
        self.pending.fetch_add(1, Ordering::SeqCst);
        true
    }

    /// Pop the next work item, waiting up to `timeout`.
    pub async fn dequeue(&self, timeout: Duration) -> Option<WorkItem> {
        match self.store.dequeue(QUEUE_NAME, timeout).await {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).ok(),
            Ok(None) => None,
            Err(err) => {
                warn!(%err, "shared store unavailable during dequeue");
                None
            }
        }
    }

    /// Re-enqueue a work item recovered from a checkpoint. Unlike
    /// `try_enqueue`, this does not gate on `add_if_absent`: the item was
    /// already pending (and hence already visited) when the checkpoint was
    /// captured, so the mark-at-enqueue race was already won in the prior
    /// run. Callers restore the visited set separately.
    pub async fn restore_pending(&self, item: WorkItem) -> Result<()> {
        let bytes = serde_json::to_vec(&item)?;
        self.store.enqueue(QUEUE_NAME, bytes).await?;
        self.pending.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Snapshot the visited set's current members, for checkpointing.
    pub async fn visited_snapshot(&self) -> Vec<CanonicalUrl> {
        match self.store.set_members(VISITED_NAME).await {
            Ok(members) => members.into_iter().map(CanonicalUrl).collect(),
            Err(err) => {
                warn!(%err, "shared store unavailable during visited_snapshot");
                Vec::new()
            }
        }
    }

    /// Snapshot the pending queue's current contents, for checkpointing.
    /// Items already claimed by an in-flight worker (dequeued but not yet
    /// acknowledged) are not included.
    pub async fn pending_snapshot(&self) -> Vec<WorkItem> {
        match self.store.queue_snapshot(QUEUE_NAME).await {
            Ok(items) => items
                .into_iter()
                .filter_map(|bytes| serde_json::from_slice(&bytes).ok())
                .collect(),
            Err(err) => {
                warn!(%err, "shared store unavailable during pending_snapshot");
                Vec::new()
            }
        }
    }

    /// Acknowledge completion of a previously dequeued item (success,
    /// permanent failure, or cancellation — all paths must call this).
    pub fn task_done(&self) {
        let previous = self.pending.fetch_sub(1, Ordering::SeqCst);
        if previous == 1 {
            self.drained.notify_waiters();
        }
    }

    /// Number of work items enqueued by this process but not yet
    /// acknowledged.
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Wait until this process's locally-tracked pending count reaches
    /// zero.
    pub async fn join(&self) {
        while self.pending_count() > 0 {
            self.drained.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riptide_cache::MemoryStore;

    fn frontier() -> Frontier {
        Frontier::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn second_enqueue_of_same_url_is_rejected() {
        let f = frontier();
        let url = CanonicalUrl("https://example.com/".to_string());
        assert!(f.try_enqueue(url.clone(), 0).await);
        assert!(!f.try_enqueue(url, 0).await);
    }

    #[tokio::test]
    async fn dequeue_returns_enqueued_item() {
        let f = frontier();
        let url = CanonicalUrl("https://example.com/".to_string());
        assert!(f.try_enqueue(url.clone(), 2).await);
        let item = f.dequeue(Duration::from_millis(50)).await.unwrap();
        assert_eq!(item.url, url);
        assert_eq!(item.depth, 2);
    }

    #[tokio::test]
    async fn join_completes_after_task_done() {
        let f = frontier();
        f.try_enqueue(CanonicalUrl("https://example.com/".to_string()), 0)
            .await;
        assert_eq!(f.pending_count(), 1);
        f.task_done();
        f.join().await;
        assert_eq!(f.pending_count(), 0);
    }

    #[tokio::test]
    async fn visited_and_pending_snapshots_reflect_enqueued_items() {
        let f = frontier();
        let url = CanonicalUrl("https://example.com/".to_string());
        f.try_enqueue(url.clone(), 1).await;

        let visited = f.visited_snapshot().await;
        assert_eq!(visited, vec![url.clone()]);

        let pending = f.pending_snapshot().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].url, url);
        assert_eq!(pending[0].depth, 1);
    }

    #[tokio::test]
    async fn restore_pending_enqueues_without_the_visited_gate() {
        let f = frontier();
        let url = CanonicalUrl("https://example.com/".to_string());
        // Mark visited first, as `Orchestrator::restore` does before
        // restoring pending items — `try_enqueue` would reject this.
        assert!(f.try_enqueue(url.clone(), 0).await);
        f.dequeue(Duration::from_millis(10)).await;
        f.task_done();

        f.restore_pending(WorkItem { url: url.clone(), depth: 0 })
            .await
            .unwrap();
        let item = f.dequeue(Duration::from_millis(50)).await.unwrap();
        assert_eq!(item.url, url);
    }
}
