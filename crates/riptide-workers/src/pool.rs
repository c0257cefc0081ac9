//! Generic concurrency-limited worker pool: spawns a fixed number of
//! workers, each driven by its own async task, and tracks per-worker
//! throughput. The pool is deliberately ignorant of what a "job" is — the
//! Orchestrator supplies the dequeue/fetch/extract loop per worker and
//! reports outcomes back through the `WorkerStats` handle it's given.

use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Per-worker counters, read back via [`WorkerPool::snapshot`].
#[derive(Debug, Default)]
pub struct WorkerStats {
    pub items_processed: AtomicU64,
    pub items_failed: AtomicU64,
}

impl WorkerStats {
    pub fn record_success(&self) {
        self.items_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.items_processed.fetch_add(1, Ordering::Relaxed);
        self.items_failed.fetch_add(1, Ordering::Relaxed);
    }
}

/// A point-in-time read of one worker's counters.
#[derive(Debug, Clone, Copy)]
pub struct PoolStatsSnapshot {
    pub worker_id: usize,
    pub items_processed: u64,
    pub items_failed: u64,
}

/// Fixed-size set of concurrently-running workers. Each worker's task is
/// supplied by the caller; the pool only owns worker identity and stats.
pub struct WorkerPool {
    worker_count: usize,
    stats: DashMap<usize, Arc<WorkerStats>>,
}

impl WorkerPool {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            stats: DashMap::new(),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Spawn one task per worker slot. `make_task` builds the per-worker
    /// future from its id and a fresh stats handle; the pool drives each to
    /// completion but does not interpret the task's output.
    pub fn spawn_each<F, Fut>(&self, make_task: F) -> Vec<JoinHandle<()>>
    where
        F: Fn(usize, Arc<WorkerStats>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        (0..self.worker_count)
            .map(|id| {
                let stats = Arc::new(WorkerStats::default());
                self.stats.insert(id, stats.clone());
                tokio::spawn(make_task(id, stats))
            })
            .collect()
    }

    pub fn snapshot(&self) -> Vec<PoolStatsSnapshot> {
        self.stats
            .iter()
            .map(|entry| PoolStatsSnapshot {
                worker_id: *entry.key(),
                items_processed: entry.value().items_processed.load(Ordering::Relaxed),
                items_failed: entry.value().items_failed.load(Ordering::Relaxed),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawns_one_task_per_worker_and_tracks_stats() {
        let pool = WorkerPool::new(3);
        let handles = pool.spawn_each(|_id, stats| async move {
            stats.record_success();
        });
        for handle in handles {
            handle.await.unwrap();
        }
        let snapshot = pool.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(
            snapshot.iter().map(|s| s.items_processed).sum::<u64>(),
            3
        );
    }

    #[tokio::test]
    async fn failure_increments_both_counters() {
        let pool = WorkerPool::new(1);
        let handles = pool.spawn_each(|_id, stats| async move {
            stats.record_failure();
        });
        for handle in handles {
            handle.await.unwrap();
        }
        let snapshot = pool.snapshot();
        assert_eq!(snapshot[0].items_processed, 1);
        assert_eq!(snapshot[0].items_failed, 1);
    }
}
