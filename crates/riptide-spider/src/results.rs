//! Result Store: a bounded, lock-protected append log of page records.
//!
//! Readers (the checkpointer, progress reporting) may observe a count
//! that lags the most recent in-flight completion — there is no
//! synchronization between `append` and a concurrent `snapshot` beyond
//! the lock itself.

use riptide_types::PageRecord;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct ResultStore {
    records: RwLock<Vec<PageRecord>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, record: PageRecord) {
        self.records.write().await.push(record);
    }

    pub async fn snapshot(&self) -> Vec<PageRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riptide_types::model::ErrorKind;
    use riptide_types::{CanonicalUrl, Fingerprint};

    fn record(url: &str) -> PageRecord {
        PageRecord {
            url: CanonicalUrl(url.to_string()),
            http_status: Some(200),
            success: true,
            title: None,
            headers: Default::default(),
            discovered_links: Vec::new(),
            depth: 0,
            started_at_ms: 0,
            completed_at_ms: 0,
            error_kind: None::<ErrorKind>,
            content_hash: 0,
            fingerprint_used: Fingerprint {
                user_agent: "test-agent".to_string(),
                viewport: (1920, 1080),
                timezone: "UTC".to_string(),
                locale: "en-US".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn append_and_snapshot_round_trips() {
        let store = ResultStore::new();
        store.append(record("https://a.example/")).await;
        store.append(record("https://b.example/")).await;
        let snap = store.snapshot().await;
        assert_eq!(snap.len(), 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn starts_empty() {
        let store = ResultStore::new();
        assert!(store.is_empty().await);
    }
}
