//! Checkpointer: periodic and on-shutdown snapshot/restore of Crawl
//! State, handed to a pluggable `CheckpointSink`. The core ships one
//! sink, `JsonFileSink`, writing `<id>.json` via `serde_json`.

use async_trait::async_trait;
use riptide_types::{CrawlState, Result, RiptideError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Persistence boundary for Crawl State. Byte-level opaque to the core;
/// any other sink (S3, a database row) is a collaborator the core is
/// agnostic to.
#[async_trait]
pub trait CheckpointSink: Send + Sync {
    async fn save(&self, id: &str, state: &CrawlState) -> Result<()>;
    async fn load(&self, id: &str) -> Result<Option<CrawlState>>;
}

/// Writes/reads `<dir>/<id>.json`.
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl CheckpointSink for JsonFileSink {
    async fn save(&self, id: &str, state: &CrawlState) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(id);
        let json = serde_json::to_vec_pretty(state)?;
        fs::write(&path, json).await?;
        info!(checkpoint_id = id, path = %path.display(), "checkpoint saved");
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<CrawlState>> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).await?;
        let state: CrawlState = serde_json::from_slice(&bytes)
            .map_err(|e| RiptideError::Checkpoint(format!("malformed checkpoint {id}: {e}")))?;
        if state.schema_version != riptide_types::CHECKPOINT_SCHEMA_VERSION {
            return Err(RiptideError::Checkpoint(format!(
                "checkpoint {id} has schema_version {}, expected {}",
                state.schema_version,
                riptide_types::CHECKPOINT_SCHEMA_VERSION
            )));
        }
        Ok(Some(state))
    }
}

pub fn default_sink(dir: impl AsRef<Path>) -> JsonFileSink {
    JsonFileSink::new(dir.as_ref().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use riptide_types::model::{ScopePolarity, ScopeRule, ScopeRuleKind};

    fn sample_state() -> CrawlState {
        let mut state = CrawlState::new(
            "cfg-hash".to_string(),
            vec![ScopeRule {
                kind: ScopeRuleKind::DeepWildcard,
                pattern: "example.com".to_string(),
                polarity: ScopePolarity::Include,
            }],
        );
        state
            .visited
            .push(riptide_types::CanonicalUrl("https://example.com/".to_string()));
        state
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let state = sample_state();
        sink.save("crawl-1", &state).await.unwrap();
        let restored = sink.load("crawl-1").await.unwrap().unwrap();
        assert_eq!(restored.visited, state.visited);
        assert_eq!(restored.schema_version, state.schema_version);
    }

    #[tokio::test]
    async fn load_missing_checkpoint_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path());
        assert!(sink.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn load_rejects_mismatched_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let mut state = sample_state();
        state.schema_version = 999;
        sink.save("crawl-2", &state).await.unwrap();
        assert!(sink.load("crawl-2").await.is_err());
    }
}
