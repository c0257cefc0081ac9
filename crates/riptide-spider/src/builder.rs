//! Explicit dependency construction for the Orchestrator.
//!
//! Per the redesign away from dynamic attribute injection: the Scope
//! Engine, Rate Limiter, Fetcher Adapter, and Shared-Store Adapter are
//! all passed in through the builder and never attached post-construction.

use crate::config::SpiderConfig;
use crate::orchestrator::Orchestrator;
use riptide_cache::{MemoryStore, RedisStore};
use riptide_fetch::ReqwestFetcher;
use riptide_reliability::{RateLimiterBuilder, SimpleRateLimiter};
use riptide_scope::ScopeEngine;
use riptide_stealth::{AdaptivePacer, FingerprintSource, UserAgentConfig, UserAgentManager};
use riptide_types::ports::{FetcherAdapter, GlobalRateLimiter, PerHostRateLimiter, SharedStore};
use std::sync::Arc;

/// Builds an [`Orchestrator`] from a [`SpiderConfig`] plus the
/// capabilities it needs. Every dependency defaults to the in-core
/// implementation but can be swapped (e.g. a test double fetcher, or a
/// distributed `SharedStore`).
pub struct SpiderBuilder {
    config: SpiderConfig,
    scope: Option<ScopeEngine>,
    fetcher: Option<Arc<dyn FetcherAdapter>>,
    global_limiter: Option<Arc<dyn GlobalRateLimiter>>,
    host_limiter: Option<Arc<dyn PerHostRateLimiter>>,
    shared_store: Option<Arc<dyn SharedStore>>,
    fingerprints: Option<FingerprintSource>,
}

impl SpiderBuilder {
    pub fn new(config: SpiderConfig) -> Self {
        Self {
            config,
            scope: None,
            fetcher: None,
            global_limiter: None,
            host_limiter: None,
            shared_store: None,
            fingerprints: None,
        }
    }

    pub fn with_scope(mut self, scope: ScopeEngine) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn FetcherAdapter>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_global_limiter(mut self, limiter: Arc<dyn GlobalRateLimiter>) -> Self {
        self.global_limiter = Some(limiter);
        self
    }

    pub fn with_host_limiter(mut self, limiter: Arc<dyn PerHostRateLimiter>) -> Self {
        self.host_limiter = Some(limiter);
        self
    }

    pub fn with_shared_store(mut self, store: Arc<dyn SharedStore>) -> Self {
        self.shared_store = Some(store);
        self
    }

    pub fn with_fingerprints(mut self, source: FingerprintSource) -> Self {
        self.fingerprints = Some(source);
        self
    }

    /// Assemble the Orchestrator. Any dependency not supplied is built
    /// from `config` using the in-core default adapter.
    pub async fn build(self) -> anyhow::Result<Orchestrator> {
        self.config
            .validate()
            .map_err(riptide_types::RiptideError::Configuration)?;

        let scope = self.scope.unwrap_or_else(ScopeEngine::new);

        let fetcher = match self.fetcher {
            Some(f) => f,
            None => Arc::new(ReqwestFetcher::new(
                self.config.retry.clone(),
                riptide_fetch::CircuitBreakerConfig::default(),
            )?),
        };

        let global_limiter: Arc<dyn GlobalRateLimiter> = match self.global_limiter {
            Some(l) => l,
            None => Arc::new(
                RateLimiterBuilder::new(self.config.global_rate_limit_rps).build(),
            ) as Arc<dyn GlobalRateLimiter>,
        };

        let host_limiter: Arc<dyn PerHostRateLimiter> = match self.host_limiter {
            Some(l) => l,
            None => Arc::new(AdaptivePacer::new(self.config.per_host_min_interval)),
        };

        let shared_store: Arc<dyn SharedStore> = match self.shared_store {
            Some(s) => s,
            None => match &self.config.shared_store_url {
                Some(url) => Arc::new(RedisStore::connect(url, "riptide").await?),
                None => Arc::new(MemoryStore::new()),
            },
        };

        let fingerprints = self.fingerprints.unwrap_or_else(|| {
            FingerprintSource::new(UserAgentManager::new(UserAgentConfig::default()))
        });

        Ok(Orchestrator::new(
            self.config,
            scope,
            fetcher,
            global_limiter,
            host_limiter,
            shared_store,
            fingerprints,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_with_defaults_succeeds() {
        let orchestrator = SpiderBuilder::new(SpiderConfig::default().with_concurrency(1))
            .build()
            .await;
        assert!(orchestrator.is_ok());
    }

    #[tokio::test]
    async fn build_rejects_invalid_config() {
        let orchestrator = SpiderBuilder::new(SpiderConfig::default().with_concurrency(0))
            .build()
            .await;
        assert!(orchestrator.is_err());
    }
}
