use super::service::Explainer;
use crate::cache::{CacheKeyGenerator, CacheStore, MemoryStore, SingleFlightCache};
use crate::config::ExplainConfig;
use crate::resilience::ResilientCaller;
use crate::transport::{OllamaTransport, Upstream};
use crate::types::WordExplanation;
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use tracing::info;

/// Builder for [`Explainer`].
///
/// Anything not injected explicitly is derived from the [`ExplainConfig`]:
/// the upstream becomes an [`OllamaTransport`] on `base_url`, and the store
/// becomes Redis when `redis_url` is set, otherwise a [`MemoryStore`].
pub struct ExplainerBuilder {
    config: ExplainConfig,
    store: Option<Arc<dyn CacheStore>>,
    upstream: Option<Arc<dyn Upstream>>,
    keys: CacheKeyGenerator,
}

impl ExplainerBuilder {
    pub fn new() -> Self {
        Self {
            config: ExplainConfig::default(),
            store: None,
            upstream: None,
            keys: CacheKeyGenerator::new(),
        }
    }

    /// Start from [`ExplainConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Ok(Self::new().with_config(ExplainConfig::from_env()?))
    }

    pub fn with_config(mut self, config: ExplainConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_upstream(mut self, upstream: Arc<dyn Upstream>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    pub fn with_key_generator(mut self, keys: CacheKeyGenerator) -> Self {
        self.keys = keys;
        self
    }

    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }

    pub async fn build(self) -> Result<Explainer> {
        let store = match self.store {
            Some(store) => store,
            None => Self::store_from_config(&self.config).await?,
        };
        let upstream: Arc<dyn Upstream> = match self.upstream {
            Some(upstream) => upstream,
            None => Arc::new(OllamaTransport::new(&self.config.base_url)?),
        };

        info!(
            store = store.name(),
            upstream = upstream.name(),
            model = self.config.model.as_str(),
            instance_id = self.config.instance_id.as_str(),
            retry_count = self.config.retry_count,
            "Explainer ready"
        );

        let cache: SingleFlightCache<WordExplanation> =
            SingleFlightCache::with_instance_id(store, self.config.instance_id.as_str());
        let caller = Arc::new(ResilientCaller::new(upstream, self.config.retry_policy()));

        Ok(Explainer::new(
            self.keys,
            cache,
            caller,
            self.config.model,
            self.config.cache_ttl,
        ))
    }

    #[cfg(feature = "redis")]
    async fn store_from_config(config: &ExplainConfig) -> Result<Arc<dyn CacheStore>> {
        match config.redis_url.as_deref() {
            Some(url) => Ok(Arc::new(
                crate::cache::RedisStore::connect(url, config.redis_password.as_deref()).await?,
            )),
            None => Ok(Arc::new(MemoryStore::new())),
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn store_from_config(config: &ExplainConfig) -> Result<Arc<dyn CacheStore>> {
        if config.redis_url.is_some() {
            return Err(Error::configuration_with_context(
                "REDIS_URL is set but this build has no Redis support (enable the `redis` feature)",
                ErrorContext::new()
                    .with_field_path("REDIS_URL")
                    .with_source("explainer_builder"),
            ));
        }
        Ok(Arc::new(MemoryStore::new()))
    }
}

impl Default for ExplainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
