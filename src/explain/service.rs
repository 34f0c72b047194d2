use super::prompt::explain_prompt;
use super::validation::validate_explain_input;
use crate::cache::{CacheKey, CacheKeyGenerator, CacheResult, CacheStats, SingleFlightCache};
use crate::resilience::ResilientCaller;
use crate::transport::GenerateRequest;
use crate::types::{Explanation, WordExplanation};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Outcome of [`Explainer::explain_detailed`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainOutcome {
    pub cache_key: CacheKey,
    pub result: CacheResult<WordExplanation>,
}

impl ExplainOutcome {
    pub fn into_explanation(self) -> Explanation {
        self.result.data.with_cache_key(self.cache_key)
    }
}

/// Explains a word as used in a context paragraph.
///
/// `VALIDATE -> DERIVE_KEY -> CACHE_LOOKUP -> COALESCE_CHECK -> RETRY_LOOP -> STORE`.
pub struct Explainer {
    keys: CacheKeyGenerator,
    cache: SingleFlightCache<WordExplanation>,
    caller: Arc<ResilientCaller>,
    model: String,
    cache_ttl: Duration,
}

impl Explainer {
    pub(crate) fn new(
        keys: CacheKeyGenerator,
        cache: SingleFlightCache<WordExplanation>,
        caller: Arc<ResilientCaller>,
        model: String,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            keys,
            cache,
            caller,
            model,
            cache_ttl,
        }
    }

    pub async fn explain(&self, word: &str, context: &str) -> Result<Explanation> {
        self.explain_detailed(word, context)
            .await
            .map(ExplainOutcome::into_explanation)
    }

    /// Like [`Explainer::explain`], but also reports whether the answer came
    /// from the store or from another caller's computation.
    pub async fn explain_detailed(&self, word: &str, context: &str) -> Result<ExplainOutcome> {
        let cache_key = self.cache_key(word, context)?;
        let span = info_span!(
            "explain",
            request_id = %Uuid::new_v4(),
            cache_key = cache_key.as_str(),
        );

        let caller = Arc::clone(&self.caller);
        let request = GenerateRequest::json(self.model.as_str(), explain_prompt(word, context));
        let compute = move || async move { caller.call(&request).await };

        let result = self
            .cache
            .get_or_compute(cache_key.as_str(), compute, self.cache_ttl)
            .instrument(span)
            .await?;

        Ok(ExplainOutcome { cache_key, result })
    }

    /// Validate the pair and derive its cache key without any I/O.
    pub fn cache_key(&self, word: &str, context: &str) -> Result<CacheKey> {
        derive_cache_key(&self.keys, word, context)
    }

    /// Drop the cached explanation for this pair. Returns whether the store
    /// held an entry.
    pub async fn invalidate(&self, word: &str, context: &str) -> Result<bool> {
        let cache_key = self.cache_key(word, context)?;
        Ok(self.cache.invalidate(cache_key.as_str()).await)
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }
}

/// Validate the pair and derive its cache key with `keys`. Needs no store
/// or upstream, so callers that only want the key never connect to either.
pub fn derive_cache_key(keys: &CacheKeyGenerator, word: &str, context: &str) -> Result<CacheKey> {
    validate_explain_input(word, context)?;
    Ok(keys.cache_key(word, context))
}
