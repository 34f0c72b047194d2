//! Single-flight cache.
//!
//! Store lookup, per-key coalescing of concurrent misses, and persistence of
//! successful computations.

use super::backend::CacheStore;
use super::entry::{CacheResult, CachedEntry};
use crate::{Error, ErrorContext, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn, Instrument, Span};

type Computation<T> = Shared<BoxFuture<'static, Result<T>>>;

struct InFlight<T> {
    id: u64,
    computation: Computation<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub coalesced: u64,
    pub stores: u64,
    pub store_errors: u64,
    pub computations: u64,
    pub failures: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses + self.coalesced;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    stores: AtomicU64,
    store_errors: AtomicU64,
    computations: AtomicU64,
    failures: AtomicU64,
}

impl AtomicStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

struct Inner<T> {
    store: Arc<dyn CacheStore>,
    in_flight: Mutex<HashMap<String, InFlight<T>>>,
    next_id: AtomicU64,
    instance_id: String,
    stats: AtomicStats,
}

/// Removes the registry slot when the computation settles, including by panic.
struct Release<'a, T> {
    inner: &'a Inner<T>,
    key: &'a str,
    id: u64,
}

impl<T> Drop for Release<'_, T> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.inner.in_flight.lock() {
            // A newer computation may own the slot after an invalidate.
            if in_flight.get(self.key).map(|f| f.id) == Some(self.id) {
                in_flight.remove(self.key);
            }
        }
    }
}

/// Cache that runs at most one computation per key at a time within this
/// process and shares its outcome with every concurrent caller.
///
/// Store failures never fail a request: reads degrade to a miss and writes
/// degrade to "uncached". Computation failures are delivered to the leader
/// and every joiner alike and are never cached.
pub struct SingleFlightCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SingleFlightCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SingleFlightCache<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_instance_id(store, crate::config::default_instance_id())
    }

    pub fn with_instance_id(store: Arc<dyn CacheStore>, instance_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                in_flight: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                instance_id: instance_id.into(),
                stats: AtomicStats::default(),
            }),
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.inner.instance_id
    }

    pub fn store_name(&self) -> &'static str {
        self.inner.store.name()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats.to_stats()
    }

    /// Number of computations currently registered.
    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Return the cached value for `key`, or compute it once.
    ///
    /// `ttl` is converted to whole seconds, truncating toward zero. The
    /// computation runs on a spawned task so it settles (and releases its
    /// registry slot) even if the calling future is dropped. It stays inside
    /// the leader's current span whichever task ends up polling it.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &str,
        compute: F,
        ttl: Duration,
    ) -> Result<CacheResult<T>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let start = Instant::now();

        if let Some(data) = self.lookup(key, start).await {
            return Ok(CacheResult::hit(data));
        }

        let (computation, leader) = {
            let mut in_flight = self.inner.in_flight.lock().map_err(|_| {
                Error::runtime_with_context(
                    "in-flight registry poisoned",
                    ErrorContext::new().with_source("single_flight"),
                )
            })?;
            match in_flight.get(key).map(|f| f.computation.clone()) {
                Some(existing) => (existing, false),
                None => {
                    let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
                    let computation = settle(
                        Arc::clone(&self.inner),
                        key.to_string(),
                        id,
                        compute,
                        ttl,
                    )
                    // Whichever task polls the shared future runs in the leader's span.
                    .instrument(Span::current())
                    .boxed()
                    .shared();
                    in_flight.insert(
                        key.to_string(),
                        InFlight {
                            id,
                            computation: computation.clone(),
                        },
                    );
                    (computation, true)
                }
            }
        };

        if leader {
            AtomicStats::bump(&self.inner.stats.misses);
            info!(
                cache_key = key,
                cache_hit = false,
                latency_ms = start.elapsed().as_millis() as u64,
                "Cache MISS"
            );
            tokio::spawn(computation.clone());
            computation.await.map(CacheResult::computed)
        } else {
            AtomicStats::bump(&self.inner.stats.coalesced);
            info!(
                cache_key = key,
                coalesced = true,
                "Request coalesced, awaiting in-flight computation"
            );
            computation.await.map(CacheResult::coalesced)
        }
    }

    /// Delete the stored entry and forget any in-flight computation for `key`.
    ///
    /// An already running computation is not cancelled and will still write
    /// its result when it finishes. Returns whether the store removed a key;
    /// store errors are logged and reported as `false`.
    pub async fn invalidate(&self, key: &str) -> bool {
        let removed = match self.inner.store.delete(key).await {
            Ok(removed) => removed,
            Err(e) => {
                AtomicStats::bump(&self.inner.stats.store_errors);
                error!(cache_key = key, error = %e, "Error deleting cache entry");
                false
            }
        };
        if let Ok(mut in_flight) = self.inner.in_flight.lock() {
            in_flight.remove(key);
        }
        debug!(cache_key = key, removed, "Cache entry invalidated");
        removed
    }

    async fn lookup(&self, key: &str, start: Instant) -> Option<T> {
        let raw = match self.inner.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                AtomicStats::bump(&self.inner.stats.store_errors);
                error!(cache_key = key, error = %e, "Error reading from cache");
                return None;
            }
        };
        match serde_json::from_str::<CachedEntry<T>>(&raw) {
            Ok(entry) => {
                AtomicStats::bump(&self.inner.stats.hits);
                info!(
                    cache_key = key,
                    cache_hit = true,
                    latency_ms = start.elapsed().as_millis() as u64,
                    cached_at = entry.metadata.cached_at.as_str(),
                    original_instance_id = entry.metadata.instance_id.as_str(),
                    instance_id = self.inner.instance_id.as_str(),
                    "Cache HIT"
                );
                Some(entry.data)
            }
            Err(e) => {
                AtomicStats::bump(&self.inner.stats.store_errors);
                warn!(cache_key = key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }
}

async fn settle<T, F, Fut>(
    inner: Arc<Inner<T>>,
    key: String,
    id: u64,
    compute: F,
    ttl: Duration,
) -> Result<T>
where
    T: Serialize + Send + Sync + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let _release = Release {
        inner: &inner,
        key: &key,
        id,
    };
    AtomicStats::bump(&inner.stats.computations);

    let outcome = compute().await;
    match &outcome {
        Ok(data) => persist(&inner, &key, data, ttl).await,
        Err(e) => {
            AtomicStats::bump(&inner.stats.failures);
            warn!(cache_key = key.as_str(), error = %e, "Computation failed, nothing cached");
        }
    }
    outcome
}

async fn persist<T: Serialize>(inner: &Inner<T>, key: &str, data: &T, ttl: Duration) {
    let ttl_seconds = ttl.as_secs();
    let entry = CachedEntry::new(data, inner.instance_id.as_str());
    let written = match serde_json::to_string(&entry) {
        Ok(raw) => inner.store.set(key, &raw, Some(ttl_seconds)).await,
        Err(e) => Err(e.into()),
    };
    match written {
        Ok(()) => {
            AtomicStats::bump(&inner.stats.stores);
            info!(
                cache_key = key,
                ttl_seconds,
                instance_id = inner.instance_id.as_str(),
                "Cached result"
            );
        }
        Err(e) => {
            AtomicStats::bump(&inner.stats.store_errors);
            error!(cache_key = key, error = %e, "Error storing to cache");
        }
    }
}
