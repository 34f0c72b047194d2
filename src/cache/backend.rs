//! Cache store implementations.

use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

#[derive(Clone)]
struct StoredValue {
    data: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn new(data: String, ttl_seconds: Option<u64>) -> Self {
        // A TTL too large to represent as an instant never expires.
        let expires_at = ttl_seconds
            .filter(|s| *s > 0)
            .and_then(|s| Instant::now().checked_add(Duration::from_secs(s)));
        Self { data, expires_at }
    }
    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| Instant::now() >= at)
            .unwrap_or(false)
    }
}

/// Distributed key-value store primitive.
///
/// Implementations are expected to be atomic per key; no cross-key
/// transactions are assumed. A `ttl_seconds` of `None` (or zero) means the
/// entry never expires.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()>;
    /// Returns `true` iff a key was actually removed.
    async fn delete(&self, key: &str) -> Result<bool>;
    fn name(&self) -> &'static str;
}

fn poisoned() -> Error {
    Error::cache_store_with_context(
        "MemoryStore lock poisoned",
        ErrorContext::new().with_source("memory_store"),
    )
}

/// Process-local store, mainly for single-instance deployments and tests.
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoredValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.values().filter(|e| !e.is_expired()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if let Some(entry) = entries.get(key) {
            if entry.is_expired() {
                entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.data.clone()));
        }
        Ok(None)
    }
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.retain(|_, e| !e.is_expired());
        entries.insert(key.to_string(), StoredValue::new(value.to_string(), ttl_seconds));
        Ok(())
    }
    async fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        Ok(entries.remove(key).map(|e| !e.is_expired()).unwrap_or(false))
    }
    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Store that never holds anything; disables caching but keeps coalescing.
pub struct NullStore;
impl NullStore {
    pub fn new() -> Self {
        Self
    }
}
impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for NullStore {
    async fn get(&self, _: &str) -> Result<Option<String>> {
        Ok(None)
    }
    async fn set(&self, _: &str, _: &str, _: Option<u64>) -> Result<()> {
        Ok(())
    }
    async fn delete(&self, _: &str) -> Result<bool> {
        Ok(false)
    }
    fn name(&self) -> &'static str {
        "null"
    }
}

#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

#[cfg(feature = "redis")]
mod redis_store {
    use super::CacheStore;
    use crate::{Error, ErrorContext, Result};
    use async_trait::async_trait;
    use redis::aio::ConnectionManager;
    use redis::AsyncCommands;

    fn store_error(op: &str, key: &str, e: redis::RedisError) -> Error {
        Error::cache_store_with_context(
            format!("Redis {} failed: {}", op, e),
            ErrorContext::new()
                .with_field_path(key)
                .with_source("redis_store"),
        )
    }

    /// Redis-backed store shared by every instance of the service.
    #[derive(Clone)]
    pub struct RedisStore {
        conn: ConnectionManager,
    }

    impl RedisStore {
        /// Connect to `url`; `password` overrides any password embedded in the URL.
        pub async fn connect(url: &str, password: Option<&str>) -> Result<Self> {
            let mut info = redis::IntoConnectionInfo::into_connection_info(url).map_err(|e| {
                Error::configuration_with_context(
                    format!("Invalid Redis URL: {}", e),
                    ErrorContext::new()
                        .with_field_path("REDIS_URL")
                        .with_source("redis_store"),
                )
            })?;
            if let Some(pw) = password {
                info.redis.password = Some(pw.to_string());
            }
            let client = redis::Client::open(info).map_err(|e| store_error("open", "REDIS_URL", e))?;
            let conn = ConnectionManager::new(client)
                .await
                .map_err(|e| store_error("connect", "REDIS_URL", e))?;
            tracing::info!(backend = "redis", "Redis store connected");
            Ok(Self { conn })
        }
    }

    #[async_trait]
    impl CacheStore for RedisStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            let mut conn = self.conn.clone();
            conn.get::<_, Option<String>>(key)
                .await
                .map_err(|e| store_error("GET", key, e))
        }
        async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()> {
            let mut conn = self.conn.clone();
            match ttl_seconds.filter(|s| *s > 0) {
                Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await,
                None => conn.set::<_, _, ()>(key, value).await,
            }
            .map_err(|e| store_error("SET", key, e))
        }
        async fn delete(&self, key: &str) -> Result<bool> {
            let mut conn = self.conn.clone();
            let removed: u64 = conn.del(key).await.map_err(|e| store_error("DEL", key, e))?;
            Ok(removed > 0)
        }
        fn name(&self) -> &'static str {
            "redis"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "v", Some(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_delete_reports_removal() {
        let store = MemoryStore::new();
        store.set("k", "v", None).await.unwrap();
        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_zero_ttl_never_expires() {
        let store = MemoryStore::new();
        store.set("k", "v", Some(0)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_memory_store_entry_expires_after_ttl() {
        let store = MemoryStore::new();
        store.set("short", "v", Some(1)).await.unwrap();
        store.set("long", "v", Some(3600)).await.unwrap();
        assert_eq!(store.get("short").await.unwrap(), Some("v".to_string()));

        // Expiry is measured on the monotonic clock, so this needs real time.
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(store.get("long").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_memory_store_huge_ttl_does_not_overflow() {
        let store = MemoryStore::new();
        store.set("k", "v", Some(u64::MAX)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_null_store_always_misses() {
        let store = NullStore::new();
        store.set("k", "v", Some(10)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(!store.delete("k").await.unwrap());
        assert_eq!(store.name(), "null");
    }
}
