//! 单飞缓存模块：规范化缓存键、可插拔存储与并发请求合并。
//!
//! # Caching Module
//!
//! This module puts a shared key-value store in front of a slow computation
//! and guarantees that concurrently arriving identical requests trigger at
//! most one computation per process.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheKeyGenerator`] | Canonical `explain:<subject>:<sha256>` keys from free-form text |
//! | [`CacheStore`] | Trait for the distributed get/set(ttl)/delete store |
//! | [`MemoryStore`] | In-process store with per-entry expiry |
//! | [`NullStore`] | No-op store (coalescing only) |
//! | [`SingleFlightCache`] | Lookup, coalescing, and persistence of computed values |
//! | [`CachedEntry`] | Persisted `{ data, metadata }` wire shape |
//! | [`CacheResult`] | Per-call outcome: `cache_hit` / `coalesced` flags |
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use word_explain::cache::{MemoryStore, SingleFlightCache};
//!
//! # async fn demo() -> word_explain::Result<()> {
//! let cache: SingleFlightCache<String> =
//!     SingleFlightCache::new(Arc::new(MemoryStore::new()));
//!
//! let first = cache
//!     .get_or_compute("k", || async { Ok("value".to_string()) }, Duration::from_secs(3600))
//!     .await?;
//! assert!(!first.cache_hit);
//!
//! let second = cache
//!     .get_or_compute("k", || async { Ok("other".to_string()) }, Duration::from_secs(3600))
//!     .await?;
//! assert!(second.cache_hit);
//! assert_eq!(second.data, "value");
//! # Ok(())
//! # }
//! ```
//!
//! With the `redis` feature enabled, [`RedisStore`] shares entries across
//! every instance of the service. Coalescing stays process-local.

mod backend;
mod entry;
mod key;
mod single_flight;

#[cfg(feature = "redis")]
pub use backend::RedisStore;
pub use backend::{CacheStore, MemoryStore, NullStore};
pub use entry::{CacheMetadata, CacheResult, CachedEntry};
pub use key::{CacheKey, CacheKeyGenerator, EXPLAIN_NAMESPACE};
pub use single_flight::{CacheStats, SingleFlightCache};
