//! Persisted cache entries and per-call cache outcomes.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Provenance attached to every persisted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    /// Instance that computed the value.
    pub instance_id: String,
    /// RFC 3339 / ISO-8601 timestamp, e.g. `2024-07-01T12:34:56.789Z`.
    pub cached_at: String,
}

impl CacheMetadata {
    pub fn now(instance_id: impl Into<String>) -> Self {
        Self::at(instance_id, Utc::now())
    }

    pub fn at(instance_id: impl Into<String>, when: DateTime<Utc>) -> Self {
        Self {
            instance_id: instance_id.into(),
            cached_at: when.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Parsed `cached_at`, if it is a valid timestamp.
    pub fn cached_at_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.cached_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Wire shape stored under a cache key: `{ data, metadata }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry<T> {
    pub data: T,
    pub metadata: CacheMetadata,
}

impl<T> CachedEntry<T> {
    pub fn new(data: T, instance_id: impl Into<String>) -> Self {
        Self {
            data,
            metadata: CacheMetadata::now(instance_id),
        }
    }
}

/// What one `get_or_compute` call observed. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheResult<T> {
    pub data: T,
    /// Served from the store.
    pub cache_hit: bool,
    /// Joined a computation started by another caller.
    pub coalesced: bool,
}

impl<T> CacheResult<T> {
    pub fn hit(data: T) -> Self {
        Self {
            data,
            cache_hit: true,
            coalesced: false,
        }
    }
    pub fn computed(data: T) -> Self {
        Self {
            data,
            cache_hit: false,
            coalesced: false,
        }
    }
    pub fn coalesced(data: T) -> Self {
        Self {
            data,
            cache_hit: false,
            coalesced: true,
        }
    }
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheResult<U> {
        CacheResult {
            data: f(self.data),
            cache_hit: self.cache_hit,
            coalesced: self.coalesced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_wire_shape() {
        let when = Utc.with_ymd_and_hms(2024, 7, 1, 12, 34, 56).unwrap();
        let entry = CachedEntry {
            data: "cache me".to_string(),
            metadata: CacheMetadata::at("instance-1", when),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["data"], "cache me");
        assert_eq!(json["metadata"]["instanceId"], "instance-1");
        assert_eq!(json["metadata"]["cachedAt"], "2024-07-01T12:34:56.000Z");
    }

    #[test]
    fn test_cached_at_parses_back() {
        let meta = CacheMetadata::now("i");
        assert!(meta.cached_at_time().is_some());
        let broken = CacheMetadata {
            instance_id: "i".into(),
            cached_at: "yesterday".into(),
        };
        assert!(broken.cached_at_time().is_none());
    }

    #[test]
    fn test_result_constructors() {
        let r = CacheResult::coalesced(1).map(|v| v + 1);
        assert_eq!(r.data, 2);
        assert!(r.coalesced);
        assert!(!r.cache_hit);
        assert!(CacheResult::hit(()).cache_hit);
    }
}
