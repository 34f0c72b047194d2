//! Cache key generation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Namespace prefix for explanation keys.
pub const EXPLAIN_NAMESPACE: &str = "explain";

/// Canonical cache key: `<namespace>:<normalized-subject>:<sha256-hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Derives stable keys from free-form text.
///
/// Two inputs that only differ in case or whitespace layout map to the same
/// key; the context is hashed so keys stay bounded in length, while the
/// subject is kept readable.
#[derive(Debug, Clone)]
pub struct CacheKeyGenerator {
    namespace: String,
}

impl CacheKeyGenerator {
    pub fn new() -> Self {
        Self {
            namespace: EXPLAIN_NAMESPACE.to_string(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Collapse whitespace runs to one space, trim, lowercase.
    pub fn normalize(text: &str) -> String {
        text.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// SHA-256 of the normalized text as 64 lowercase hex characters.
    pub fn fingerprint(text: &str) -> String {
        let normalized = Self::normalize(text);
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    pub fn cache_key(&self, subject: &str, context: &str) -> CacheKey {
        CacheKey::new(format!(
            "{}:{}:{}",
            self.namespace,
            Self::normalize(subject),
            Self::fingerprint(context)
        ))
    }
}

impl Default for CacheKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_hex64(s: &str) -> bool {
        s.len() == 64 && s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    #[test]
    fn test_normalize() {
        assert_eq!(CacheKeyGenerator::normalize(" Hello\tWORLD "), "hello world");
        assert_eq!(
            CacheKeyGenerator::normalize("  Hello\n\t  WORLD   from   Rust  "),
            "hello world from rust"
        );
        assert_eq!(CacheKeyGenerator::normalize("   "), "");
        assert_eq!(CacheKeyGenerator::normalize(""), "");
    }

    #[test]
    fn test_fingerprint_known_digest() {
        // sha256("")
        assert_eq!(
            CacheKeyGenerator::fingerprint("  \n "),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        // sha256("abc")
        assert_eq!(
            CacheKeyGenerator::fingerprint(" ABC "),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_fingerprint_equivalence() {
        let a = CacheKeyGenerator::fingerprint("  The QUICK\n brown\tfox  ");
        let b = CacheKeyGenerator::fingerprint("the quick brown fox");
        let c = CacheKeyGenerator::fingerprint("the quick brown fox jumps");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(is_hex64(&a));
    }

    #[test]
    fn test_cache_key_format() {
        let key = CacheKeyGenerator::new().cache_key("  TeStWoRd  ", "Context paragraph");
        let rest = key.as_str().strip_prefix("explain:testword:").unwrap();
        assert!(is_hex64(rest));
    }

    #[test]
    fn test_cache_key_stable_across_layout() {
        let gen = CacheKeyGenerator::new();
        assert_eq!(
            gen.cache_key("Word", "  Some\n\tContext  "),
            gen.cache_key(" word ", "some context")
        );
    }

    #[test]
    fn test_custom_namespace() {
        let key = CacheKeyGenerator::new()
            .with_namespace("define")
            .cache_key("x", "x");
        assert!(key.as_str().starts_with("define:x:"));
    }
}
