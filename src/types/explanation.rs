//! Explanation result types.

use crate::cache::CacheKey;
use crate::structured::RawObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const NO_MEANING: &str = "No meaning available";
pub const NO_EXPLANATION: &str = "No explanation available";

/// Typed result of one upstream explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordExplanation {
    pub meaning: String,
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
    pub simplified_explanation: String,
}

impl WordExplanation {
    /// Total mapping from a recovered object.
    ///
    /// Strings fall back to fixed placeholders and arrays to empty when the
    /// field is missing or has the wrong type. Non-string array elements are
    /// dropped.
    pub fn from_raw(raw: &RawObject) -> Self {
        Self {
            meaning: string_field(raw, "meaning").unwrap_or_else(|| NO_MEANING.to_string()),
            synonyms: string_list_field(raw, "synonyms"),
            antonyms: string_list_field(raw, "antonyms"),
            simplified_explanation: string_field(raw, "simplifiedExplanation")
                .unwrap_or_else(|| NO_EXPLANATION.to_string()),
        }
    }

    pub fn with_cache_key(self, cache_key: CacheKey) -> Explanation {
        Explanation {
            meaning: self.meaning,
            synonyms: self.synonyms,
            antonyms: self.antonyms,
            simplified_explanation: self.simplified_explanation,
            cache_key: cache_key.into_string(),
        }
    }
}

fn string_field(raw: &RawObject, name: &str) -> Option<String> {
    raw.get(name).and_then(Value::as_str).map(str::to_string)
}

fn string_list_field(raw: &RawObject, name: &str) -> Vec<String> {
    let Some(items) = raw.get(name).and_then(Value::as_array) else {
        return Vec::new();
    };
    let kept: Vec<String> = items
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    let dropped = items.len() - kept.len();
    if dropped > 0 {
        debug!(field = name, dropped, "Dropped non-string array items");
    }
    kept
}

/// Result exposed upward: the explanation plus its canonical cache key, so
/// clients can micro-cache on their side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub meaning: String,
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
    pub simplified_explanation: String,
    pub cache_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> RawObject {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_complete_object_maps_verbatim() {
        let raw = obj(json!({
            "meaning": "to examine closely",
            "synonyms": ["inspect", "study"],
            "antonyms": ["ignore"],
            "simplifiedExplanation": "look very carefully"
        }));
        let e = WordExplanation::from_raw(&raw);
        assert_eq!(e.meaning, "to examine closely");
        assert_eq!(e.synonyms, vec!["inspect", "study"]);
        assert_eq!(e.antonyms, vec!["ignore"]);
        assert_eq!(e.simplified_explanation, "look very carefully");
    }

    #[test]
    fn test_defaults_for_missing_and_mistyped_fields() {
        let raw = obj(json!({
            "meaning": 42,
            "synonyms": "inspect",
        }));
        let e = WordExplanation::from_raw(&raw);
        assert_eq!(e.meaning, NO_MEANING);
        assert!(e.synonyms.is_empty());
        assert!(e.antonyms.is_empty());
        assert_eq!(e.simplified_explanation, NO_EXPLANATION);
    }

    #[test]
    fn test_non_string_array_items_dropped() {
        let raw = obj(json!({"synonyms": ["a", 1, null, "b"]}));
        assert_eq!(WordExplanation::from_raw(&raw).synonyms, vec!["a", "b"]);
    }

    #[test]
    fn test_list_field_edge_shapes() {
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry());
        let raw = obj(json!({"synonyms": [1, {"x": 2}, []], "antonyms": "none"}));
        let parsed = WordExplanation::from_raw(&raw);
        assert!(parsed.synonyms.is_empty());
        assert!(parsed.antonyms.is_empty());

        let raw = obj(json!({"antonyms": ["a", "b"]}));
        assert_eq!(WordExplanation::from_raw(&raw).antonyms, vec!["a", "b"]);
    }

    #[test]
    fn test_explanation_serializes_camel_case() {
        let e = WordExplanation::from_raw(&RawObject::new())
            .with_cache_key(CacheKey::new("explain:w:abc"));
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["cacheKey"], "explain:w:abc");
        assert_eq!(v["simplifiedExplanation"], NO_EXPLANATION);
    }
}
