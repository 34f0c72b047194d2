//! Canonical cache key derivation.

use word_explain::cache::CacheKeyGenerator;

#[test]
fn test_reference_key() {
    let key = CacheKeyGenerator::new().cache_key(
        "scrutinize",
        "I need to scrutinize the data carefully.",
    );
    assert_eq!(
        key.as_str(),
        "explain:scrutinize:a85ab963085966dfe2a70a7d735690850363972dc6cc320cc198bb4b945d6856"
    );
}

#[test]
fn test_case_and_whitespace_variants_collide() {
    let keys = CacheKeyGenerator::new();
    let canonical = keys.cache_key("scrutinize", "I need to scrutinize the data carefully.");
    let variants = [
        ("Scrutinize", "I need to scrutinize the data carefully."),
        ("  SCRUTINIZE ", "i need to scrutinize the data carefully."),
        ("scrutinize", "  I need\tto scrutinize\n\nthe data   carefully.  "),
    ];
    for (subject, context) in variants {
        assert_eq!(keys.cache_key(subject, context), canonical, "{subject:?} / {context:?}");
    }
}

#[test]
fn test_different_content_does_not_collide() {
    let keys = CacheKeyGenerator::new();
    let a = keys.cache_key("scrutinize", "I need to scrutinize the data carefully.");
    assert_ne!(a, keys.cache_key("scrutinize", "I need to scrutinize the data."));
    assert_ne!(a, keys.cache_key("data", "I need to scrutinize the data carefully."));
    // Punctuation is content, not layout.
    assert_ne!(a, keys.cache_key("scrutinize", "I need to scrutinize the data carefully"));
}

#[test]
fn test_multi_word_subject_is_collapsed() {
    let key = CacheKeyGenerator::new().cache_key("  Machine \t Learning ", "machine learning");
    assert!(key.as_str().starts_with("explain:machine learning:"));
}

#[test]
fn test_key_is_deterministic() {
    let a = CacheKeyGenerator::new().cache_key("word", "some word here");
    let b = CacheKeyGenerator::new().cache_key("word", "some word here");
    assert_eq!(a.to_string(), b.to_string());
}
