//! 输入校验：在缓存和上游之前拒绝无效的词语/上下文。
//!
//! Input validation gate.

use crate::error_code::StandardErrorCode;
use crate::{Error, ErrorContext, Result};

/// Maximum subject length in UTF-16 code units (1-3 words, compound/hyphenated terms).
pub const MAX_WORD_CHARS: usize = 64;
/// Maximum context length in UTF-16 code units (~300-400 words).
pub const MAX_CONTEXT_CHARS: usize = 2000;

fn reject(message: &str, code: StandardErrorCode, field: &str, details: Option<String>) -> Error {
    let mut context = ErrorContext::new()
        .with_field_path(field)
        .with_source("input_validator");
    if let Some(details) = details {
        context = context.with_details(details);
    }
    Error::validation_with_context(message, code, context)
}

/// Validate a `(word, context)` pair before any key derivation or I/O.
///
/// Containment is checked case-sensitively on the original text. Lengths are
/// UTF-16 code units, so characters outside the Basic Multilingual Plane
/// (most emoji) count twice.
pub fn validate_explain_input(word: &str, context: &str) -> Result<()> {
    if word.is_empty() || context.is_empty() {
        let field = if word.is_empty() { "word" } else { "context" };
        return Err(reject(
            "Word and context must be provided",
            StandardErrorCode::InvalidRequest,
            field,
            None,
        ));
    }

    if !context.contains(word) {
        return Err(reject(
            "Context must include the word to be explained",
            StandardErrorCode::InvalidRequest,
            "context",
            None,
        ));
    }

    let word_chars = word.encode_utf16().count();
    if word_chars > MAX_WORD_CHARS {
        return Err(reject(
            "Word is too long (max 64 characters, 1-3 words)",
            StandardErrorCode::RequestTooLarge,
            "word",
            Some(format!("{} characters", word_chars)),
        ));
    }

    let context_chars = context.encode_utf16().count();
    if context_chars > MAX_CONTEXT_CHARS {
        return Err(reject(
            "Context is too long (max 2000 characters, ~300-400 words)",
            StandardErrorCode::RequestTooLarge,
            "context",
            Some(format!("{} characters", context_chars)),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_of(word: &str, context: &str) -> StandardErrorCode {
        validate_explain_input(word, context).unwrap_err().code()
    }

    #[test]
    fn test_accepts_valid_pair() {
        assert!(validate_explain_input("scrutinize", "I need to scrutinize the data carefully.").is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(code_of("", "context"), StandardErrorCode::InvalidRequest);
        assert_eq!(code_of("word", ""), StandardErrorCode::InvalidRequest);
    }

    #[test]
    fn test_containment_is_case_sensitive() {
        assert!(validate_explain_input("Data", "the data set").is_err());
        assert!(validate_explain_input("data", "the data set").is_ok());
    }

    #[test]
    fn test_length_limits() {
        let word = "a".repeat(65);
        let context = format!("{} tail", word);
        assert_eq!(code_of(&word, &context), StandardErrorCode::RequestTooLarge);

        let word = "a".repeat(64);
        assert!(validate_explain_input(&word, &word).is_ok());

        let context = format!("word {}", "x".repeat(2000));
        let err = validate_explain_input("word", &context).unwrap_err();
        assert_eq!(err.code(), StandardErrorCode::RequestTooLarge);
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("context")
        );
    }

    #[test]
    fn test_lengths_count_utf16_units_not_bytes() {
        // 64 two-byte characters: 128 bytes, one UTF-16 unit each.
        let word = "é".repeat(64);
        assert!(validate_explain_input(&word, &word).is_ok());
    }

    #[test]
    fn test_astral_characters_count_twice() {
        // 1500 emoji: 1500 chars, 3000 UTF-16 units.
        let context = format!("a{}", "\u{1F600}".repeat(1500));
        assert_eq!(code_of("a", &context), StandardErrorCode::RequestTooLarge);

        // 33 emoji: 66 UTF-16 units against a limit of 64.
        let word = "\u{1F600}".repeat(33);
        assert_eq!(code_of(&word, &word), StandardErrorCode::RequestTooLarge);
        let word = "\u{1F600}".repeat(32);
        assert!(validate_explain_input(&word, &word).is_ok());
    }
}
