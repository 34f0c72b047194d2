//! 类型模块：解释结果的强类型表示。
//!
//! # Types Module
//!
//! Strongly-typed results produced from loosely typed upstream output.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`WordExplanation`] | Meaning, synonyms, antonyms, simplified explanation |
//! | [`Explanation`] | A [`WordExplanation`] plus its canonical cache key |
//!
//! ## Example
//!
//! ```rust
//! use word_explain::structured::ResponseRecoveryParser;
//! use word_explain::types::WordExplanation;
//!
//! let raw = ResponseRecoveryParser::new()
//!     .recover_object(r#"{"meaning": "to examine", "antonyms": "n/a"}"#)
//!     .unwrap();
//! let explanation = WordExplanation::from_raw(&raw);
//! assert_eq!(explanation.meaning, "to examine");
//! assert!(explanation.antonyms.is_empty());
//! ```

pub mod explanation;

pub use explanation::{Explanation, WordExplanation, NO_EXPLANATION, NO_MEANING};
