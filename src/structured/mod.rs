//! Structured output recovery for word-explain.
//!
//! Upstream text is *expected* to be a JSON object but frequently is not:
//! - `ResponseRecoveryParser`: three ordered passes (direct, extracted, repaired)
//! - `Recovered`: the object plus the pass that produced it
//! - `RawObject`: loosely typed key/value map handed to typed mapping
//!
//! # Examples
//!
//! ```
//! use word_explain::structured::{RecoveryPass, ResponseRecoveryParser};
//!
//! let parser = ResponseRecoveryParser::new();
//! let recovered = parser
//!     .recover(r#"Here you go: {"meaning": "to examine", "synonyms": ["inspect"]"#)
//!     .unwrap();
//!
//! assert_eq!(recovered.pass, RecoveryPass::Repaired { appended: 1 });
//! assert_eq!(recovered.object["meaning"], "to examine");
//! assert!(parser.recover("not json at all").is_none());
//! ```

pub mod recovery;

pub use recovery::{RawObject, Recovered, RecoveryPass, ResponseRecoveryParser};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_pass_names() {
        assert_eq!(RecoveryPass::Direct.as_str(), "direct");
        assert_eq!(RecoveryPass::Extracted.as_str(), "extracted");
        assert_eq!(RecoveryPass::Repaired { appended: 3 }.as_str(), "repaired");
    }
}
