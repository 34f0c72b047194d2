//! Best-effort recovery of a JSON object from unreliable model output.
//!
//! Models asked for "only JSON" still wrap the object in prose, or stop
//! generating before the final closing braces. Recovery runs three ordered
//! passes and stops at the first one that yields an object:
//!
//! 1. **Direct**: the whole trimmed text parses as an object.
//! 2. **Extracted**: the text from the first `{` to the end parses.
//! 3. **Repaired**: the extracted text has more `{` than `}`; the missing
//!    closing braces are appended and the text is parsed once more.
//!
//! None of the passes fail loudly; malformed input only ever produces
//! [`None`].

use serde_json::{Map, Value};

/// Loosely typed object produced by recovery.
pub type RawObject = Map<String, Value>;

/// Which pass produced the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoveryPass {
    Direct,
    Extracted,
    /// Closing braces were appended.
    Repaired { appended: usize },
}

impl RecoveryPass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryPass::Direct => "direct",
            RecoveryPass::Extracted => "extracted",
            RecoveryPass::Repaired { .. } => "repaired",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub pass: RecoveryPass,
    pub object: RawObject,
}

/// Stateless recovery parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseRecoveryParser;

impl ResponseRecoveryParser {
    pub fn new() -> Self {
        Self
    }

    /// Run the recovery passes; `None` means the text is unrecoverable.
    pub fn recover(&self, text: &str) -> Option<Recovered> {
        if let Some(object) = try_parse_object(text.trim()) {
            return Some(Recovered {
                pass: RecoveryPass::Direct,
                object,
            });
        }

        let start = text.find('{')?;
        let sliced = text[start..].trim();
        if let Some(object) = try_parse_object(sliced) {
            return Some(Recovered {
                pass: RecoveryPass::Extracted,
                object,
            });
        }

        let opens = sliced.matches('{').count();
        let closes = sliced.matches('}').count();
        if opens <= closes {
            return None;
        }
        let appended = opens - closes;
        let repaired = format!("{}{}", sliced, "}".repeat(appended));
        try_parse_object(&repaired).map(|object| Recovered {
            pass: RecoveryPass::Repaired { appended },
            object,
        })
    }

    /// Convenience wrapper returning only the object.
    pub fn recover_object(&self, text: &str) -> Option<RawObject> {
        self.recover(text).map(|r| r.object)
    }
}

/// Parse `text` as JSON; anything other than an object counts as failure.
fn try_parse_object(text: &str) -> Option<RawObject> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
