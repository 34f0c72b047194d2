use crate::error_code::StandardErrorCode;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "context", "OLLAMA_TIMEOUT")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., limit, actual length)
    pub details: Option<String>,
    /// Source of the error (e.g., "input_validator", "single_flight")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the explanation runtime.
///
/// `Clone` because one computation's outcome is handed to every caller that
/// joined it while it was in flight.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Bad input. Fails fast; never cached, never retried.
    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        code: StandardErrorCode,
        context: ErrorContext,
    },

    /// A single upstream attempt failed (transport, timeout, or unparseable text).
    /// Only observed inside the retry loop.
    #[error("Upstream attempt {attempt} failed ({code}): {message}")]
    TransientUpstream {
        attempt: u32,
        code: StandardErrorCode,
        message: String,
    },

    /// All attempts exhausted. `last_error` is for server-side logs only and is
    /// deliberately absent from the display form.
    #[error("Upstream service could not produce an answer ({code}, incident {incident_id})")]
    TerminalUpstream {
        incident_id: String,
        attempts: u32,
        code: StandardErrorCode,
        last_error: String,
    },

    /// Distributed store failure. Logged and swallowed by the cache layer.
    #[error("Cache store error: {message}{}", format_context(.context))]
    CacheStore {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Runtime error: {message}{}", format_context(.context))]
    Runtime {
        message: String,
        context: ErrorContext,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(
        msg: impl Into<String>,
        code: StandardErrorCode,
        context: ErrorContext,
    ) -> Self {
        Error::Validation {
            message: msg.into(),
            code,
            context,
        }
    }

    /// Create a new cache store error with structured context
    pub fn cache_store_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::CacheStore {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new runtime error with structured context
    pub fn runtime_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Runtime {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Validation { context, .. }
            | Error::CacheStore { context, .. }
            | Error::Configuration { context, .. }
            | Error::Runtime { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Stable error code for this error.
    pub fn code(&self) -> StandardErrorCode {
        match self {
            Error::Validation { code, .. }
            | Error::TransientUpstream { code, .. }
            | Error::TerminalUpstream { code, .. } => *code,
            Error::CacheStore { .. } => StandardErrorCode::CacheUnavailable,
            Error::Configuration { .. } | Error::Serialization(_) | Error::Runtime { .. } => {
                StandardErrorCode::Unknown
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    pub fn is_terminal_upstream(&self) -> bool {
        matches!(self, Error::TerminalUpstream { .. })
    }
}
