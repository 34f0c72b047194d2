//! 标准错误码：为每类失败提供稳定的错误码与重试语义。
//!
//! Standard error codes.
//!
//! Every [`crate::Error`] maps to one of these codes so that callers (and
//! whatever transport sits above this crate) can tell "your input was invalid"
//! apart from "no answer could be computed" without parsing messages.
//!
//! ## Error Code Categories
//!
//! | Prefix | Category | Description                               |
//! |--------|----------|-------------------------------------------|
//! | E1xxx  | client   | Request-side errors (validation)          |
//! | E3xxx  | server   | Upstream generation service errors        |
//! | E5xxx  | cache    | Distributed store errors (never surfaced) |
//! | E9xxx  | unknown  | Catch-all / unclassified                  |
//!
//! ## Example
//!
//! ```rust
//! use word_explain::error_code::StandardErrorCode;
//!
//! let code = StandardErrorCode::from_http_status(504);
//! assert_eq!(code.code(), "E3003");
//! assert!(code.retryable());
//! assert_eq!(code.category(), "server");
//! ```

use std::fmt;

/// Standard error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardErrorCode {
    /// E1001: Missing subject/context, or context does not contain the subject
    InvalidRequest,
    /// E1005: Subject or context exceeds its length limit
    RequestTooLarge,
    /// E3001: Upstream failed or could not be reached
    ServerError,
    /// E3002: Upstream temporarily overloaded
    Overloaded,
    /// E3003: Upstream did not answer within the per-attempt timeout
    Timeout,
    /// E3004: Upstream answered with text no recovery pass could parse
    UnparseableResponse,
    /// E5001: Distributed store read/write/delete failed
    CacheUnavailable,
    /// E9999: Error could not be classified
    Unknown,
}

impl StandardErrorCode {
    /// Returns the canonical code string (e.g., `"E1001"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "E1001",
            Self::RequestTooLarge => "E1005",
            Self::ServerError => "E3001",
            Self::Overloaded => "E3002",
            Self::Timeout => "E3003",
            Self::UnparseableResponse => "E3004",
            Self::CacheUnavailable => "E5001",
            Self::Unknown => "E9999",
        }
    }

    /// Returns the standard name (e.g., `"invalid_request"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::RequestTooLarge => "request_too_large",
            Self::ServerError => "server_error",
            Self::Overloaded => "overloaded",
            Self::Timeout => "timeout",
            Self::UnparseableResponse => "unparseable_response",
            Self::CacheUnavailable => "cache_unavailable",
            Self::Unknown => "unknown",
        }
    }

    /// Returns whether a single attempt failing with this code is worth retrying.
    #[inline]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::ServerError | Self::Overloaded | Self::Timeout | Self::UnparseableResponse
        )
    }

    /// Returns the category: `"client"`, `"server"`, `"cache"`, or `"unknown"`.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidRequest | Self::RequestTooLarge => "client",
            Self::ServerError | Self::Overloaded | Self::Timeout | Self::UnparseableResponse => {
                "server"
            }
            Self::CacheUnavailable => "cache",
            Self::Unknown => "unknown",
        }
    }

    /// Maps an upstream HTTP status code to the most likely `StandardErrorCode`.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            408 | 504 => Self::Timeout,
            429 | 503 => Self::Overloaded,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for StandardErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_codes_are_not_retryable() {
        assert!(!StandardErrorCode::InvalidRequest.retryable());
        assert!(!StandardErrorCode::RequestTooLarge.retryable());
        assert_eq!(StandardErrorCode::InvalidRequest.category(), "client");
    }

    #[test]
    fn test_upstream_codes_are_retryable() {
        for code in [
            StandardErrorCode::ServerError,
            StandardErrorCode::Overloaded,
            StandardErrorCode::Timeout,
            StandardErrorCode::UnparseableResponse,
        ] {
            assert!(code.retryable(), "{} should be retryable", code.name());
            assert_eq!(code.category(), "server");
        }
    }

    #[test]
    fn test_from_http_status() {
        assert_eq!(StandardErrorCode::from_http_status(504), StandardErrorCode::Timeout);
        assert_eq!(StandardErrorCode::from_http_status(503), StandardErrorCode::Overloaded);
        assert_eq!(StandardErrorCode::from_http_status(502), StandardErrorCode::ServerError);
        assert_eq!(StandardErrorCode::from_http_status(404), StandardErrorCode::Unknown);
    }

    #[test]
    fn test_display_uses_code() {
        assert_eq!(StandardErrorCode::CacheUnavailable.to_string(), "E5001");
    }
}
