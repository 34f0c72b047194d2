//! 传输层：上游文本生成服务的调用原语。
//!
//! Upstream call primitive.
//!
//! The retry layer only needs "send a prompt, get raw text back within a
//! deadline"; [`Upstream`] is that seam. [`OllamaTransport`] implements it
//! over HTTP and tests substitute their own implementations.

mod http;

pub use http::OllamaTransport;

use crate::error_code::StandardErrorCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Response format hint; always `"json"` for explanations.
    pub format: String,
    pub stream: bool,
}

impl GenerateRequest {
    pub fn json(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            format: "json".to_string(),
            stream: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream payload has no `response` text field")]
    MissingResponse,

    #[error("Upstream call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn code(&self) -> StandardErrorCode {
        match self {
            TransportError::Http(e) if e.is_timeout() => StandardErrorCode::Timeout,
            TransportError::Timeout(_) => StandardErrorCode::Timeout,
            TransportError::Status { status, .. } => match StandardErrorCode::from_http_status(*status) {
                StandardErrorCode::Unknown => StandardErrorCode::ServerError,
                code => code,
            },
            TransportError::MissingResponse => StandardErrorCode::UnparseableResponse,
            TransportError::Http(_) | TransportError::Other(_) => StandardErrorCode::ServerError,
        }
    }
}

/// Upstream text-generation primitive.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Send `request` and return the raw generated text. `timeout` bounds the
    /// whole call.
    async fn generate(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> std::result::Result<String, TransportError>;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_body() {
        let body = serde_json::to_value(GenerateRequest::json("llama3.2", "hi")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"model": "llama3.2", "prompt": "hi", "format": "json", "stream": false})
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TransportError::Timeout(Duration::from_secs(1)).code(),
            StandardErrorCode::Timeout
        );
        assert_eq!(
            TransportError::Status { status: 404, body: String::new() }.code(),
            StandardErrorCode::ServerError
        );
        assert_eq!(
            TransportError::Status { status: 503, body: String::new() }.code(),
            StandardErrorCode::Overloaded
        );
        assert_eq!(
            TransportError::MissingResponse.code(),
            StandardErrorCode::UnparseableResponse
        );
    }
}
