use super::{GenerateRequest, TransportError, Upstream};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::Proxy;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Ollama `/api/generate` over HTTP.
pub struct OllamaTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl OllamaTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let endpoint = Self::generate_endpoint(base_url)?;

        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(
                env::var("OLLAMA_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(32),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("OLLAMA_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                format!("Failed to build HTTP client: {}", e),
                ErrorContext::new().with_source("ollama_transport"),
            )
        })?;

        Ok(Self { client, endpoint })
    }

    /// `{base_url}/api/generate`, tolerating a trailing slash on the base.
    fn generate_endpoint(base_url: &str) -> Result<Url> {
        let invalid = |details: String| {
            Error::configuration_with_context(
                "Invalid upstream base URL",
                ErrorContext::new()
                    .with_field_path("OLLAMA_BASE_URL")
                    .with_details(details)
                    .with_source("ollama_transport"),
            )
        };
        let mut base = Url::parse(base_url).map_err(|e| invalid(format!("{}: {}", base_url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("api/generate")
            .map_err(|e| invalid(format!("{}: {}", base_url, e)))
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl Upstream for OllamaTransport {
    async fn generate(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> std::result::Result<String, TransportError> {
        debug!(endpoint = self.endpoint.as_str(), model = request.model.as_str(), "Calling upstream");
        let resp = self
            .client
            .post(self.endpoint.clone())
            .timeout(timeout)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateResponse = resp.json().await?;
        payload.response.ok_or(TransportError::MissingResponse)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
