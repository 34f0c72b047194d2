//! Retrying upstream caller.
//!
//! One logical operation is "call upstream, then recover a structured object
//! from the raw text". Transport failures, timeouts, and unparseable text are
//! all transient and retried the same way with a fixed delay; only the final
//! exhaustion reaches the caller, as an opaque terminal error.

use crate::error_code::StandardErrorCode;
use crate::structured::ResponseRecoveryParser;
use crate::transport::{GenerateRequest, Upstream};
use crate::types::WordExplanation;
use crate::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Bounded retry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = `retry_count + 1`.
    pub retry_count: u32,
    /// Fixed wait between failed attempts.
    pub retry_delay: Duration,
    /// Hard bound on each attempt (call + parse).
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: 3,
            retry_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn max_attempts(&self) -> u32 {
        self.retry_count.saturating_add(1)
    }
}

/// Run `attempt` until it succeeds or the policy is exhausted.
///
/// `attempt` receives the 1-based attempt number. Each call is bounded by
/// `policy.timeout`. Only [`Error::TransientUpstream`] failures are retried;
/// any other error is returned as-is immediately. Exhaustion yields
/// [`Error::TerminalUpstream`] carrying a fresh incident id.
pub async fn retry_with_policy<T, F, Fut>(policy: &RetryPolicy, mut attempt: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts();
    let mut last: Option<(StandardErrorCode, String)> = None;

    for n in 1..=max_attempts {
        debug!(attempt = n, max_attempts, "Upstream attempt started");
        let outcome = match tokio::time::timeout(policy.timeout, attempt(n)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::TransientUpstream {
                attempt: n,
                code: StandardErrorCode::Timeout,
                message: format!("attempt timed out after {:?}", policy.timeout),
            }),
        };

        match outcome {
            Ok(value) => {
                debug!(attempt = n, "Upstream attempt succeeded");
                return Ok(value);
            }
            Err(Error::TransientUpstream { code, message, .. }) => {
                warn!(
                    attempt = n,
                    max_attempts,
                    code = code.code(),
                    error = message.as_str(),
                    "Upstream attempt failed"
                );
                last = Some((code, message));
                if n < max_attempts && !policy.retry_delay.is_zero() {
                    tokio::time::sleep(policy.retry_delay).await;
                }
            }
            Err(other) => return Err(other),
        }
    }

    let (code, last_error) =
        last.unwrap_or((StandardErrorCode::Unknown, "no attempt was made".to_string()));
    let incident_id = Uuid::new_v4().to_string();
    error!(
        incident_id = incident_id.as_str(),
        attempts = max_attempts,
        code = code.code(),
        last_error = last_error.as_str(),
        "Upstream retries exhausted"
    );
    Err(Error::TerminalUpstream {
        incident_id,
        attempts: max_attempts,
        code,
        last_error,
    })
}

/// Calls upstream with a [`RetryPolicy`] and maps recovered output into a
/// [`WordExplanation`].
pub struct ResilientCaller {
    upstream: Arc<dyn Upstream>,
    parser: ResponseRecoveryParser,
    policy: RetryPolicy,
}

impl ResilientCaller {
    pub fn new(upstream: Arc<dyn Upstream>, policy: RetryPolicy) -> Self {
        Self {
            upstream,
            parser: ResponseRecoveryParser::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Call with this caller's own policy.
    pub async fn call(&self, request: &GenerateRequest) -> Result<WordExplanation> {
        self.call_with_retry(request, &self.policy).await
    }

    pub async fn call_with_retry(
        &self,
        request: &GenerateRequest,
        policy: &RetryPolicy,
    ) -> Result<WordExplanation> {
        retry_with_policy(policy, |n| self.attempt(request, policy.timeout, n)).await
    }

    async fn attempt(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
        n: u32,
    ) -> Result<WordExplanation> {
        let raw = self
            .upstream
            .generate(request, timeout)
            .await
            .map_err(|e| Error::TransientUpstream {
                attempt: n,
                code: e.code(),
                message: e.to_string(),
            })?;

        match self.parser.recover(&raw) {
            Some(recovered) => {
                debug!(attempt = n, pass = recovered.pass.as_str(), "Recovered upstream JSON");
                Ok(WordExplanation::from_raw(&recovered.object))
            }
            None => Err(Error::TransientUpstream {
                attempt: n,
                code: StandardErrorCode::UnparseableResponse,
                message: format!("unrecoverable upstream text: {}", truncate(&raw, 200)),
            }),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
