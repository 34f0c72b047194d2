//! 运行配置：从环境变量加载上游、缓存与重试参数。
//!
//! Runtime configuration loaded from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `OLLAMA_BASE_URL` | `http://localhost:11434` | Upstream base URL |
//! | `OLLAMA_MODEL` | `llama3.2` | Model name sent with every call |
//! | `OLLAMA_TIMEOUT` | `30s` | Per-attempt timeout |
//! | `OLLAMA_CACHE_TTL` | `1h` | Lifetime of cached explanations |
//! | `OLLAMA_RETRY_COUNT` | `3` | Retries after the first attempt |
//! | `OLLAMA_RETRY_DELAY` | `500ms` | Fixed delay between attempts |
//! | `REDIS_URL` | unset | Shared store; in-memory store when unset |
//! | `REDIS_PASSWORD` | unset | Overrides any password in `REDIS_URL` |
//! | `INSTANCE_ID` | host name | Recorded in cached entry metadata |
//!
//! Durations use human-readable forms such as `100ms`, `5s`, `1h`.

use crate::resilience::RetryPolicy;
use crate::{Error, ErrorContext, Result};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub redis_url: Option<String>,
    pub redis_password: Option<String>,
    pub instance_id: String,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(3600),
            retry_count: 3,
            retry_delay: Duration::from_millis(500),
            redis_url: None,
            redis_password: None,
            instance_id: default_instance_id(),
        }
    }
}

impl ExplainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Load from an explicit variable map; unset or blank variables take defaults.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let defaults = Self::default();

        Ok(Self {
            base_url: get("OLLAMA_BASE_URL").unwrap_or(defaults.base_url),
            model: get("OLLAMA_MODEL").unwrap_or(defaults.model),
            timeout: duration_var("OLLAMA_TIMEOUT", get("OLLAMA_TIMEOUT"), defaults.timeout)?,
            cache_ttl: duration_var(
                "OLLAMA_CACHE_TTL",
                get("OLLAMA_CACHE_TTL"),
                defaults.cache_ttl,
            )?,
            retry_count: match get("OLLAMA_RETRY_COUNT") {
                Some(raw) => raw.parse::<u32>().map_err(|e| {
                    invalid_var("OLLAMA_RETRY_COUNT", format!("{}: {}", raw, e))
                })?,
                None => defaults.retry_count,
            },
            retry_delay: duration_var(
                "OLLAMA_RETRY_DELAY",
                get("OLLAMA_RETRY_DELAY"),
                defaults.retry_delay,
            )?,
            redis_url: get("REDIS_URL"),
            redis_password: get("REDIS_PASSWORD"),
            instance_id: get("INSTANCE_ID").unwrap_or(defaults.instance_id),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
    pub fn with_redis_url(mut self, redis_url: impl Into<String>) -> Self {
        self.redis_url = Some(redis_url.into());
        self
    }
    pub fn with_redis_password(mut self, password: impl Into<String>) -> Self {
        self.redis_password = Some(password.into());
        self
    }
    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = instance_id.into();
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .with_retry_count(self.retry_count)
            .with_retry_delay(self.retry_delay)
            .with_timeout(self.timeout)
    }
}

fn invalid_var(name: &str, details: String) -> Error {
    Error::configuration_with_context(
        format!("Invalid value for {}", name),
        ErrorContext::new()
            .with_field_path(name)
            .with_details(details)
            .with_source("explain_config"),
    )
}

fn duration_var(name: &str, raw: Option<String>, default: Duration) -> Result<Duration> {
    match raw {
        Some(raw) => {
            humantime::parse_duration(&raw).map_err(|e| invalid_var(name, format!("{}: {}", raw, e)))
        }
        None => Ok(default),
    }
}

/// Host name of this machine, or a random id when it cannot be read.
pub fn default_instance_id() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = ExplainConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.retry_count, 3);
        assert_eq!(cfg.cache_ttl, Duration::from_secs(3600));
        assert!(cfg.redis_url.is_none());
        assert!(!cfg.instance_id.is_empty());
    }

    #[test]
    fn test_parses_human_durations() {
        let cfg = ExplainConfig::from_vars(vars(&[
            ("OLLAMA_BASE_URL", "http://ollama"),
            ("OLLAMA_TIMEOUT", "5s"),
            ("OLLAMA_RETRY_COUNT", "3"),
            ("OLLAMA_RETRY_DELAY", "100ms"),
            ("OLLAMA_CACHE_TTL", "1h"),
            ("INSTANCE_ID", "node-a"),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url, "http://ollama");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.retry_delay, Duration::from_millis(100));
        assert_eq!(cfg.cache_ttl, Duration::from_secs(3600));
        assert_eq!(cfg.instance_id, "node-a");

        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = ExplainConfig::from_vars(vars(&[("OLLAMA_RETRY_COUNT", "-1")])).unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("OLLAMA_RETRY_COUNT")
        );

        let err = ExplainConfig::from_vars(vars(&[("OLLAMA_TIMEOUT", "soon")])).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_blank_values_fall_back() {
        let cfg = ExplainConfig::from_vars(vars(&[("OLLAMA_MODEL", "  "), ("REDIS_URL", "")]))
            .unwrap();
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert!(cfg.redis_url.is_none());
    }
}
