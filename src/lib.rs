//! # word-explain
//!
//! 带单飞缓存、重试与响应修复的词语解释运行时，位于本地大模型之前。
//!
//! Resilient caching runtime that explains a word as used in a context
//! paragraph, sitting in front of a slow and occasionally malformed LLM.
//!
//! ## Overview
//!
//! Every request follows the same path:
//!
//! `VALIDATE -> DERIVE_KEY -> CACHE_LOOKUP -> COALESCE_CHECK -> RETRY_LOOP -> STORE`
//!
//! - **Canonical keys**: equivalent requests (case, whitespace) share one entry
//! - **Single flight**: concurrent identical misses run one upstream computation
//! - **Bounded retries**: fixed delay, per-attempt timeout, opaque terminal errors
//! - **Recovery**: direct, extracted, and repaired JSON parse passes
//! - **Degradation**: a failing store turns into a cache miss, never a request failure
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use word_explain::{ExplainConfig, ExplainerBuilder};
//!
//! #[tokio::main]
//! async fn main() -> word_explain::Result<()> {
//!     let explainer = ExplainerBuilder::new()
//!         .with_config(ExplainConfig::from_env()?)
//!         .build()
//!         .await?;
//!
//!     let explanation = explainer
//!         .explain("scrutinize", "I need to scrutinize the data carefully.")
//!         .await?;
//!     println!("{}", explanation.meaning);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Key derivation, stores, and the single-flight cache |
//! | [`resilience`] | Retry policy and the resilient upstream caller |
//! | [`structured`] | Multi-pass recovery of JSON objects from model text |
//! | [`transport`] | Upstream trait and the Ollama HTTP transport |
//! | [`explain`] | Input validation, prompt, and the [`Explainer`] service |
//! | [`types`] | Explanation payloads |
//! | [`config`] | Environment-driven configuration |

pub mod cache;
pub mod config;
pub mod error_code;
pub mod explain;
pub mod resilience;
pub mod structured;
pub mod transport;
pub mod types;

pub use cache::{CacheKey, CacheKeyGenerator, CacheStats, SingleFlightCache};
pub use config::ExplainConfig;
pub use error_code::StandardErrorCode;
pub use explain::{derive_cache_key, ExplainOutcome, Explainer, ExplainerBuilder};
pub use types::{Explanation, WordExplanation};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
