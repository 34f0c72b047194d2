//! 词语解释服务：校验输入、派生缓存键、合并并发请求并调用上游模型。
//!
//! # Explain Module
//!
//! Ties the cache, retry, and recovery layers together behind one call.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`validate_explain_input`] | Rejects empty, uncontained, or oversized input |
//! | [`explain_prompt`] | JSON-only prompt sent to the model |
//! | [`derive_cache_key`] | Validated key derivation with no store or upstream |
//! | [`Explainer`] | `explain(word, context)` with caching and coalescing |
//! | [`ExplainerBuilder`] | Wires store, upstream, and policy from [`ExplainConfig`](crate::config::ExplainConfig) |
//!
//! ## Example
//!
//! ```rust,no_run
//! use word_explain::ExplainerBuilder;
//!
//! # async fn demo() -> word_explain::Result<()> {
//! let explainer = ExplainerBuilder::from_env()?.build().await?;
//! let explanation = explainer
//!     .explain("scrutinize", "I need to scrutinize the data carefully.")
//!     .await?;
//! println!("{}: {}", explanation.cache_key, explanation.meaning);
//! # Ok(())
//! # }
//! ```

mod builder;
mod prompt;
mod service;
mod validation;

pub use builder::ExplainerBuilder;
pub use prompt::explain_prompt;
pub use service::{derive_cache_key, ExplainOutcome, Explainer};
pub use validation::{validate_explain_input, MAX_CONTEXT_CHARS, MAX_WORD_CHARS};
