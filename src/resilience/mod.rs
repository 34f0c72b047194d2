//! 弹性模块：带超时的有界重试。
//!
//! # Resilience Module
//!
//! Bounded, fixed-delay retries around one upstream attempt.
//!
//! ## Overview
//!
//! - Total attempts = `retry_count + 1`
//! - Each attempt (call + parse) is bounded by `timeout`
//! - Transport failures, timeouts, and unparseable responses are retried alike
//! - Exhaustion raises [`crate::Error::TerminalUpstream`] with an opaque incident id
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RetryPolicy`] | Retry count, fixed delay, per-attempt timeout |
//! | [`retry_with_policy`] | Generic retry loop over any attempt closure |
//! | [`ResilientCaller`] | Upstream call + response recovery under a policy |
//!
//! ```rust
//! use std::time::Duration;
//! use word_explain::resilience::{retry_with_policy, RetryPolicy};
//! use word_explain::error_code::StandardErrorCode;
//! use word_explain::Error;
//!
//! # async fn demo() {
//! let policy = RetryPolicy::new()
//!     .with_retry_count(2)
//!     .with_retry_delay(Duration::from_millis(10));
//!
//! let err = retry_with_policy::<(), _, _>(&policy, |attempt| async move {
//!     Err(Error::TransientUpstream {
//!         attempt,
//!         code: StandardErrorCode::ServerError,
//!         message: "connection refused".into(),
//!     })
//! })
//! .await
//! .unwrap_err();
//! assert!(err.is_terminal_upstream());
//! # }
//! ```

pub mod retry;

pub use retry::{retry_with_policy, ResilientCaller, RetryPolicy};
