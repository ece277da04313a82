//! Logsift Rate Limiting
//!
//! Admission control shared by every caller of the external model, enforcing
//! two independent, optionally-absent constraints at once:
//!
//! - **RPM** (requests per minute) via a continuously-refilled token bucket
//!   with burst capacity
//! - **TPM** (transactions per minute) via a sliding window over admission
//!   timestamps
//!
//! # Architecture
//!
//! ```text
//! caller ──▶ RateLimiter ──▶ TokenBucket (rpm_limit, burst_size)
//!                       └──▶ SlidingWindow (tpm_limit, 60s)
//! ```
//!
//! The composite [`RateLimiter`] admits a caller only when every configured
//! sub-limiter admits. `acquire` is a two-phase check-then-commit: both
//! sub-limiter states are inspected before either is deducted, so a denial by
//! one never leaks capacity from the other. Waiting always happens outside
//! the internal locks.
//!
//! All timing uses `tokio::time`, so tests can drive the clock with
//! `tokio::time::pause`.
//!
//! # Examples
//!
//! ```no_run
//! use logsift_ratelimit::{RateLimitConfig, RateLimiter};
//!
//! # async fn example() {
//! let limiter = RateLimiter::new(RateLimitConfig {
//!     rpm_limit: Some(60),
//!     tpm_limit: Some(100_000),
//!     burst_size: 10,
//!     enabled: true,
//! });
//!
//! limiter.wait_for_permission(1).await;
//! // ... call the model ...
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bucket;
mod config;
mod error;
mod limiter;
mod window;

pub use bucket::TokenBucket;
pub use config::RateLimitConfig;
pub use error::RateLimitError;
pub use limiter::{with_rate_limit, RateLimiter, RateLimiterStats};
pub use window::SlidingWindow;
