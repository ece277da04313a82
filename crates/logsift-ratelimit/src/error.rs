//! Error types for rate limiting

use crate::limiter::RateLimiterStats;
use thiserror::Error;

/// Raised only in non-blocking admission mode, when capacity is unavailable
/// at the instant of the check
///
/// Carries a snapshot of the limiter's statistics from the moment of denial
/// so callers can report why admission failed.
#[derive(Error, Debug, Clone)]
#[error("rate limit exceeded: {stats}")]
pub struct RateLimitError {
    /// Limiter statistics at the time of the denial
    pub stats: RateLimiterStats,
}
