//! Composite rate limiter combining the two sub-algorithms

use crate::bucket::TokenBucket;
use crate::config::RateLimitConfig;
use crate::error::RateLimitError;
use crate::window::SlidingWindow;
use serde::Serialize;
use std::fmt;
use tokio::time::Instant;
use tracing::debug;

/// Snapshot of limiter state, taken under the internal locks
#[derive(Debug, Clone, Serialize)]
pub struct RateLimiterStats {
    /// Whether rate limiting is enabled at all
    pub enabled: bool,

    /// Configured TPM limit, if any
    pub tpm_limit: Option<u32>,

    /// Configured RPM limit, if any
    pub rpm_limit: Option<u32>,

    /// Token bucket capacity
    pub burst_size: u32,

    /// Tokens currently available in the bucket, if the bucket is configured
    pub rpm_available_tokens: Option<f64>,

    /// Admissions currently inside the sliding window, if it is configured
    pub tpm_current_requests: Option<usize>,
}

impl fmt::Display for RateLimiterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enabled={}", self.enabled)?;
        if let (Some(limit), Some(tokens)) = (self.rpm_limit, self.rpm_available_tokens) {
            write!(f, ", rpm={:.2}/{} tokens", tokens, limit)?;
        }
        if let (Some(limit), Some(current)) = (self.tpm_limit, self.tpm_current_requests) {
            write!(f, ", tpm={}/{} in window", current, limit)?;
        }
        Ok(())
    }
}

/// Dual-algorithm admission control shared by all model callers
///
/// Holds zero, one, or two sub-limiters depending on which limits the
/// configuration carries. A request is admitted only when every configured
/// sub-limiter admits it.
///
/// `acquire` checks both sub-limiter states before committing either
/// deduction, so a denial by one side never consumes capacity on the other.
pub struct RateLimiter {
    config: RateLimitConfig,
    rpm_limiter: Option<TokenBucket>,
    tpm_limiter: Option<SlidingWindow>,
}

impl RateLimiter {
    /// Build a limiter from the configuration
    pub fn new(config: RateLimitConfig) -> Self {
        let mut rpm_limiter = None;
        let mut tpm_limiter = None;

        if config.enabled {
            if let Some(rpm) = config.rpm_limit {
                rpm_limiter = Some(TokenBucket::new(rpm, config.burst_size));
            }
            if let Some(tpm) = config.tpm_limit {
                tpm_limiter = Some(SlidingWindow::new(tpm as usize, 60));
            }
        }

        Self {
            config,
            rpm_limiter,
            tpm_limiter,
        }
    }

    /// A limiter that admits everything
    pub fn disabled() -> Self {
        Self::new(RateLimitConfig::disabled())
    }

    /// Whether rate limiting is active
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Try to get permission without waiting
    ///
    /// Requires every configured sub-limiter to admit. The check is
    /// two-phase: with both sub-limiters configured, their states are locked
    /// (bucket first, window second), both are checked, and deductions happen
    /// only if both admit.
    pub async fn acquire(&self, tokens: u32) -> bool {
        if !self.config.enabled {
            return true;
        }

        match (&self.rpm_limiter, &self.tpm_limiter) {
            (None, None) => true,
            (Some(bucket), None) => bucket.acquire(tokens).await,
            (None, Some(window)) => window.acquire().await,
            (Some(bucket), Some(window)) => {
                // Fixed lock order: bucket, then window
                let mut bucket_state = bucket.lock_state().await;
                let mut window_state = window.lock_state().await;

                bucket_state.refill(bucket.rate(), bucket.burst());
                let now = Instant::now();
                window_state.evict(now, window.window());

                if bucket_state.has(tokens) && window_state.has_capacity(window.limit()) {
                    bucket_state.take(tokens);
                    window_state.admit(now);
                    true
                } else {
                    debug!(
                        rpm_tokens = bucket_state.available(),
                        tpm_in_window = window_state.len(),
                        "rate limiter denied admission"
                    );
                    false
                }
            }
        }
    }

    /// Wait until every configured sub-limiter grants permission
    ///
    /// The sub-limiters are waited on concurrently and are not coordinated;
    /// each is satisfied on its own schedule.
    pub async fn wait_for_permission(&self, tokens: u32) {
        if !self.config.enabled {
            return;
        }

        match (&self.rpm_limiter, &self.tpm_limiter) {
            (None, None) => {}
            (Some(bucket), None) => bucket.wait_for_token(tokens).await,
            (None, Some(window)) => window.wait_for_slot().await,
            (Some(bucket), Some(window)) => {
                tokio::join!(bucket.wait_for_token(tokens), window.wait_for_slot());
            }
        }
    }

    /// Snapshot of current limiter statistics
    pub async fn stats(&self) -> RateLimiterStats {
        let rpm_available_tokens = match &self.rpm_limiter {
            Some(bucket) => Some(bucket.available().await),
            None => None,
        };
        let tpm_current_requests = match &self.tpm_limiter {
            Some(window) => Some(window.current_len().await),
            None => None,
        };

        RateLimiterStats {
            enabled: self.config.enabled,
            tpm_limit: self.config.tpm_limit,
            rpm_limit: self.config.rpm_limit,
            burst_size: self.config.burst_size,
            rpm_available_tokens,
            tpm_current_requests,
        }
    }
}

/// Gate one unit of work on the limiter
///
/// In blocking mode (`raise_on_limit == false`) this waits until permission
/// is granted. In non-blocking mode it attempts a single `acquire` and
/// returns a [`RateLimitError`] carrying a stats snapshot when capacity is
/// unavailable at the instant of the check.
pub async fn with_rate_limit(
    limiter: &RateLimiter,
    tokens: u32,
    raise_on_limit: bool,
) -> Result<(), RateLimitError> {
    if raise_on_limit {
        if !limiter.acquire(tokens).await {
            return Err(RateLimitError {
                stats: limiter.stats().await,
            });
        }
        Ok(())
    } else {
        limiter.wait_for_permission(tokens).await;
        Ok(())
    }
}
