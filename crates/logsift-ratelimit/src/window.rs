//! Sliding window sub-limiter (TPM-style rate over a trailing interval)

use crate::bucket::{MAX_WAIT, MIN_WAIT};
use std::collections::VecDeque;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{sleep, Duration, Instant};

pub(crate) struct WindowState {
    admissions: VecDeque<Instant>,
}

impl WindowState {
    /// Drop admissions that have aged out of the window
    pub(crate) fn evict(&mut self, now: Instant, window: Duration) {
        while self
            .admissions
            .front()
            .is_some_and(|t| now.duration_since(*t) >= window)
        {
            self.admissions.pop_front();
        }
    }

    pub(crate) fn has_capacity(&self, limit: usize) -> bool {
        self.admissions.len() < limit
    }

    pub(crate) fn admit(&mut self, now: Instant) {
        self.admissions.push_back(now);
    }

    pub(crate) fn len(&self) -> usize {
        self.admissions.len()
    }

    fn oldest(&self) -> Option<Instant> {
        self.admissions.front().copied()
    }
}

/// Sliding window over admission timestamps
///
/// Admits a request only while fewer than `limit` admissions fall inside the
/// trailing `window`. Expired timestamps are evicted from the front of the
/// queue on every access.
pub struct SlidingWindow {
    limit: usize,
    window: Duration,
    state: Mutex<WindowState>,
}

impl SlidingWindow {
    /// Create a window admitting `limit` requests per `window_secs` seconds
    pub fn new(limit: usize, window_secs: u64) -> Self {
        Self {
            limit,
            window: Duration::from_secs(window_secs),
            state: Mutex::new(WindowState {
                admissions: VecDeque::new(),
            }),
        }
    }

    /// Admit one request if the window has capacity; never waits
    pub async fn acquire(&self) -> bool {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        state.evict(now, self.window);
        if state.has_capacity(self.limit) {
            state.admit(now);
            true
        } else {
            false
        }
    }

    /// Block until the window admits a request
    ///
    /// Sleeps until the oldest admission is due to expire, clamped to
    /// [0.1s, 1s] between attempts.
    pub async fn wait_for_slot(&self) {
        loop {
            if self.acquire().await {
                return;
            }
            let wait = {
                let state = self.state.lock().await;
                match state.oldest() {
                    Some(oldest) => (oldest + self.window).saturating_duration_since(Instant::now()),
                    None => MIN_WAIT,
                }
            };
            sleep(wait.clamp(MIN_WAIT, MAX_WAIT)).await;
        }
    }

    /// Number of admissions currently inside the window
    pub async fn current_len(&self) -> usize {
        let mut state = self.state.lock().await;
        state.evict(Instant::now(), self.window);
        state.len()
    }

    pub(crate) async fn lock_state(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().await
    }

    pub(crate) fn limit(&self) -> usize {
        self.limit
    }

    pub(crate) fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_denies_at_limit() {
        let window = SlidingWindow::new(3, 60);
        for _ in 0..3 {
            assert!(window.acquire().await);
        }
        assert!(!window.acquire().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_restores_capacity() {
        let window = SlidingWindow::new(2, 60);
        assert!(window.acquire().await);
        assert!(window.acquire().await);
        assert!(!window.acquire().await);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(window.acquire().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_expiry() {
        let window = SlidingWindow::new(2, 60);
        assert!(window.acquire().await);
        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(window.acquire().await);
        assert!(!window.acquire().await);

        // Only the first admission has aged out
        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(window.current_len().await, 1);
        assert!(window.acquire().await);
        assert!(!window.acquire().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_slot_unblocks_on_expiry() {
        let window = SlidingWindow::new(1, 60);
        assert!(window.acquire().await);

        window.wait_for_slot().await;
        assert_eq!(window.current_len().await, 1);
    }
}
