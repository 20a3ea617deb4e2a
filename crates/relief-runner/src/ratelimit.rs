//! Minimum-interval rate limiter.
//!
//! Hosted free tiers reject bursts, so every call through one client waits
//! until at least `min_interval` has passed since the previous call
//! finished. [`RateLimiter::acquire`] hands out a [`RatePermit`]; the call
//! runs while the permit is held, and dropping it stamps the finish time.
//! Callers queue on the mutex, which keeps them in arrival order.

use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

/// A token bucket of size one, refilled `min_interval` after each call ends.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_finished: Mutex<Option<Instant>>,
}

/// The right to make one call. Dropping it marks the call finished.
#[derive(Debug)]
#[must_use = "the call slot is released as soon as the permit is dropped"]
pub struct RatePermit<'a> {
    last_finished: MutexGuard<'a, Option<Instant>>,
}

impl Drop for RatePermit<'_> {
    fn drop(&mut self) {
        *self.last_finished = Some(Instant::now());
    }
}

impl RateLimiter {
    /// Create a limiter enforcing `min_interval` between calls.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_finished: Mutex::new(None),
        }
    }

    /// Wait until `min_interval` has passed since the previous call
    /// finished, then claim the slot.
    pub async fn acquire(&self) -> RatePermit<'_> {
        let last_finished = self.last_finished.lock().await;
        if let Some(previous) = *last_finished {
            let ready_at = previous.checked_add(self.min_interval).unwrap_or(previous);
            if ready_at > Instant::now() {
                tracing::debug!(
                    wait_ms = ready_at.saturating_duration_since(Instant::now()).as_millis(),
                    "rate limited"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        RatePermit { last_finished }
    }

    /// The configured spacing.
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn calls_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_secs(20));
        let start = Instant::now();

        drop(limiter.acquire().await);
        assert!(start.elapsed() < Duration::from_secs(1));

        drop(limiter.acquire().await);
        assert!(start.elapsed() >= Duration::from_secs(20));

        drop(limiter.acquire().await);
        assert!(start.elapsed() >= Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn interval_runs_from_end_of_call() {
        let limiter = RateLimiter::new(Duration::from_secs(20));

        let permit = limiter.acquire().await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(permit);
        let finished = Instant::now();

        drop(limiter.acquire().await);
        assert!(finished.elapsed() >= Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_time_counts_toward_interval() {
        let limiter = RateLimiter::new(Duration::from_secs(20));
        drop(limiter.acquire().await);
        tokio::time::sleep(Duration::from_secs(25)).await;

        let before = Instant::now();
        drop(limiter.acquire().await);
        assert!(before.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_never_waits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..5 {
            drop(limiter.acquire().await);
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(limiter.min_interval().is_zero());
    }
}
