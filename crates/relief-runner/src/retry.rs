//! Exponential backoff between failed generation attempts.

use std::time::Duration;

use crate::error::BackendError;

/// Bounded exponential backoff.
///
/// The delay before retry `n` (0-based) is `base * 2^n`, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Base backoff duration in milliseconds.
    pub base_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
        }
    }
}

impl ExponentialBackoff {
    /// Whether a failure on `attempt` (1-based) should be retried.
    pub const fn should_retry(&self, attempt: u32, error: &BackendError) -> bool {
        attempt < self.max_attempts && error.is_retryable()
    }

    /// Delay to wait after the failed `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let factor = 1_u64.checked_shl(exponent).unwrap_or(u64::MAX);
        let delay = self.base_backoff_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_backoff_ms))
    }
}
