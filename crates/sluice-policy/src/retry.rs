//! Retry policy with exponential backoff
//!
//! Delays double after each failed attempt, capped by `max_delay`. With
//! jitter enabled a delay lands uniformly between half and full value so
//! retries from many messages do not align.

use std::time::Duration;

use rand::Rng;
use sluice_config::RetryConfig;

// Backoff shifts stop growing here; 2^16 * base already exceeds any
// reasonable max_delay.
const MAX_BACKOFF_EXP: u32 = 16;

/// Named retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    name: String,
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(name: impl Into<String>, config: RetryConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total attempts including the first, never less than 1.
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts.max(1)
    }

    /// Delay to sleep after attempt number `attempt` (1-based) failed.
    ///
    /// Attempt 1 yields the base delay, attempt 2 twice that, and so on,
    /// capped at `max_delay`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(MAX_BACKOFF_EXP);
        let base_ms = self.config.base_delay.as_millis() as u64;
        let raw = Duration::from_millis(base_ms.saturating_mul(1u64 << exp));
        let capped = raw.min(self.config.max_delay);

        if self.config.jitter {
            apply_jitter(capped)
        } else {
            capped
        }
    }
}

/// Randomize a delay to between half and full value.
fn apply_jitter(delay: Duration) -> Duration {
    let millis = delay.as_millis() as u64;
    if millis <= 1 {
        return delay;
    }
    let half = millis / 2;
    let jittered = half + rand::thread_rng().gen_range(0..=half);
    Duration::from_millis(jittered)
}
