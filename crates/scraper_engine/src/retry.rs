//! Linear retry budget shared by every fetch.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// One time unit of backoff.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts,
            backoff_unit,
        }
    }

    /// Delay to wait after attempt `attempt` (0-indexed) failed.
    ///
    /// Returns `None` when that attempt was the last one in the budget.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        let next = attempt.saturating_add(1);
        if next >= self.max_attempts {
            return None;
        }
        Some(self.backoff_unit.saturating_mul(next))
    }
}
