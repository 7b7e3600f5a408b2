//! Fixed-delay retry policy

use std::time::Duration;

/// How often a batch is sent before it counts as failed
///
/// The delay between attempts is constant: there is no growth and no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total sends per batch, including the first
    pub max_attempts: u32,
    /// Wait between two sends of the same batch
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Whether a failure on 1-based `attempt` is followed by another send
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay after a failure on 1-based `attempt`, `None` once exhausted
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        self.should_retry(attempt).then_some(self.delay)
    }
}
