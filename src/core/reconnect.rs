use std::time::Duration;

/// Attempt-count based exponential backoff.
///
/// `delay(attempt) = base_delay * 2^attempt`. The policy never caps the attempt counter
/// itself; it only advises whether another retry is allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl BackoffPolicy {
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1_000);
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    pub const fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
        }
    }

    /// Delay before the reconnect that follows `attempt` prior failures.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_DELAY, Self::DEFAULT_MAX_ATTEMPTS)
    }
}
