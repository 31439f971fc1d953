//! Retry timing
//!
//! Personio answers bursts with 429 and occasionally with 5xx. Both are
//! retried with exponential backoff; a 429 carrying `Retry-After` waits for
//! the advertised delay instead.

use std::time::Duration;

/// How often and how long to wait before re-sending a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled for every further one
    pub initial_backoff: Duration,
    /// Upper bound for any delay, `Retry-After` included
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff,
        }
    }

    /// Whether another attempt is allowed after `attempt` retries
    pub fn allows(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Exponential delay before retry number `attempt + 1`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Delay for a 429: the `Retry-After` seconds when present and numeric,
    /// otherwise the regular backoff
    pub fn rate_limited(&self, attempt: u32, retry_after: Option<&str>) -> Duration {
        retry_after
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map_or_else(
                || self.backoff(attempt),
                |secs| Duration::from_secs(secs).min(self.max_backoff),
            )
    }
}
