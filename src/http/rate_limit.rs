//! Request throttling
//!
//! A governor token bucket shared by resource and token requests, so every
//! call that reaches Personio spends one permit.

use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Default permits per second
pub const DEFAULT_REQUESTS_PER_SECOND: NonZeroU32 = match NonZeroU32::new(10) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

/// Cloneable handle to one token bucket
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<DefaultDirectRateLimiter>,
}

impl RateLimiter {
    pub fn new(quota: Quota) -> Self {
        Self {
            bucket: Arc::new(governor::RateLimiter::direct(quota)),
        }
    }

    /// Wait for one permit
    pub async fn wait(&self) {
        self.bucket.until_ready().await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RateLimiter")
    }
}
