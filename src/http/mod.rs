//! HTTP transport
//!
//! Every Personio call goes through [`HttpClient::get_json`]: it requests a
//! token, waits for the shared rate limiter, sends the request and retries
//! according to the calling stream's status policy.

mod client;
mod rate_limit;
mod retry;

pub use client::{ApiRequest, HttpClient, HttpClientConfig};
pub use rate_limit::{RateLimiter, DEFAULT_REQUESTS_PER_SECOND};
pub use retry::RetryPolicy;
