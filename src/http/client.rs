//! Authenticated JSON requests against Personio resources

use super::rate_limit::{RateLimiter, DEFAULT_REQUESTS_PER_SECOND};
use super::retry::RetryPolicy;
use crate::auth::TokenAuthenticator;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use governor::Quota;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, Response, StatusCode};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Transport settings
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Throttle shared by token and resource requests; `None` disables it
    pub quota: Option<Quota>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            quota: Some(Quota::per_second(DEFAULT_REQUESTS_PER_SECOND)),
            user_agent: format!("personio-source/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_quota(mut self, quota: Quota) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Send requests as fast as the server answers
    #[must_use]
    pub fn unthrottled(mut self) -> Self {
        self.quota = None;
        self
    }
}

/// One request against a Personio resource, without credentials
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute resource URL
    pub url: Url,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
}

impl ApiRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
        }
    }

    /// Set a query parameter, replacing an earlier value for `key`
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Sends [`ApiRequest`]s with a fresh token, throttling and retries
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    limiter: Option<RateLimiter>,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        let limiter = config.quota.map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            limiter,
        })
    }

    /// Send `request` and decode the JSON body.
    ///
    /// Every attempt exchanges the credentials for a new token before the
    /// resource call. A non-2xx status is retried only if `should_retry`
    /// accepts it; timeouts and connection failures are always retried.
    /// Token failures end the call at once.
    pub async fn get_json(
        &self,
        request: &ApiRequest,
        auth: &TokenAuthenticator,
        should_retry: &(dyn Fn(u16) -> bool + Sync),
    ) -> Result<JsonValue> {
        let retry = self.config.retry;
        let mut attempt = 0;

        loop {
            let (reason, delay) = match self.send(request, auth).await {
                Ok(response) if response.status().is_success() => {
                    return decode_body(response).await;
                }
                Ok(response) => {
                    let status = response.status();
                    if !(retry.allows(attempt) && should_retry(status.as_u16())) {
                        return Err(status_error(response).await);
                    }
                    let delay = if status == StatusCode::TOO_MANY_REQUESTS {
                        retry.rate_limited(attempt, retry_after(&response))
                    } else {
                        retry.backoff(attempt)
                    };
                    (format!("HTTP {}", status.as_u16()), delay)
                }
                Err(e) if e.is_retryable() && retry.allows(attempt) => {
                    (e.to_string(), retry.backoff(attempt))
                }
                Err(e) => return Err(e),
            };

            attempt += 1;
            warn!(
                url = %request.url,
                attempt,
                max_retries = retry.max_retries,
                ?delay,
                "{reason}, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send(&self, request: &ApiRequest, auth: &TokenAuthenticator) -> Result<Response> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        // One permit for the token exchange, one for the resource call
        self.throttle().await;
        let builder = auth.apply(builder).await?;
        self.throttle().await;

        debug!(method = %request.method, url = %request.url, "Sending request");
        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                }
            } else {
                Error::Http(e)
            }
        })
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.wait().await;
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn retry_after(response: &Response) -> Option<&str> {
    response.headers().get(RETRY_AFTER)?.to_str().ok()
}

async fn status_error(response: Response) -> Error {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_seconds = retry_after(&response)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);
        return Error::RateLimited {
            retry_after_seconds,
        };
    }
    let body = response.text().await.unwrap_or_default();
    Error::http_status(status.as_u16(), body)
}

async fn decode_body(response: Response) -> Result<JsonValue> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::decode(format!("Invalid JSON body: {e}")))
}
