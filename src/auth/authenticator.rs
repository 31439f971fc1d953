//! Authenticator implementation
//!
//! Exchanges client credentials for a bearer token and applies it to
//! outgoing requests.

use super::types::Credentials;
use crate::config::PersonioConfig;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use tracing::debug;

/// Scheme prefixed to the token in the Authorization header
pub const DEFAULT_SCHEME: &str = "Bearer";

/// Location of the token in the auth endpoint response
pub const TOKEN_PATH: &str = "$.data.token";

/// Fetches a fresh Personio token for every request.
///
/// There is no token cache and no expiry tracking: each call to
/// [`request_token`](Self::request_token), and therefore each authenticated
/// request, costs one extra round trip to the auth endpoint. The transport
/// throttles that round trip together with the resource call.
pub struct TokenAuthenticator {
    credentials: Credentials,
    token_url: String,
    scheme: String,
    http_client: Client,
}

impl TokenAuthenticator {
    /// Create an authenticator for the given token endpoint
    pub fn new(credentials: Credentials, token_url: impl Into<String>) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            scheme: DEFAULT_SCHEME.to_string(),
            http_client: Client::new(),
        }
    }

    /// Create an authenticator from a validated config
    pub fn from_config(config: &PersonioConfig) -> Result<Self> {
        let token_url = config.auth_url()?;
        Ok(Self::new(Credentials::from(config), token_url.as_str()))
    }

    /// Create an authenticator from raw user config.
    ///
    /// Fails with a configuration error when `client_id` or `client_secret`
    /// is missing. No network call is made.
    pub fn from_value(config: &JsonValue) -> Result<Self> {
        Self::from_config(&PersonioConfig::from_value(config)?)
    }

    /// Use a different authorization scheme
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Token endpoint URL
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Configured credentials
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Authorization scheme
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Exchange the credentials for a new token
    pub async fn request_token(&self) -> Result<String> {
        debug!(url = %self.token_url, "Requesting access token");

        let response = self
            .http_client
            .post(&self.token_url)
            .header(CONTENT_TYPE, "application/json")
            .query(&self.credentials.as_params())
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth_status(status.as_u16(), body));
        }

        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("token response is not valid JSON: {e}")))?;

        match extract_path(&body, TOKEN_PATH) {
            Some(JsonValue::String(token)) if !token.is_empty() => Ok(token.clone()),
            Some(_) => Err(Error::auth(format!(
                "token at '{TOKEN_PATH}' is not a non-empty string"
            ))),
            None => Err(Error::auth(format!(
                "token response has no value at '{TOKEN_PATH}'"
            ))),
        }
    }

    /// Value for the Authorization header: `"<scheme> <token>"`.
    ///
    /// Triggers a token request on every call.
    pub async fn authorization_header_value(&self) -> Result<String> {
        let token = self.request_token().await?;
        Ok(format!("{} {token}", self.scheme))
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let value = self.authorization_header_value().await?;
        Ok(req.header(AUTHORIZATION, value))
    }
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("credentials", &self.credentials)
            .field("token_url", &self.token_url)
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

/// Walk a JSON value along a simple dotted path.
/// Supports basic paths like "$.data.token" or "data.token"
pub fn extract_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            JsonValue::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}
