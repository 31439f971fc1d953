//! Auth configuration types

use crate::config::PersonioConfig;

/// Client credentials for the token exchange
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API client id
    pub client_id: String,
    /// API client secret
    pub client_secret: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Request parameters sent to the token endpoint
    pub fn as_params(&self) -> [(&'static str, &str); 2] {
        [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ]
    }
}

impl From<&PersonioConfig> for Credentials {
    fn from(config: &PersonioConfig) -> Self {
        Self::new(config.client_id.clone(), config.client_secret.clone())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}
