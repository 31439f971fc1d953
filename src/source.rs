//! The Personio source
//!
//! Composes one `TokenAuthenticator` with the three stream definitions and
//! implements the `Connector` protocol on top of them.

use crate::auth::TokenAuthenticator;
use crate::config::{
    Catalog, CatalogStream, ConfiguredCatalog, PersonioConfig, SpecConfig, SyncMode,
};
use crate::connector::{CheckResult, Connector, ConnectorSpec, MessageStream};
use crate::engine::{SyncConfig, SyncEngine};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::schema::stream_schema;
use crate::streams::{PersonioStream, StreamDefinition};
use crate::types::JsonValue;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Source reading employees, attributes and attendances from Personio
#[derive(Debug, Clone, Default)]
pub struct PersonioSource {
    http: HttpClientConfig,
    sync: SyncConfig,
}

impl PersonioSource {
    /// Create a source with default transport settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Override transport settings (retries, backoff, rate limit)
    #[must_use]
    pub fn with_http_config(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    /// Override sync settings
    #[must_use]
    pub fn with_sync_config(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// Check that the configuration yields a working authenticator.
    ///
    /// Only constructs the authenticator; no request is sent.
    pub fn check_connection(&self, config: &JsonValue) -> CheckResult {
        match TokenAuthenticator::from_value(config) {
            Ok(_) => CheckResult::success(),
            Err(e) => CheckResult::failure(e.to_string()),
        }
    }

    /// Like `check_connection`, but also exchanges the credentials for a token
    pub async fn check_connection_live(&self, config: &JsonValue) -> CheckResult {
        let authenticator = match TokenAuthenticator::from_value(config) {
            Ok(auth) => auth,
            Err(e) => return CheckResult::failure(e.to_string()),
        };

        match authenticator.request_token().await {
            Ok(_) => CheckResult::success(),
            Err(e) => {
                warn!(error = %e, "Token request failed");
                CheckResult::failure(e.to_string())
            }
        }
    }

    /// All streams, bound to one shared authenticator
    pub fn streams(&self, config: &JsonValue) -> Result<Vec<PersonioStream>> {
        let config = PersonioConfig::from_value(config)?;
        let authenticator = Arc::new(TokenAuthenticator::from_config(&config)?);
        PersonioStream::all(&config, authenticator)
    }

    /// Catalog entry describing a stream
    pub fn catalog_stream(stream: &dyn StreamDefinition) -> Result<CatalogStream> {
        let config = stream.config();
        Ok(CatalogStream {
            name: config.name.to_string(),
            json_schema: stream_schema(config.name)?.to_value()?,
            supported_sync_modes: vec![SyncMode::FullRefresh],
            default_cursor_field: config.cursor_field.map(|f| vec![f.to_string()]),
            source_defined_primary_key: Some(vec![vec![config.primary_key.to_string()]]),
        })
    }

    fn select(
        streams: Vec<PersonioStream>,
        catalog: &ConfiguredCatalog,
    ) -> Result<Vec<PersonioStream>> {
        catalog
            .stream_names()
            .into_iter()
            .map(|name| {
                streams
                    .iter()
                    .find(|s| s.name() == name)
                    .cloned()
                    .ok_or_else(|| Error::StreamNotFound {
                        stream: name.to_string(),
                    })
            })
            .collect()
    }
}

#[async_trait]
impl Connector for PersonioSource {
    fn spec(&self) -> ConnectorSpec {
        ConnectorSpec {
            name: "personio".to_string(),
            title: "Personio".to_string(),
            description: Some(
                "Employees, employee attributes and attendance periods from the Personio API"
                    .to_string(),
            ),
            spec: SpecConfig::personio(),
        }
    }

    async fn check(&self, config: &JsonValue) -> Result<CheckResult> {
        Ok(self.check_connection(config))
    }

    async fn discover(&self, config: &JsonValue) -> Result<Catalog> {
        let streams = self
            .streams(config)?
            .iter()
            .map(|s| Self::catalog_stream(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Catalog { streams })
    }

    async fn read(&self, config: &JsonValue, catalog: &ConfiguredCatalog) -> Result<MessageStream> {
        let selected = Self::select(self.streams(config)?, catalog)?;
        info!(streams = ?catalog.stream_names(), "Reading streams");

        let engine = SyncEngine::new(HttpClient::new(self.http.clone())?).with_config(self.sync);
        Ok(engine.read(selected))
    }
}
