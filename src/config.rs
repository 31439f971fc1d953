//! Configuration types
//!
//! `PersonioConfig` is the validated user configuration. The spec and
//! catalog types describe the connector to the orchestrator.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Default Personio API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.personio.de/v1/";

/// Earliest attendance date requested when no `start_date` is configured
pub const DEFAULT_START_DATE: &str = "2019-01-01";

// ============================================================================
// User Configuration
// ============================================================================

/// Validated connector configuration
#[derive(Clone, Deserialize)]
pub struct PersonioConfig {
    /// API client id
    pub client_id: String,
    /// API client secret
    pub client_secret: String,
    /// Base URL for all API calls, always ending in `/`
    #[serde(default = "default_base_url", deserialize_with = "deserialize_base_url")]
    pub base_url: Url,
    /// First day of the attendances window
    #[serde(default = "default_start_date", deserialize_with = "deserialize_start_date")]
    pub start_date: NaiveDate,
}

impl PersonioConfig {
    /// Create a config with the default base URL and start date
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: default_base_url(),
            start_date: default_start_date(),
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url =
            parse_base_url(base_url).map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        Ok(self)
    }

    /// Validate and build a config from user-supplied JSON
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        Self::deserialize(value).map_err(config_error)
    }

    /// URL of the token endpoint (`<base_url>auth/`)
    pub fn auth_url(&self) -> Result<Url> {
        Ok(self.base_url.join("auth/")?)
    }
}

impl std::fmt::Debug for PersonioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonioConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("base_url", &self.base_url.as_str())
            .field("start_date", &self.start_date)
            .finish()
    }
}

/// Missing fields keep their name; everything else becomes a config error
fn config_error(e: serde_json::Error) -> Error {
    let message = e.to_string();
    match message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
    {
        Some(field) => Error::missing_field(field),
        None => Error::config(message),
    }
}

fn parse_base_url(raw: &str) -> std::result::Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}

/// `null` falls back to the default
fn deserialize_base_url<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Url, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_base_url(&raw)
            .map_err(|e| serde::de::Error::custom(format!("invalid base_url '{raw}': {e}"))),
        None => Ok(default_base_url()),
    }
}

/// `YYYY-MM-DD`; `null` falls back to the default
fn deserialize_start_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<NaiveDate, D::Error> {
    let date = Option::<NaiveDate>::deserialize(deserializer)
        .map_err(|e| serde::de::Error::custom(format!("invalid start_date: {e}")))?;
    Ok(date.unwrap_or_else(default_start_date))
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

fn default_start_date() -> NaiveDate {
    DEFAULT_START_DATE.parse().unwrap_or_default()
}

// ============================================================================
// Spec Config (for UI)
// ============================================================================

/// JSON type of a configuration property
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    String,
}

/// Configuration specification for connector setup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecConfig {
    /// Configuration properties
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyConfig>,
}

/// Configuration property definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyConfig {
    /// Property type
    #[serde(rename = "type", default)]
    pub property_type: PropertyType,

    /// Human-readable title
    #[serde(default)]
    pub title: Option<String>,

    /// Property description
    #[serde(default)]
    pub description: Option<String>,

    /// Whether this is a secret (should be masked)
    #[serde(default)]
    pub secret: bool,

    /// Whether this property is required
    #[serde(default)]
    pub required: bool,

    /// Default value
    #[serde(default)]
    pub default: Option<JsonValue>,

    /// Format hint (e.g., "date", "uri")
    #[serde(default)]
    pub format: Option<String>,
}

impl PropertyConfig {
    fn string(title: &str, description: &str) -> Self {
        Self {
            property_type: PropertyType::String,
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            secret: false,
            required: false,
            default: None,
            format: None,
        }
    }
}

impl SpecConfig {
    /// Configuration accepted by the Personio source
    pub fn personio() -> Self {
        let mut properties = BTreeMap::new();

        let mut client_id = PropertyConfig::string("Client ID", "Personio API client id");
        client_id.required = true;
        properties.insert("client_id".to_string(), client_id);

        let mut client_secret =
            PropertyConfig::string("Client Secret", "Personio API client secret");
        client_secret.required = true;
        client_secret.secret = true;
        properties.insert("client_secret".to_string(), client_secret);

        let mut base_url = PropertyConfig::string("Base URL", "Personio API base URL");
        base_url.default = Some(JsonValue::String(DEFAULT_BASE_URL.to_string()));
        base_url.format = Some("uri".to_string());
        properties.insert("base_url".to_string(), base_url);

        let mut start_date = PropertyConfig::string(
            "Start Date",
            "First day of the attendance periods to extract",
        );
        start_date.default = Some(JsonValue::String(DEFAULT_START_DATE.to_string()));
        start_date.format = Some("date".to_string());
        properties.insert("start_date".to_string(), start_date);

        Self { properties }
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// How a stream is read; every Personio stream is re-read in full
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    #[default]
    FullRefresh,
}

/// Stream catalog returned by discover
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

/// Stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,

    /// JSON schema for the stream
    #[serde(default)]
    pub json_schema: JsonValue,

    /// Supported sync modes
    #[serde(default)]
    pub supported_sync_modes: Vec<SyncMode>,

    /// Default cursor field
    #[serde(default)]
    pub default_cursor_field: Option<Vec<String>>,

    /// Source-defined primary key
    #[serde(default)]
    pub source_defined_primary_key: Option<Vec<Vec<String>>>,
}

/// Configured catalog (selected streams for sync)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfiguredCatalog {
    /// Selected streams
    pub streams: Vec<ConfiguredStream>,
}

/// Configured stream for sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfiguredStream {
    /// Stream reference
    pub stream: CatalogStream,

    /// Selected sync mode
    #[serde(default)]
    pub sync_mode: SyncMode,
}

impl ConfiguredCatalog {
    /// Select every stream of a catalog in full refresh mode
    pub fn all(catalog: &Catalog) -> Self {
        Self {
            streams: catalog
                .streams
                .iter()
                .cloned()
                .map(|stream| ConfiguredStream {
                    stream,
                    sync_mode: SyncMode::FullRefresh,
                })
                .collect(),
        }
    }

    /// Select the named streams, failing on unknown names
    pub fn select(catalog: &Catalog, names: &[&str]) -> Result<Self> {
        let mut streams = Vec::with_capacity(names.len());
        for name in names {
            let stream = catalog
                .streams
                .iter()
                .find(|s| s.name == *name)
                .ok_or_else(|| Error::StreamNotFound {
                    stream: (*name).to_string(),
                })?;
            streams.push(ConfiguredStream {
                stream: stream.clone(),
                sync_mode: SyncMode::FullRefresh,
            });
        }
        Ok(Self { streams })
    }

    /// Names of the selected streams, in order
    pub fn stream_names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.stream.name.as_str()).collect()
    }
}
