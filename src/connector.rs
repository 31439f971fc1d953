//! Source protocol
//!
//! `spec`, `check`, `discover` and `read`: what a caller needs to drive a
//! source without knowing which API sits behind it.

use crate::config::{Catalog, ConfiguredCatalog, SpecConfig};
use crate::engine::Message;
use crate::error::Result;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;

/// Messages of a read, ending early with one `Err` if a stream fails
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

/// Self-description of a source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    /// Accepted configuration properties
    pub spec: SpecConfig,
}

/// Outcome of `check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub success: bool,
    /// Why the configuration was rejected
    pub message: Option<String>,
}

impl CheckResult {
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[async_trait]
pub trait Connector: Send + Sync {
    fn spec(&self) -> ConnectorSpec;

    /// A rejected configuration is `Ok` with a failed [`CheckResult`]
    async fn check(&self, config: &Value) -> Result<CheckResult>;

    async fn discover(&self, config: &Value) -> Result<Catalog>;

    /// Read the catalog's streams in order.
    ///
    /// Configuration and stream selection errors are returned before any
    /// request is made; later failures arrive through the stream.
    async fn read(&self, config: &Value, catalog: &ConfiguredCatalog) -> Result<MessageStream>;
}
