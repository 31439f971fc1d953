// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Personio source
//!
//! Extracts HR data from the Personio REST API and emits it as flat JSON
//! records, one stream at a time.
//!
//! ## Streams
//!
//! - **employees**: employee records, flattened from Personio's
//!   `{field: {label, value, ...}}` attribute format and filtered to the
//!   fields of the stream schema
//! - **attributes**: the employee attribute definitions of the account
//! - **attendances**: attendance periods, paged 200 at a time
//!
//! Every request carries a token freshly exchanged for the configured
//! client credentials.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use personio_source::{Connector, ConfiguredCatalog, PersonioSource, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = PersonioSource::new();
//!     let config = serde_json::json!({
//!         "client_id": "...",
//!         "client_secret": "..."
//!     });
//!
//!     let status = source.check(&config).await?;
//!     let catalog = source.discover(&config).await?;
//!
//!     let mut messages = source.read(&config, &ConfiguredCatalog::all(&catalog)).await?;
//!     while let Some(msg) = messages.next().await {
//!         println!("{:?}", msg?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  PersonioSource (Connector)                  │
//! │  spec()   check()   discover() → Catalog   read() → Messages │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────┬───────────────┴───┬─────────────┬──────────────┐
//! │   Streams   │      Engine       │    HTTP     │    Auth      │
//! ├─────────────┼───────────────────┼─────────────┼──────────────┤
//! │ Employees   │ page by page read │ get_json    │ Token per    │
//! │ Attributes  │ max records       │ Rate limit  │ request      │
//! │ Attendances │ cursor state      │ 429/5xx     │              │
//! └─────────────┴───────────────────┴─────────────┴──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// JSON type aliases
pub mod types;

/// Token authentication
pub mod auth;

/// Authenticated, throttled and retried GET requests
pub mod http;

/// Pagination policies
pub mod pagination;

/// Flattening of Personio response items into records
pub mod flatten;

/// Embedded stream schemas
pub mod schema;

/// Stream definitions
pub mod streams;

/// Main execution engine
pub mod engine;

/// Configuration, spec and catalog types
pub mod config;

/// Connector trait
pub mod connector;

/// The Personio source
pub mod source;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{Catalog, ConfiguredCatalog, PersonioConfig, SyncMode};
pub use connector::{CheckResult, Connector, ConnectorSpec, MessageStream};
pub use engine::Message;
pub use error::{Error, Result};
pub use source::PersonioSource;
pub use streams::{PersonioStream, StreamDefinition};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
