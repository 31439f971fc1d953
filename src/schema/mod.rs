//! Stream schemas
//!
//! Each stream ships a JSON schema embedded at compile time. The schema is
//! published by `discover` and its top-level property names form the field
//! allow-list of the employees flattener.

mod embedded;
mod types;

pub use embedded::{embedded_schema, stream_schema, EMBEDDED_STREAMS};
pub use types::{JsonSchema, JsonType, JsonTypeOrArray, SchemaProperty};
