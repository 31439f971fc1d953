//! Schemas compiled into the binary

use super::types::JsonSchema;
use crate::error::{Error, Result, ResultExt};

/// Streams with an embedded schema
pub const EMBEDDED_STREAMS: &[&str] = &["employees", "attributes", "attendances"];

/// Raw schema document for a stream
pub fn embedded_schema(stream: &str) -> Option<&'static str> {
    match stream {
        "employees" => Some(include_str!("../../schemas/employees.json")),
        "attributes" => Some(include_str!("../../schemas/attributes.json")),
        "attendances" => Some(include_str!("../../schemas/attendances.json")),
        _ => None,
    }
}

/// Parsed schema for a stream
pub fn stream_schema(stream: &str) -> Result<JsonSchema> {
    let raw = embedded_schema(stream).ok_or_else(|| Error::StreamNotFound {
        stream: stream.to_string(),
    })?;
    JsonSchema::parse(raw).with_context(|| format!("Invalid embedded schema for {stream}"))
}
