//! JSON aliases shared across modules

/// Any JSON value
pub type JsonValue = serde_json::Value;

/// A JSON object
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One output record: field name to scalar, or to a one-level nested object
pub type FlatRecord = JsonObject;
