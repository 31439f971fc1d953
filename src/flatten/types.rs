//! Parser trait

use crate::error::Result;
use crate::types::{FlatRecord, JsonValue};

/// Turns one wire-format item into a flat record
pub trait RecordParser: Send + Sync {
    /// Parse a single item of a response page
    fn parse_record(&self, item: &JsonValue) -> Result<FlatRecord>;
}
