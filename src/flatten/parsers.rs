//! Parser implementations, one per wire shape

use super::types::RecordParser;
use crate::error::{Error, Result};
use crate::types::{FlatRecord, JsonObject, JsonValue};
use std::collections::HashSet;

/// Key holding the records of a response page
pub const DATA_PATH: &str = "data";

/// Parse every item of a response page, lazily and in page order.
///
/// Fails immediately if the page has no `data` array. Items are parsed as
/// the iterator advances; collecting into `Result<Vec<_>>` fails the whole
/// page on the first malformed item.
pub fn parse_page<'a, P>(
    body: &'a JsonValue,
    parser: &'a P,
) -> Result<impl Iterator<Item = Result<FlatRecord>> + 'a>
where
    P: RecordParser + ?Sized,
{
    let items = body
        .get(DATA_PATH)
        .ok_or_else(|| Error::extraction(DATA_PATH, "response has no data field"))?
        .as_array()
        .ok_or_else(|| Error::extraction(DATA_PATH, "data is not an array"))?;

    Ok(items.iter().map(move |item| parser.parse_record(item)))
}

fn as_object<'a>(value: &'a JsonValue, what: &str) -> Result<&'a JsonObject> {
    value
        .as_object()
        .ok_or_else(|| Error::extraction(DATA_PATH, format!("{what} is not an object: {value}")))
}

/// `attributes` of an item: missing means empty, anything but an object is an error
fn attributes_of<'a>(item: &'a JsonObject, what: &str) -> Result<Option<&'a JsonObject>> {
    match item.get("attributes") {
        None | Some(JsonValue::Null) => Ok(None),
        Some(attrs) => as_object(attrs, &format!("{what} attributes")).map(Some),
    }
}

// ============================================================================
// Attribute flattener
// ============================================================================

/// Flattens `{field: {value, ...}}` attribute maps, keeping only the fields
/// declared in the stream schema.
///
/// An attribute whose value is itself an entity (`{"type", "attributes"}`)
/// becomes a map of that entity's attribute values. Only this one level is
/// unwrapped and the allow-list does not apply inside it.
#[derive(Debug, Clone, Default)]
pub struct AttributeFlattener {
    allow_list: HashSet<String>,
}

impl AttributeFlattener {
    /// Create a flattener keeping the given fields
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow_list: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a field is kept
    pub fn allows(&self, field: &str) -> bool {
        self.allow_list.contains(field)
    }

    fn flatten_value(value: JsonValue, field: &str) -> Result<JsonValue> {
        let JsonValue::Object(nested) = value else {
            return Ok(value);
        };

        let Some(sub_attributes) = attributes_of(&nested, field)? else {
            return Ok(JsonValue::Object(JsonObject::new()));
        };

        let flattened = sub_attributes
            .iter()
            .map(|(name, sub)| {
                let unwrapped = match sub {
                    JsonValue::Object(obj) => obj.get("value").cloned().unwrap_or(JsonValue::Null),
                    other => other.clone(),
                };
                (name.clone(), unwrapped)
            })
            .collect();

        Ok(JsonValue::Object(flattened))
    }
}

impl RecordParser for AttributeFlattener {
    fn parse_record(&self, item: &JsonValue) -> Result<FlatRecord> {
        let item = as_object(item, "record")?;
        let mut record = FlatRecord::new();

        let Some(attributes) = attributes_of(item, "record")? else {
            return Ok(record);
        };

        for (field, attribute) in attributes {
            if !self.allows(field) {
                continue;
            }
            let attribute = as_object(attribute, &format!("attribute '{field}'"))?;
            let value = attribute.get("value").cloned().unwrap_or(JsonValue::Null);
            record.insert(field.clone(), Self::flatten_value(value, field)?);
        }

        Ok(record)
    }
}

// ============================================================================
// Passthrough
// ============================================================================

/// Items that are already flat objects (attribute definitions)
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughParser;

impl RecordParser for PassthroughParser {
    fn parse_record(&self, item: &JsonValue) -> Result<FlatRecord> {
        as_object(item, "record").cloned()
    }
}

// ============================================================================
// Attendance parser
// ============================================================================

/// Attendance periods: top-level `id` and `type` plus every attribute as-is.
///
/// Attendance attributes are plain values on the wire, so nothing is
/// unwrapped and nothing is filtered.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceParser;

impl RecordParser for AttendanceParser {
    fn parse_record(&self, item: &JsonValue) -> Result<FlatRecord> {
        let item = as_object(item, "record")?;
        let mut record = FlatRecord::new();

        for key in ["id", "type"] {
            if let Some(value) = item.get(key) {
                record.insert(key.to_string(), value.clone());
            }
        }

        if let Some(attributes) = attributes_of(item, "record")? {
            record.extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Ok(record)
    }
}
