//! Record flattening
//!
//! Personio wraps every field in an attribute object:
//!
//! ```text
//! {"id": 1, "type": "Employee", "attributes": {
//!     "first_name": {"label": "First name", "value": "Ada", "type": "standard", "universal_id": "first_name"},
//!     "supervisor": {"label": "Supervisor", "value": {"type": "Employee", "attributes": {
//!         "id": {"label": "ID", "value": 7, "type": "integer", "universal_id": "id"}}}}
//! }}
//! ```
//!
//! The parsers here turn each such item into a flat record. A page either
//! parses completely or fails: malformed items are errors, never skipped.

mod parsers;
mod types;

pub use parsers::{parse_page, AttendanceParser, AttributeFlattener, PassthroughParser, DATA_PATH};
pub use types::RecordParser;
