//! Stream definitions
//!
//! One definition per Personio resource. Each declares its path, primary
//! key and cursor field, builds its requests, parses its pages with the
//! matching flattener and decides whether another page follows.
//!
//! | stream      | path                           | primary key | cursor field    |
//! |-------------|--------------------------------|-------------|-----------------|
//! | employees   | `company/employees`            | `id`        | `updated_since` |
//! | attributes  | `company/employees/attributes` | `key`       |                 |
//! | attendances | `company/attendances`          | `id`        | `updated_at`    |
//!
//! The cursor field is declared for the catalog only; requests never
//! carry stream state.

mod definitions;
mod types;

pub use definitions::{Attendances, Attributes, Employees, PersonioStream};
pub use types::{StreamConfig, StreamDefinition, APP_ID, APP_ID_HEADER};
