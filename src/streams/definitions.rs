//! The Personio streams

use super::types::{StreamConfig, StreamDefinition};
use crate::auth::TokenAuthenticator;
use crate::config::PersonioConfig;
use crate::error::Result;
use crate::flatten::{AttendanceParser, AttributeFlattener, PassthroughParser, RecordParser};
use crate::pagination::{NoPaginator, OffsetPaginator, Paginator};
use crate::schema::stream_schema;
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

const EMPLOYEES: StreamConfig = StreamConfig {
    name: "employees",
    path: "company/employees",
    primary_key: "id",
    cursor_field: Some("updated_since"),
};

const ATTRIBUTES: StreamConfig = StreamConfig {
    name: "attributes",
    path: "company/employees/attributes",
    primary_key: "key",
    cursor_field: None,
};

const ATTENDANCES: StreamConfig = StreamConfig {
    name: "attendances",
    path: "company/attendances",
    primary_key: "id",
    cursor_field: Some("updated_at"),
};

// ============================================================================
// Employees
// ============================================================================

/// Employee records, flattened and filtered to the schema's fields
#[derive(Debug, Clone)]
pub struct Employees {
    authenticator: Arc<TokenAuthenticator>,
    base_url: Url,
    flattener: AttributeFlattener,
}

impl Employees {
    /// Bind the stream to an authenticator; the allow-list comes from the embedded schema
    pub fn new(authenticator: Arc<TokenAuthenticator>, base_url: Url) -> Result<Self> {
        let schema = stream_schema(EMPLOYEES.name)?;
        Ok(Self {
            authenticator,
            base_url,
            flattener: AttributeFlattener::new(schema.field_names()),
        })
    }
}

impl StreamDefinition for Employees {
    fn config(&self) -> &StreamConfig {
        &EMPLOYEES
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn authenticator(&self) -> &Arc<TokenAuthenticator> {
        &self.authenticator
    }

    fn paginator(&self) -> &dyn Paginator {
        &NoPaginator
    }

    fn parser(&self) -> &dyn RecordParser {
        &self.flattener
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// Definitions of the employee attributes configured in the account
#[derive(Debug, Clone)]
pub struct Attributes {
    authenticator: Arc<TokenAuthenticator>,
    base_url: Url,
}

impl Attributes {
    pub fn new(authenticator: Arc<TokenAuthenticator>, base_url: Url) -> Self {
        Self {
            authenticator,
            base_url,
        }
    }
}

impl StreamDefinition for Attributes {
    fn config(&self) -> &StreamConfig {
        &ATTRIBUTES
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn authenticator(&self) -> &Arc<TokenAuthenticator> {
        &self.authenticator
    }

    fn paginator(&self) -> &dyn Paginator {
        &NoPaginator
    }

    fn parser(&self) -> &dyn RecordParser {
        &PassthroughParser
    }
}

// ============================================================================
// Attendances
// ============================================================================

/// Attendance periods between `start_date` and today, 200 per page
#[derive(Debug, Clone)]
pub struct Attendances {
    authenticator: Arc<TokenAuthenticator>,
    base_url: Url,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    paginator: OffsetPaginator,
}

impl Attendances {
    pub fn new(authenticator: Arc<TokenAuthenticator>, base_url: Url, start_date: NaiveDate) -> Self {
        Self {
            authenticator,
            base_url,
            start_date,
            end_date: None,
            paginator: OffsetPaginator::default(),
        }
    }

    /// Pin the end of the window instead of using today's date
    #[must_use]
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Last day of the requested window
    pub fn end_date(&self) -> NaiveDate {
        self.end_date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Rows requested per page
    pub fn page_size(&self) -> u32 {
        self.paginator.page_size
    }
}

impl StreamDefinition for Attendances {
    fn config(&self) -> &StreamConfig {
        &ATTENDANCES
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn authenticator(&self) -> &Arc<TokenAuthenticator> {
        &self.authenticator
    }

    fn paginator(&self) -> &dyn Paginator {
        &self.paginator
    }

    fn parser(&self) -> &dyn RecordParser {
        &AttendanceParser
    }

    fn request_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("start_date".to_string(), self.start_date.to_string());
        params.insert("end_date".to_string(), self.end_date().to_string());
        params
    }
}

// ============================================================================
// PersonioStream
// ============================================================================

/// Every stream the source can read
#[derive(Debug, Clone)]
pub enum PersonioStream {
    Employees(Employees),
    Attributes(Attributes),
    Attendances(Attendances),
}

impl PersonioStream {
    /// All streams, in catalog order, bound to one authenticator
    pub fn all(config: &PersonioConfig, authenticator: Arc<TokenAuthenticator>) -> Result<Vec<Self>> {
        let base_url = config.base_url.clone();
        Ok(vec![
            Self::Employees(Employees::new(authenticator.clone(), base_url.clone())?),
            Self::Attributes(Attributes::new(authenticator.clone(), base_url.clone())),
            Self::Attendances(Attendances::new(authenticator, base_url, config.start_date)),
        ])
    }

    fn inner(&self) -> &dyn StreamDefinition {
        match self {
            Self::Employees(s) => s,
            Self::Attributes(s) => s,
            Self::Attendances(s) => s,
        }
    }
}

impl StreamDefinition for PersonioStream {
    fn config(&self) -> &StreamConfig {
        self.inner().config()
    }

    fn base_url(&self) -> &Url {
        self.inner().base_url()
    }

    fn authenticator(&self) -> &Arc<TokenAuthenticator> {
        self.inner().authenticator()
    }

    fn paginator(&self) -> &dyn Paginator {
        self.inner().paginator()
    }

    fn parser(&self) -> &dyn RecordParser {
        self.inner().parser()
    }

    fn request_params(&self) -> BTreeMap<String, String> {
        self.inner().request_params()
    }
}
