//! Stream definition trait and metadata

use crate::auth::TokenAuthenticator;
use crate::error::{is_retryable_status, Result};
use crate::flatten::{parse_page, RecordParser};
use crate::http::ApiRequest;
use crate::pagination::{PageToken, PaginationState, Paginator};
use crate::types::{FlatRecord, JsonValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

/// Header identifying the integration to Personio
pub const APP_ID_HEADER: &str = "X-Personio-App-ID";

/// Value sent in [`APP_ID_HEADER`]
pub const APP_ID: &str = "AIRBYTE";

/// Static metadata of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Stream name
    pub name: &'static str,
    /// Resource path relative to the base URL
    pub path: &'static str,
    /// Primary key field
    pub primary_key: &'static str,
    /// Cursor field, declared for the catalog only
    pub cursor_field: Option<&'static str>,
}

/// Behaviour shared by every Personio stream
pub trait StreamDefinition: Send + Sync {
    /// Static metadata
    fn config(&self) -> &StreamConfig;

    /// API base URL, ending in `/`
    fn base_url(&self) -> &Url;

    /// Authenticator shared by all streams of a source
    fn authenticator(&self) -> &Arc<TokenAuthenticator>;

    /// Pagination policy
    fn paginator(&self) -> &dyn Paginator;

    /// Parser turning one wire item into a flat record
    fn parser(&self) -> &dyn RecordParser;

    /// Resource-specific query parameters
    fn request_params(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Stream name
    fn name(&self) -> &'static str {
        self.config().name
    }

    /// Absolute URL of the resource
    fn url(&self) -> Result<Url> {
        Ok(self.base_url().join(self.config().path)?)
    }

    /// Build the GET request for a page.
    ///
    /// Query parameters are the paginator's base parameters, then the
    /// resource parameters, then the page token's fields, later ones
    /// winning on conflict. `Authorization` is added by the transport.
    fn build_request(&self, page_token: Option<&PageToken>) -> Result<ApiRequest> {
        let mut request = ApiRequest::get(self.url()?).with_header(APP_ID_HEADER, APP_ID);

        let token_params = page_token.map(PageToken::params).into_iter().flatten();
        for (key, value) in self
            .paginator()
            .base_params()
            .into_iter()
            .chain(self.request_params())
            .chain(token_params.map(|(k, v)| (k.clone(), v.clone())))
        {
            request = request.with_query(key, value);
        }

        Ok(request)
    }

    /// Parse a response body into flat records, lazily and in page order
    fn parse_page<'a>(
        &'a self,
        body: &'a JsonValue,
    ) -> Result<Box<dyn Iterator<Item = Result<FlatRecord>> + 'a>> {
        Ok(Box::new(parse_page(body, self.parser())?))
    }

    /// Next page token given the size of the page just read
    fn next_page_token(
        &self,
        records_count: usize,
        state: &mut PaginationState,
    ) -> Option<PageToken> {
        self.paginator().next_page_token(records_count, state)
    }

    /// Whether a non-2xx response with this status is sent again.
    ///
    /// The transport consults this for every failed resource call of the
    /// stream.
    fn should_retry(&self, status: u16) -> bool {
        is_retryable_status(status)
    }
}
