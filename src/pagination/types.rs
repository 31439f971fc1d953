//! Pagination types and traits

use std::collections::BTreeMap;

/// Query parameters identifying the next page.
///
/// `None` in place of a token means there are no more pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageToken {
    params: BTreeMap<String, String>,
}

impl PageToken {
    /// Create a token with a single parameter
    pub fn with_param(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut params = BTreeMap::new();
        params.insert(key.into(), value.into());
        Self { params }
    }

    /// Create an `{offset: n}` token
    pub fn offset(offset: u64) -> Self {
        Self::with_param("offset", offset.to_string())
    }

    /// Query parameters carried by this token
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Get a single parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The `offset` parameter, if this is an offset token
    pub fn offset_value(&self) -> Option<u64> {
        self.get("offset").and_then(|v| v.parse().ok())
    }
}

/// Tracks pagination progress for one stream.
///
/// Starts with a next page available and no token; once `done` is set the
/// stream is exhausted.
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages processed so far
    pub pages: u64,
    /// Current offset (for offset-based pagination)
    pub offset: u64,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Token for the next request, if any
    pub token: Option<PageToken>,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether another page should be requested
    pub fn has_next_page(&self) -> bool {
        !self.done
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
        self.token = None;
    }

    /// Record one processed page of `count` records
    pub fn record_page(&mut self, count: usize) {
        self.pages += 1;
        self.total_fetched += count as u64;
    }

    /// Advance the offset
    pub fn add_offset(&mut self, amount: u64) {
        self.offset += amount;
    }

    /// Store the token for the next request
    pub fn set_token(&mut self, token: PageToken) {
        self.token = Some(token);
    }
}

/// Core trait for pagination policies
pub trait Paginator: Send + Sync {
    /// Query parameters sent with every request of the stream
    fn base_params(&self) -> BTreeMap<String, String>;

    /// Compute the next page token from the size of the page just read.
    ///
    /// Returns `None` and marks the state done when the stream is exhausted.
    fn next_page_token(&self, records_count: usize, state: &mut PaginationState)
        -> Option<PageToken>;
}
