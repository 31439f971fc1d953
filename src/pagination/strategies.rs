//! Pagination policy implementations

use super::types::{PageToken, PaginationState, Paginator};
use std::collections::BTreeMap;

/// Rows requested per attendances page
pub const DEFAULT_PAGE_SIZE: u32 = 200;

// ============================================================================
// No Pagination
// ============================================================================

/// Single-page extraction: the first response is the whole stream
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPaginator;

impl NoPaginator {
    /// Create a new no-op paginator
    pub fn new() -> Self {
        Self
    }
}

impl Paginator for NoPaginator {
    fn base_params(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn next_page_token(
        &self,
        records_count: usize,
        state: &mut PaginationState,
    ) -> Option<PageToken> {
        state.record_page(records_count);
        state.mark_done();
        None
    }
}

// ============================================================================
// Offset Pagination
// ============================================================================

/// Limit/offset pagination.
///
/// Sends `limit=<page size>` on every request and `offset=<n>` from the
/// second page on. A page shorter than the page size ends the stream.
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    /// Query parameter name for offset
    pub offset_param: String,
    /// Query parameter name for limit
    pub limit_param: String,
    /// Number of records per page
    pub page_size: u32,
}

impl OffsetPaginator {
    /// Create a new offset paginator
    pub fn new(
        offset_param: impl Into<String>,
        limit_param: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            offset_param: offset_param.into(),
            limit_param: limit_param.into(),
            page_size,
        }
    }
}

impl Default for OffsetPaginator {
    fn default() -> Self {
        Self::new("offset", "limit", DEFAULT_PAGE_SIZE)
    }
}

impl Paginator for OffsetPaginator {
    fn base_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert(self.limit_param.clone(), self.page_size.to_string());
        params
    }

    fn next_page_token(
        &self,
        records_count: usize,
        state: &mut PaginationState,
    ) -> Option<PageToken> {
        state.record_page(records_count);

        if records_count < self.page_size as usize {
            state.mark_done();
            return None;
        }

        state.add_offset(u64::from(self.page_size));
        let token = PageToken::with_param(&self.offset_param, state.offset.to_string());
        state.set_token(token.clone());
        Some(token)
    }
}
