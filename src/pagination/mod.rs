//! Pagination module
//!
//! Two policies cover the Personio streams: a single page (employees,
//! attributes) and limit/offset paging (attendances).
//!
//! The paginators are stateless; progress lives in a `PaginationState`
//! owned by whoever drives the stream, one page at a time.

mod strategies;
mod types;

pub use strategies::{NoPaginator, OffsetPaginator, DEFAULT_PAGE_SIZE};
pub use types::{PageToken, PaginationState, Paginator};
