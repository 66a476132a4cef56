//! Pagination envelope shared by every listing endpoint.

use serde::Serialize;

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Maximum page size a caller may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// A page of results plus the bookkeeping the frontend needs to render
/// pagination controls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Zero-based page index.
    pub page: u64,
    /// Requested page size.
    pub size: u64,
    /// Total items across all pages.
    pub total_elements: u64,
    /// Total page count.
    pub total_pages: u64,
    /// Whether this is the first page.
    pub first: bool,
    /// Whether this is the last page.
    pub last: bool,
}

impl<T> PageResponse<T> {
    /// Build an envelope from a fetched page and the paginator's totals.
    #[must_use]
    pub fn new(items: Vec<T>, page: u64, size: u64, total_elements: u64, total_pages: u64) -> Self {
        Self {
            items,
            page,
            size,
            total_elements,
            total_pages,
            first: page == 0,
            last: total_pages == 0 || page + 1 >= total_pages,
        }
    }

    /// Map the item type, keeping the bookkeeping.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
        }
    }
}

/// Clamp a caller-supplied page size into `1..=MAX_PAGE_SIZE`.
#[must_use]
pub const fn clamp_page_size(size: u64) -> u64 {
    if size == 0 {
        DEFAULT_PAGE_SIZE
    } else if size > MAX_PAGE_SIZE {
        MAX_PAGE_SIZE
    } else {
        size
    }
}
