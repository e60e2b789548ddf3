//! Pagination state for GitLab list endpoints.
//!
//! GitLab uses offset pagination driven by `page` and `per_page` query
//! parameters and reports its position through `X-Page`, `X-Per-Page`,
//! `X-Next-Page`, `X-Total` and `X-Total-Pages` headers. The totals are
//! omitted for very large collections, so callers must not depend on them.

use http::HeaderMap;

/// Largest page size GitLab accepts.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Current page state for paginated results.
///
/// # Example
///
/// ```
/// use mergescope::gitlab::pagination::PageInfo;
///
/// let info = PageInfo::new(2, 50).with_total_pages(Some(2));
/// assert!(!info.is_first_page());
/// assert!(info.is_last_page(50));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Current page number (1-based).
    current_page: u32,
    /// Items requested per page.
    per_page: u8,
    /// Next page number when the upstream reported one.
    next_page: Option<u32>,
    /// Total number of records if known.
    total_items: Option<u64>,
    /// Total number of pages if known.
    total_pages: Option<u32>,
}

impl PageInfo {
    /// Creates a new page info instance with unknown totals.
    #[must_use]
    pub const fn new(current_page: u32, per_page: u8) -> Self {
        Self {
            current_page,
            per_page,
            next_page: None,
            total_items: None,
            total_pages: None,
        }
    }

    /// Builds page info for the requested page from GitLab's response
    /// headers.
    #[must_use]
    pub fn from_headers(current_page: u32, per_page: u8, headers: &HeaderMap) -> Self {
        Self::new(current_page, per_page)
            .with_next_page(numeric_header(headers, "x-next-page"))
            .with_total_items(numeric_header(headers, "x-total"))
            .with_total_pages(numeric_header(headers, "x-total-pages"))
    }

    /// Sets the next page number.
    #[must_use]
    pub const fn with_next_page(mut self, next_page: Option<u32>) -> Self {
        self.next_page = next_page;
        self
    }

    /// Sets the total number of records.
    #[must_use]
    pub const fn with_total_items(mut self, total_items: Option<u64>) -> Self {
        self.total_items = total_items;
        self
    }

    /// Sets the total number of pages.
    #[must_use]
    pub const fn with_total_pages(mut self, total_pages: Option<u32>) -> Self {
        self.total_pages = total_pages;
        self
    }

    /// Returns the current page number (1-based).
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Returns the number of items requested per page.
    #[must_use]
    pub const fn per_page(&self) -> u8 {
        self.per_page
    }

    /// Returns the next page number if the upstream reported one.
    #[must_use]
    pub const fn next_page(&self) -> Option<u32> {
        self.next_page
    }

    /// Returns the total number of records if known.
    #[must_use]
    pub const fn total_items(&self) -> Option<u64> {
        self.total_items
    }

    /// Returns the total number of pages if known.
    #[must_use]
    pub const fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Returns true if this is the first page.
    #[must_use]
    pub const fn is_first_page(&self) -> bool {
        self.current_page == 1
    }

    /// Returns true when no further page should be requested.
    ///
    /// A page holding fewer records than `per_page` ends the collection.
    /// A known page total ends it early, which saves the trailing empty
    /// request when the collection size is a multiple of the page size.
    #[must_use]
    pub fn is_last_page(&self, returned: usize) -> bool {
        let short_page = returned < usize::from(self.per_page);
        let past_total = self
            .total_pages
            .is_some_and(|total| self.current_page >= total);
        short_page || past_total
    }
}

impl Default for PageInfo {
    fn default() -> Self {
        Self::new(1, MAX_PAGE_SIZE)
    }
}

/// Parses a numeric header, treating blank values as absent.
pub(crate) fn numeric_header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse().ok())
}
