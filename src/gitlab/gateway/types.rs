//! Public types for paged gateway operations.

use crate::gitlab::error::IntakeError;
use crate::gitlab::pagination::{MAX_PAGE_SIZE, PageInfo};
use crate::gitlab::rate_limit::RateLimitInfo;

/// Page coordinates for a single list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u8,
}

impl PageRequest {
    /// Creates a request for `page` (1-based) with `per_page` records.
    #[must_use]
    pub const fn new(page: u32, per_page: u8) -> Self {
        Self { page, per_page }
    }

    /// First page with the given size.
    #[must_use]
    pub const fn first(per_page: u8) -> Self {
        Self::new(1, per_page)
    }

    /// The request for the following page.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::new(self.page.saturating_add(1), self.per_page)
    }

    /// Page number (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Records per page.
    #[must_use]
    pub const fn per_page(&self) -> u8 {
        self.per_page
    }

    /// Checks the coordinates against GitLab's limits.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidPagination` when the page is zero or the
    /// page size falls outside `1..=100`.
    pub fn validate(&self) -> Result<(), IntakeError> {
        if self.page == 0 {
            return Err(IntakeError::InvalidPagination {
                message: "page must be at least 1".to_owned(),
            });
        }

        if self.per_page == 0 {
            return Err(IntakeError::InvalidPagination {
                message: "per_page must be at least 1".to_owned(),
            });
        }

        if self.per_page > MAX_PAGE_SIZE {
            return Err(IntakeError::InvalidPagination {
                message: format!("per_page must not exceed {MAX_PAGE_SIZE}"),
            });
        }

        Ok(())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(MAX_PAGE_SIZE)
    }
}

/// One page of records from a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// Pagination state.
    pub page_info: PageInfo,
    /// Rate limit information when the upstream sent it.
    pub rate_limit: Option<RateLimitInfo>,
}

impl<T> Page<T> {
    /// Wraps records for the given request without totals or rate limit
    /// data, as a mock or fixture would produce them.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest) -> Self {
        Self {
            items,
            page_info: PageInfo::new(request.page(), request.per_page()),
            rate_limit: None,
        }
    }

    /// Returns true when no further page should be requested.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.page_info.is_last_page(self.items.len())
    }
}
