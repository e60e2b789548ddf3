//! Rate limit information from GitLab API responses.
//!
//! GitLab reports throttling state through `RateLimit-Limit`,
//! `RateLimit-Remaining` and `RateLimit-Reset` headers. The crawler never
//! backs off on its own; the values are surfaced so callers can.

use std::time::Duration;

use chrono::{DateTime, Utc};
use http::HeaderMap;

use super::pagination::numeric_header;

const LIMIT_HEADER: &str = "ratelimit-limit";
const REMAINING_HEADER: &str = "ratelimit-remaining";
const RESET_HEADER: &str = "ratelimit-reset";

/// Quota snapshot taken from one GitLab response.
///
/// # Example
///
/// ```
/// use chrono::DateTime;
/// use mergescope::gitlab::rate_limit::RateLimitInfo;
///
/// let reset = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();
/// let info = RateLimitInfo::new(2000, 1999, reset);
/// assert!(!info.is_exhausted());
/// assert_eq!(info.remaining(), 1999);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    limit: u32,
    remaining: u32,
    reset_at: DateTime<Utc>,
}

impl RateLimitInfo {
    /// Creates a snapshot from explicit values.
    #[must_use]
    pub const fn new(limit: u32, remaining: u32, reset_at: DateTime<Utc>) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Reads the `RateLimit-*` headers.
    ///
    /// Returns `None` unless all three headers are present and numeric and
    /// the reset is a valid Unix timestamp.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = numeric_header(headers, LIMIT_HEADER)?;
        let remaining = numeric_header(headers, REMAINING_HEADER)?;
        let reset_at = DateTime::from_timestamp(numeric_header(headers, RESET_HEADER)?, 0)?;
        Some(Self::new(limit, remaining, reset_at))
    }

    /// Requests allowed per window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Requests left in the current window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// When the window resets.
    #[must_use]
    pub const fn reset_at(&self) -> DateTime<Utc> {
        self.reset_at
    }

    /// True once the window has no requests left.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Time from `now` until the window resets; zero once it has passed.
    #[must_use]
    pub fn wait_from(&self, now: DateTime<Utc>) -> Duration {
        self.reset_at
            .signed_duration_since(now)
            .to_std()
            .unwrap_or_default()
    }
}
