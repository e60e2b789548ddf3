//! Merge request crawling across state partitions.
//!
//! The crawler pages through each requested state in turn, stops early once
//! the result cap is reached, and then applies the age cutoff locally because
//! GitLab's `created_after` filter is not relied upon. Failures abort the
//! whole crawl: a skipped page would silently undercount every contributor.

pub mod participants;

use std::collections::HashSet;
use std::num::NonZeroU32;

use chrono::{DateTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;

use crate::gitlab::error::IntakeError;
use crate::gitlab::gateway::{MergeRequestGateway, PageRequest};
use crate::gitlab::models::{MergeRequestState, MergeRequestSummary};
use crate::gitlab::pagination::MAX_PAGE_SIZE;

pub use participants::ParticipantResolver;

/// States crawled when the caller does not name any.
pub const DEFAULT_STATES: [MergeRequestState; 2] =
    [MergeRequestState::Opened, MergeRequestState::Closed];

/// Limits applied to a crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlFilter {
    /// Maximum number of merge requests accumulated across all states.
    pub max_results: Option<NonZeroU32>,
    /// Drop merge requests created more than this many days ago.
    pub max_age_days: Option<u32>,
}

impl CrawlFilter {
    /// A filter that keeps everything.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_results: None,
            max_age_days: None,
        }
    }

    /// Caps the crawl at `max_results` records; zero removes the cap.
    #[must_use]
    pub const fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = NonZeroU32::new(max_results);
        self
    }

    /// Keeps only merge requests created within the last `days` days.
    #[must_use]
    pub const fn with_max_age_days(mut self, days: u32) -> Self {
        self.max_age_days = Some(days);
        self
    }

    /// Oldest creation time that survives the age filter.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = self.max_age_days?;
        let window = TimeDelta::try_days(i64::from(days))?;
        now.checked_sub_signed(window)
    }

    fn limit(&self) -> Option<usize> {
        self.max_results
            .map(|max| usize::try_from(max.get()).unwrap_or(usize::MAX))
    }
}

/// Crawls merge request summaries through a gateway.
pub struct MergeRequestCrawler<'client, Gateway>
where
    Gateway: MergeRequestGateway,
{
    client: &'client Gateway,
    page_size: u8,
    reference_time: Option<DateTime<Utc>>,
}

impl<'client, Gateway> MergeRequestCrawler<'client, Gateway>
where
    Gateway: MergeRequestGateway,
{
    /// Create a crawler that measures age against the wall clock.
    #[must_use]
    pub const fn new(client: &'client Gateway) -> Self {
        Self {
            client,
            page_size: MAX_PAGE_SIZE,
            reference_time: None,
        }
    }

    /// Request `page_size` merge requests per page instead of
    /// [`MAX_PAGE_SIZE`].
    ///
    /// The gateway's own page size only governs per-merge-request
    /// sub-resources; the crawl always starts from this value.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u8) -> Self {
        self.page_size = page_size;
        self
    }

    /// Measure age against a fixed instant instead of the wall clock.
    #[must_use]
    pub const fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    /// Crawl the given states and return summaries newest first.
    ///
    /// States are fetched in the order given; a repeated state is fetched
    /// once. Summaries are deduplicated by their instance-wide id.
    ///
    /// # Errors
    ///
    /// Returns the first gateway failure unchanged and
    /// [`IntakeError::Cancelled`] when `cancel` fires before a page request.
    /// No summaries are returned on failure.
    pub async fn crawl(
        &self,
        states: &[MergeRequestState],
        filter: &CrawlFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<MergeRequestSummary>, IntakeError> {
        let limit = filter.limit();
        let mut collected: Vec<MergeRequestSummary> = Vec::new();

        for state in unique_states(states) {
            if limit.is_some_and(|max| collected.len() >= max) {
                break;
            }
            let before = collected.len();
            self.crawl_state(state, limit, &mut collected, cancel).await?;
            tracing::info!(
                state = %state,
                fetched = collected.len().saturating_sub(before),
                "crawled merge request state"
            );
        }

        if let Some(max) = limit {
            collected.truncate(max);
        }

        let now = self.reference_time.unwrap_or_else(Utc::now);
        if let Some(cutoff) = filter.cutoff(now) {
            collected.retain(|summary| summary.created_at >= cutoff);
        }

        Ok(newest_first(collected))
    }

    async fn crawl_state(
        &self,
        state: MergeRequestState,
        limit: Option<usize>,
        collected: &mut Vec<MergeRequestSummary>,
        cancel: &CancellationToken,
    ) -> Result<(), IntakeError> {
        let mut request = PageRequest::first(self.page_size);

        loop {
            if cancel.is_cancelled() {
                return Err(IntakeError::Cancelled);
            }

            let page = self.client.list_merge_requests(state, request).await?;
            tracing::debug!(
                state = %state,
                page = request.page(),
                returned = page.items.len(),
                quota_remaining = page.rate_limit.map(|info| info.remaining()),
                "fetched merge request page"
            );

            let is_last = page.is_last();
            collected.extend(page.items);
            if is_last || limit.is_some_and(|max| collected.len() >= max) {
                return Ok(());
            }
            request = request.next();
        }
    }
}

fn unique_states(states: &[MergeRequestState]) -> Vec<MergeRequestState> {
    let mut unique = Vec::with_capacity(states.len());
    for state in states {
        if !unique.contains(state) {
            unique.push(*state);
        }
    }
    unique
}

fn newest_first(summaries: Vec<MergeRequestSummary>) -> Vec<MergeRequestSummary> {
    let mut seen = HashSet::with_capacity(summaries.len());
    let mut unique: Vec<MergeRequestSummary> = summaries
        .into_iter()
        .filter(|summary| seen.insert(summary.id))
        .collect();
    unique.sort_by(|left, right| right.created_at.cmp(&left.created_at));
    unique
}
