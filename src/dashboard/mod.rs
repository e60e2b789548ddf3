//! Operations exposed to dashboard front ends.
//!
//! [`Dashboard`] wires the crawler, participant resolver, aggregator and
//! estimator together behind the operations a UI calls: a plain crawl, a
//! crawl with participants, the contributor report, and the merge request
//! totals used to show an estimate before a contributor report starts.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::contributions::{AggregationError, AggregationResult, ContributionAggregator};
use crate::crawl::{CrawlFilter, DEFAULT_STATES, MergeRequestCrawler, ParticipantResolver};
use crate::estimate::{CostEstimator, ProgressEstimate};
use crate::gitlab::error::IntakeError;
use crate::gitlab::gateway::{MergeRequestGateway, PageRequest};
use crate::gitlab::models::{MergeRequestState, MergeRequestSummary};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

/// States and limits for one dashboard request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardQuery {
    /// States to crawl, in order.
    pub states: Vec<MergeRequestState>,
    /// Result cap and age cutoff.
    pub filter: CrawlFilter,
}

impl DashboardQuery {
    /// Create a query for `states` limited by `filter`.
    #[must_use]
    pub const fn new(states: Vec<MergeRequestState>, filter: CrawlFilter) -> Self {
        Self { states, filter }
    }

    /// Parses a comma-separated state list such as `opened,closed`.
    ///
    /// Blank entries are ignored; an empty list selects opened and closed.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidState`] for an unknown state name.
    pub fn parse_states(input: &str) -> Result<Vec<MergeRequestState>, IntakeError> {
        let states = input
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<MergeRequestState>, IntakeError>>()?;

        if states.is_empty() {
            return Ok(DEFAULT_STATES.to_vec());
        }
        Ok(states)
    }
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self::new(DEFAULT_STATES.to_vec(), CrawlFilter::unbounded())
    }
}

/// Contributor counts plus the estimate at the end of the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributorsReport {
    /// Aggregated counters.
    pub result: AggregationResult,
    /// Estimate refined with the observed duration.
    pub estimate: ProgressEstimate,
}

/// Merge request counts used before starting a contributor report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeRequestTotals {
    /// Count per crawled state.
    pub per_state: BTreeMap<String, u64>,
    /// Sum over all states.
    pub total: u64,
    /// Projected duration of a contributor report over `total` merge
    /// requests.
    pub estimate: ProgressEstimate,
}

/// Dashboard operations over one project's gateway.
pub struct Dashboard<'client, Gateway>
where
    Gateway: MergeRequestGateway,
{
    client: &'client Gateway,
    estimator: CostEstimator,
    request_budget: Option<u32>,
    reference_time: Option<DateTime<Utc>>,
    telemetry: &'client dyn TelemetrySink,
}

impl<'client, Gateway> Dashboard<'client, Gateway>
where
    Gateway: MergeRequestGateway,
{
    /// Create a dashboard over `client` with default estimates.
    #[must_use]
    pub const fn new(client: &'client Gateway) -> Self {
        Self {
            client,
            estimator: CostEstimator::new(crate::estimate::DEFAULT_PER_UNIT_COST),
            request_budget: None,
            reference_time: None,
            telemetry: &NoopTelemetrySink,
        }
    }

    /// Use `estimator` for all projections.
    #[must_use]
    pub const fn with_estimator(mut self, estimator: CostEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Cap the sub-resource requests of a contributor report.
    #[must_use]
    pub const fn with_request_budget(mut self, budget: Option<u32>) -> Self {
        self.request_budget = budget;
        self
    }

    /// Measure merge request age against a fixed instant.
    #[must_use]
    pub const fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    /// Report progress to `telemetry`.
    #[must_use]
    pub const fn with_telemetry(mut self, telemetry: &'client dyn TelemetrySink) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Summaries matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Propagates crawl failures; see [`MergeRequestCrawler::crawl`].
    pub async fn crawl(
        &self,
        query: &DashboardQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<MergeRequestSummary>, IntakeError> {
        let crawler = match self.reference_time {
            Some(now) => MergeRequestCrawler::new(self.client).with_reference_time(now),
            None => MergeRequestCrawler::new(self.client),
        };
        let summaries = crawler.crawl(&query.states, &query.filter, cancel).await?;

        self.telemetry.record(TelemetryEvent::CrawlCompleted {
            states: query.states.iter().map(ToString::to_string).collect(),
            merge_requests: u64::try_from(summaries.len()).unwrap_or(u64::MAX),
        });
        Ok(summaries)
    }

    /// Summaries matching `query` with participants attached.
    ///
    /// # Errors
    ///
    /// Propagates crawl and participant failures.
    pub async fn crawl_with_participants(
        &self,
        query: &DashboardQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<MergeRequestSummary>, IntakeError> {
        let summaries = self.crawl(query, cancel).await?;
        ParticipantResolver::new(self.client)
            .resolve_all(&summaries, cancel)
            .await
    }

    /// Contributor counters over the merge requests matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::Intake`] when the crawl fails or the token
    /// is rejected, and [`AggregationError::Partial`] when the pass stops
    /// early.
    pub async fn contributors(
        &self,
        query: &DashboardQuery,
        cancel: &CancellationToken,
    ) -> Result<ContributorsReport, AggregationError> {
        let summaries = self.crawl(query, cancel).await?;
        let started = Instant::now();

        let aggregator = ContributionAggregator::new(self.client)
            .with_estimator(self.estimator)
            .with_telemetry(self.telemetry);
        let result = match self.request_budget {
            Some(budget) => {
                aggregator
                    .with_request_budget(budget)
                    .aggregate(&summaries, cancel)
                    .await?
            }
            None => aggregator.aggregate(&summaries, cancel).await?,
        };

        let estimate = self
            .estimator
            .estimate(result.total_requested)
            .refine(result.completed_units(), started.elapsed());
        Ok(ContributorsReport { result, estimate })
    }

    /// Per-state merge request counts and the projected report duration.
    ///
    /// Without a result cap or age cutoff each state costs one request and
    /// reads GitLab's `X-Total` header. Otherwise, or when the header is
    /// missing, the states are crawled and counted.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn merge_request_totals(
        &self,
        query: &DashboardQuery,
        cancel: &CancellationToken,
    ) -> Result<MergeRequestTotals, IntakeError> {
        let per_state = if query.filter == CrawlFilter::unbounded() {
            self.header_totals(query, cancel).await?
        } else {
            count_by_state(&query.states, &self.crawl(query, cancel).await?)
        };

        let total = per_state.values().copied().fold(0_u64, u64::saturating_add);
        tracing::info!(total, "counted merge requests");
        Ok(MergeRequestTotals {
            per_state,
            total,
            estimate: self.estimator.estimate(total),
        })
    }

    async fn header_totals(
        &self,
        query: &DashboardQuery,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<String, u64>, IntakeError> {
        let mut per_state = BTreeMap::new();
        for state in &query.states {
            if cancel.is_cancelled() {
                return Err(IntakeError::Cancelled);
            }
            let page = self
                .client
                .list_merge_requests(*state, PageRequest::first(1))
                .await?;
            let count = match page.page_info.total_items() {
                Some(total) => total,
                None => {
                    tracing::debug!(state = %state, "X-Total missing, counting by crawl");
                    let summaries = MergeRequestCrawler::new(self.client)
                        .crawl(&[*state], &CrawlFilter::unbounded(), cancel)
                        .await?;
                    u64::try_from(summaries.len()).unwrap_or(u64::MAX)
                }
            };
            per_state.insert(state.to_string(), count);
        }
        Ok(per_state)
    }
}

fn count_by_state(
    states: &[MergeRequestState],
    summaries: &[MergeRequestSummary],
) -> BTreeMap<String, u64> {
    let mut per_state: BTreeMap<String, u64> = states
        .iter()
        .map(|state| (state.to_string(), 0))
        .collect();
    for summary in summaries {
        let count = per_state.entry(summary.state.to_string()).or_insert(0);
        *count = count.saturating_add(1);
    }
    per_state
}
