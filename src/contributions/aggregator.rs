//! The aggregation pass over crawled merge requests.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::estimate::CostEstimator;
use crate::gitlab::error::IntakeError;
use crate::gitlab::gateway::{Collected, MergeRequestGateway, collect_all};
use crate::gitlab::models::MergeRequestSummary;
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

use super::{AggregationResult, ContributionDelta};

/// Fewest requests one merge request can cost: a page each of commits,
/// notes, award emoji and participants.
const REQUESTS_PER_UNIT: u32 = 4;

/// Why a pass stopped before handling every merge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialReason {
    /// The caller cancelled the pass.
    Cancelled,
    /// The request budget could not cover another merge request.
    BudgetExhausted,
}

impl fmt::Display for PartialReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Cancelled => "cancelled",
            Self::BudgetExhausted => "request budget exhausted",
        })
    }
}

/// Failures that end an aggregation pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    /// A failure that makes every later request pointless, such as a
    /// rejected token.
    #[error(transparent)]
    Intake(#[from] IntakeError),

    /// The pass stopped early; `result` holds what was merged so far.
    #[error("aggregation stopped early: {reason}")]
    Partial {
        /// Why the pass stopped.
        reason: PartialReason,
        /// Contributions merged before stopping.
        result: Box<AggregationResult>,
    },
}

impl AggregationError {
    /// The partial result, when the pass stopped early.
    #[must_use]
    pub fn partial_result(&self) -> Option<&AggregationResult> {
        match self {
            Self::Partial { result, .. } => Some(result),
            Self::Intake(_) => None,
        }
    }
}

struct UnitOutcome {
    delta: ContributionDelta,
    requests: u32,
}

struct UnitFailure {
    error: IntakeError,
    requests: u32,
}

/// Counts contributions across merge requests through a gateway.
///
/// Each merge request's commits, notes, award emoji and participants are
/// fetched concurrently and merged only once every collection is complete,
/// so the result never reflects half of a merge request. Participants are
/// used to map commit authors to usernames.
pub struct ContributionAggregator<'client, Gateway>
where
    Gateway: MergeRequestGateway,
{
    client: &'client Gateway,
    estimator: CostEstimator,
    request_budget: Option<u32>,
    telemetry: &'client dyn TelemetrySink,
}

impl<'client, Gateway> ContributionAggregator<'client, Gateway>
where
    Gateway: MergeRequestGateway,
{
    /// Create an aggregator with the default estimator, no request budget
    /// and no telemetry.
    #[must_use]
    pub const fn new(client: &'client Gateway) -> Self {
        Self {
            client,
            estimator: CostEstimator::new(crate::estimate::DEFAULT_PER_UNIT_COST),
            request_budget: None,
            telemetry: &NoopTelemetrySink,
        }
    }

    /// Use `estimator` for progress projections.
    #[must_use]
    pub const fn with_estimator(mut self, estimator: CostEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Stop with a partial result once `budget` requests cannot cover
    /// another merge request.
    #[must_use]
    pub const fn with_request_budget(mut self, budget: u32) -> Self {
        self.request_budget = Some(budget);
        self
    }

    /// Report progress to `telemetry`.
    #[must_use]
    pub const fn with_telemetry(mut self, telemetry: &'client dyn TelemetrySink) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Estimator used for progress projections.
    #[must_use]
    pub const fn estimator(&self) -> &CostEstimator {
        &self.estimator
    }

    /// Aggregate contributions across `summaries`, in order.
    ///
    /// A merge request whose sub-resources fail to load for any reason other
    /// than authentication is recorded in [`AggregationResult::skipped`] and
    /// the pass continues.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::Intake`] when GitLab rejects the token,
    /// and [`AggregationError::Partial`] when `cancel` fires or the request
    /// budget runs out before every merge request is handled.
    pub async fn aggregate(
        &self,
        summaries: &[MergeRequestSummary],
        cancel: &CancellationToken,
    ) -> Result<AggregationResult, AggregationError> {
        let requested = u64::try_from(summaries.len()).unwrap_or(u64::MAX);
        let initial = self.estimator.estimate(requested);
        let started = Instant::now();
        let mut result = AggregationResult::new(requested);
        let mut requests_spent: u32 = 0;

        for summary in summaries {
            if cancel.is_cancelled() {
                return Err(self.stop_early(PartialReason::Cancelled, result));
            }
            if self.budget_exhausted(requests_spent) {
                return Err(self.stop_early(PartialReason::BudgetExhausted, result));
            }

            match self.fetch_unit(summary).await {
                Ok(unit) => {
                    requests_spent = requests_spent.saturating_add(unit.requests);
                    result.merge(unit.delta);
                }
                Err(failure) => {
                    requests_spent = requests_spent.saturating_add(failure.requests);
                    if failure.error.is_fatal() {
                        tracing::error!(
                            iid = summary.iid,
                            error = %failure.error,
                            "aborting aggregation"
                        );
                        return Err(AggregationError::Intake(failure.error));
                    }
                    tracing::warn!(
                        iid = summary.iid,
                        error = %failure.error,
                        "skipping merge request"
                    );
                    let reason = failure.error.to_string();
                    self.telemetry.record(TelemetryEvent::UnitSkipped {
                        iid: summary.iid,
                        reason: reason.clone(),
                    });
                    result.skip(summary.iid, reason);
                }
            }

            let progress = initial.refine(result.completed_units(), started.elapsed());
            self.telemetry.record(TelemetryEvent::ProgressUpdated {
                iid: summary.iid,
                completed: progress.completed_units,
                requested,
                remaining_seconds: progress.remaining.as_secs(),
            });
        }

        self.finish(&result);
        Ok(result)
    }

    async fn fetch_unit(&self, summary: &MergeRequestSummary) -> Result<UnitOutcome, UnitFailure> {
        let page_size = self.client.page_size();
        let iid = summary.iid;

        let (commits, notes, awards, participants) = tokio::join!(
            collect_all(page_size, |request| self.client.list_commits(iid, request)),
            collect_all(page_size, |request| self.client.list_notes(iid, request)),
            collect_all(page_size, |request| {
                self.client.list_award_emoji(iid, request)
            }),
            collect_all(page_size, |request| {
                self.client.list_participants(iid, request)
            }),
        );

        let requests = requests_spent(&commits)
            .saturating_add(requests_spent(&notes))
            .saturating_add(requests_spent(&awards))
            .saturating_add(requests_spent(&participants));

        let outcome = match (commits, notes, awards, participants) {
            (Ok(commit_list), Ok(note_list), Ok(award_list), Ok(participant_list)) => {
                Ok(ContributionDelta::from_unit(
                    summary,
                    &commit_list.items,
                    &note_list.items,
                    &award_list.items,
                    &participant_list.items,
                ))
            }
            (Err(error), note_result, award_result, participant_result) => Err(prefer_fatal(
                error,
                [
                    note_result.err(),
                    award_result.err(),
                    participant_result.err(),
                ],
            )),
            (Ok(_), Err(error), award_result, participant_result) => Err(prefer_fatal(
                error,
                [award_result.err(), participant_result.err()],
            )),
            (Ok(_), Ok(_), Err(error), participant_result) => {
                Err(prefer_fatal(error, [participant_result.err()]))
            }
            (Ok(_), Ok(_), Ok(_), Err(error)) => Err(error),
        };

        tracing::debug!(iid, requests, ok = outcome.is_ok(), "fetched merge request activity");

        outcome
            .map(|delta| UnitOutcome { delta, requests })
            .map_err(|error| UnitFailure { error, requests })
    }

    fn budget_exhausted(&self, spent: u32) -> bool {
        self.request_budget
            .is_some_and(|budget| budget.saturating_sub(spent) < REQUESTS_PER_UNIT)
    }

    fn stop_early(&self, reason: PartialReason, result: AggregationResult) -> AggregationError {
        tracing::warn!(
            %reason,
            processed = result.total_processed,
            requested = result.total_requested,
            "aggregation stopped early"
        );
        self.finish(&result);
        AggregationError::Partial {
            reason,
            result: Box::new(result),
        }
    }

    fn finish(&self, result: &AggregationResult) {
        let skipped = u64::try_from(result.skipped.len()).unwrap_or(u64::MAX);
        tracing::info!(
            processed = result.total_processed,
            requested = result.total_requested,
            skipped,
            contributors = result.contributors.len(),
            "aggregation finished"
        );
        self.telemetry.record(TelemetryEvent::AggregationFinished {
            processed: result.total_processed,
            requested: result.total_requested,
            skipped,
            complete: result.is_complete(),
        });
    }
}

/// Requests a collection walk cost; a failed walk is charged one.
fn requests_spent<T>(collected: &Result<Collected<T>, IntakeError>) -> u32 {
    collected
        .as_ref()
        .map_or(1, |collection| collection.requests)
}

/// Picks a fatal error over `first` when one of the others is fatal.
fn prefer_fatal<const N: usize>(
    first: IntakeError,
    others: [Option<IntakeError>; N],
) -> IntakeError {
    if first.is_fatal() {
        return first;
    }
    others
        .into_iter()
        .flatten()
        .find(IntakeError::is_fatal)
        .unwrap_or(first)
}
