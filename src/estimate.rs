//! Advisory duration projections for aggregation passes.
//!
//! Estimates are computed from a fixed per-unit cost and elapsed wall-clock
//! time. They do not measure outstanding API calls and real latency varies
//! with upstream load and merge request size, so callers should present them
//! as approximate.

use std::time::Duration;

use serde::{Serialize, Serializer};

/// Per-merge-request cost used when none is configured.
pub const DEFAULT_PER_UNIT_COST: Duration = Duration::from_millis(1500);

/// Projects aggregation duration from a per-unit cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostEstimator {
    per_unit_cost: Duration,
}

impl CostEstimator {
    /// Create an estimator charging `per_unit_cost` per merge request.
    #[must_use]
    pub const fn new(per_unit_cost: Duration) -> Self {
        Self { per_unit_cost }
    }

    /// Cost charged per merge request.
    #[must_use]
    pub const fn per_unit_cost(&self) -> Duration {
        self.per_unit_cost
    }

    /// Initial projection for `total_units` merge requests, before any work.
    #[must_use]
    pub fn estimate(&self, total_units: u64) -> ProgressEstimate {
        let estimated = scale(self.per_unit_cost, u128::from(total_units), 1);
        ProgressEstimate {
            total_units,
            completed_units: 0,
            estimated,
            elapsed: Duration::ZERO,
            remaining: estimated,
        }
    }
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_PER_UNIT_COST)
    }
}

/// Snapshot of an estimate at some point of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEstimate {
    /// Merge requests the pass will process.
    pub total_units: u64,
    /// Merge requests already handled.
    pub completed_units: u64,
    /// Projected total duration.
    #[serde(rename = "estimated_seconds", serialize_with = "as_seconds")]
    pub estimated: Duration,
    /// Wall-clock time spent so far.
    #[serde(rename = "elapsed_seconds", serialize_with = "as_seconds")]
    pub elapsed: Duration,
    /// Projected time left, never negative.
    #[serde(rename = "remaining_seconds", serialize_with = "as_seconds")]
    pub remaining: Duration,
}

impl ProgressEstimate {
    /// Re-projects the remaining time from elapsed time alone.
    ///
    /// The total estimate is unchanged; `remaining` saturates at zero once the
    /// pass overruns it.
    #[must_use]
    pub const fn project(&self, elapsed: Duration) -> Self {
        Self {
            elapsed,
            remaining: self.estimated.saturating_sub(elapsed),
            ..*self
        }
    }

    /// Re-projects using the mean cost observed over `completed` units.
    ///
    /// Falls back to [`Self::project`] until a unit has completed.
    #[must_use]
    pub fn refine(&self, completed: u64, elapsed: Duration) -> Self {
        let completed_units = completed.min(self.total_units);
        if completed_units == 0 {
            return self.project(elapsed);
        }

        let outstanding = self.total_units.saturating_sub(completed_units);
        let remaining = scale(
            elapsed,
            u128::from(outstanding),
            u128::from(completed_units),
        );
        Self {
            total_units: self.total_units,
            completed_units,
            estimated: elapsed.saturating_add(remaining),
            elapsed,
            remaining,
        }
    }

    /// Share of the estimate already elapsed, from 0 to 100.
    #[must_use]
    pub fn percent_complete(&self) -> u8 {
        let estimated = self.estimated.as_millis();
        if estimated == 0 {
            return 100;
        }
        let percent = self
            .elapsed
            .as_millis()
            .saturating_mul(100)
            .checked_div(estimated)
            .unwrap_or(100)
            .min(100);
        u8::try_from(percent).unwrap_or(100)
    }
}

/// `duration × numerator ÷ denominator` at millisecond resolution.
fn scale(duration: Duration, numerator: u128, denominator: u128) -> Duration {
    let millis = duration
        .as_millis()
        .saturating_mul(numerator)
        .checked_div(denominator)
        .unwrap_or(0);
    Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
}

fn as_seconds<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::{CostEstimator, DEFAULT_PER_UNIT_COST};

    #[rstest]
    fn estimate_of_nothing_is_zero() {
        let estimate = CostEstimator::default().estimate(0);
        assert_eq!(estimate.estimated, Duration::ZERO);
        assert_eq!(estimate.remaining, Duration::ZERO);
        assert_eq!(estimate.percent_complete(), 100);
    }

    #[rstest]
    #[case(1)]
    #[case(10)]
    #[case(250)]
    fn estimate_is_linear(#[case] units: u32) {
        let estimator = CostEstimator::default();
        assert_eq!(
            estimator.estimate(u64::from(units)).estimated,
            DEFAULT_PER_UNIT_COST * units
        );
    }

    #[rstest]
    #[case::early(Duration::from_secs(5), Duration::from_secs(10))]
    #[case::overrun(Duration::from_secs(60), Duration::ZERO)]
    fn project_saturates_remaining(#[case] elapsed: Duration, #[case] remaining: Duration) {
        let estimate = CostEstimator::new(Duration::from_secs(3)).estimate(5);

        let projected = estimate.project(elapsed);

        assert_eq!(projected.remaining, remaining);
        assert_eq!(projected.estimated, Duration::from_secs(15));
    }

    #[rstest]
    fn refine_uses_observed_mean_cost() {
        let estimate = CostEstimator::default().estimate(4);

        let refined = estimate.refine(1, Duration::from_secs(2));

        assert_eq!(refined.remaining, Duration::from_secs(6));
        assert_eq!(refined.estimated, Duration::from_secs(8));
        assert_eq!(refined.completed_units, 1);
    }

    #[rstest]
    fn refine_without_completed_units_projects() {
        let estimate = CostEstimator::default().estimate(2);

        let refined = estimate.refine(0, Duration::from_secs(1));

        assert_eq!(refined, estimate.project(Duration::from_secs(1)));
    }

    #[rstest]
    #[case(Duration::ZERO, 0)]
    #[case(Duration::from_millis(750), 25)]
    #[case(Duration::from_secs(30), 100)]
    fn percent_complete_is_capped(#[case] elapsed: Duration, #[case] expected: u8) {
        let estimate = CostEstimator::default().estimate(2).project(elapsed);
        assert_eq!(estimate.percent_complete(), expected);
    }

    #[rstest]
    fn serialises_durations_as_seconds() {
        let estimate = CostEstimator::default()
            .estimate(2)
            .project(Duration::from_millis(500));

        let json = serde_json::to_value(estimate).expect("estimate should serialise");

        assert_eq!(json["estimated_seconds"], 3.0);
        assert_eq!(json["remaining_seconds"], 2.5);
        assert_eq!(json["total_units"], 2);
    }
}
