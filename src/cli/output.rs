//! Output formatting utilities for CLI operations.

use std::io::{self, Write};

use mergescope::contributions::{ChartSeries, PartialReason, sorted_by};
use mergescope::estimate::ProgressEstimate;
use mergescope::gitlab::models::Identity;
use mergescope::{
    AggregationResult, ContributionKind, IntakeError, MergeRequestSummary, MergeRequestTotals,
};
use serde::Serialize;

/// Contributor report as printed by the CLI.
#[derive(Debug, Serialize)]
pub struct ContributorsOutput<'report> {
    /// True when every merge request was merged into the counters.
    pub complete: bool,
    /// Why the pass stopped early, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_reason: Option<PartialReason>,
    /// Aggregated counters.
    pub result: &'report AggregationResult,
    /// Estimate at the end of the pass.
    pub estimate: ProgressEstimate,
    /// Ranked series, one per contribution kind.
    pub charts: Vec<ChartSeries>,
}

impl<'report> ContributorsOutput<'report> {
    /// Builds the printable report, computing every chart series.
    #[must_use]
    pub fn new(
        result: &'report AggregationResult,
        estimate: ProgressEstimate,
        partial_reason: Option<PartialReason>,
    ) -> Self {
        Self {
            complete: partial_reason.is_none() && result.is_complete(),
            partial_reason,
            result,
            estimate,
            charts: ContributionKind::ALL
                .into_iter()
                .map(|kind| sorted_by(result, kind))
                .collect(),
        }
    }
}

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<(), IntakeError> {
    serde_json::to_writer_pretty(&mut *writer, value).map_err(|error| IntakeError::Io {
        message: error.to_string(),
    })?;
    writeln!(writer).map_err(|e| io_error(&e))
}

/// Writes one line per merge request and a count.
pub fn write_crawl_summary<W: Write>(
    writer: &mut W,
    summaries: &[MergeRequestSummary],
) -> Result<(), IntakeError> {
    for summary in summaries {
        writeln!(
            writer,
            "!{} [{}] {} (@{}) {}",
            summary.iid,
            summary.state,
            summary.title,
            summary.author,
            summary.created_at.format("%Y-%m-%d")
        )
        .map_err(|e| io_error(&e))?;

        if let Some(participants) = &summary.participants {
            let names: Vec<&str> = participants.iter().map(Identity::as_str).collect();
            writeln!(writer, "  participants: {}", names.join(", ")).map_err(|e| io_error(&e))?;
        }
    }

    writeln!(writer, "{} merge requests", summaries.len()).map_err(|e| io_error(&e))
}

/// Writes a contributor table ordered by total contributions.
pub fn write_contributors_summary<W: Write>(
    writer: &mut W,
    report: &ContributorsOutput<'_>,
) -> Result<(), IntakeError> {
    let result = report.result;
    writeln!(
        writer,
        "Contributors ({} of {} merge requests processed):",
        result.total_processed, result.total_requested
    )
    .map_err(|e| io_error(&e))?;

    for entry in sorted_by(result, ContributionKind::Total).entries {
        let Some(counters) = result.counters(&entry.identity) else {
            continue;
        };
        writeln!(
            writer,
            "  {:<24} opened {:>4}  committed {:>4}  commented {:>4}  reacted {:>4}  total {:>5}",
            entry.identity.as_str(),
            counters.opened,
            counters.committed,
            counters.commented,
            counters.reacted,
            entry.value
        )
        .map_err(|e| io_error(&e))?;
    }

    for skipped in &result.skipped {
        writeln!(writer, "Skipped !{}: {}", skipped.iid, skipped.reason)
            .map_err(|e| io_error(&e))?;
    }

    if let Some(reason) = report.partial_reason {
        writeln!(writer, "Partial result: {reason}").map_err(|e| io_error(&e))?;
    }

    writeln!(
        writer,
        "Elapsed {}s, estimated {}s",
        report.estimate.elapsed.as_secs(),
        report.estimate.estimated.as_secs()
    )
    .map_err(|e| io_error(&e))
}

/// Writes per-state counts and the projected report duration.
pub fn write_totals_summary<W: Write>(
    writer: &mut W,
    totals: &MergeRequestTotals,
) -> Result<(), IntakeError> {
    writeln!(writer, "Merge requests:").map_err(|e| io_error(&e))?;
    for (state, count) in &totals.per_state {
        writeln!(writer, "  {state}: {count}").map_err(|e| io_error(&e))?;
    }
    writeln!(writer, "Total: {}", totals.total).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "Estimated contributor report time: {}s",
        totals.estimate.estimated.as_secs()
    )
    .map_err(|e| io_error(&e))
}

/// Converts an I/O error to an [`IntakeError::Io`].
pub(crate) fn io_error(error: &io::Error) -> IntakeError {
    IntakeError::Io {
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use mergescope::contributions::PartialReason;
    use mergescope::gitlab::models::Identity;
    use mergescope::gitlab::models::test_support::merge_request;
    use mergescope::{AggregationResult, ContributionCounters, CostEstimator, MergeRequestTotals};

    use super::{
        ContributorsOutput, write_contributors_summary, write_crawl_summary, write_json,
        write_totals_summary,
    };

    fn result_with(entries: &[(&str, ContributionCounters)]) -> AggregationResult {
        let mut result = AggregationResult::new(2);
        for (name, counters) in entries {
            result.contributors.insert(Identity::new(*name), *counters);
        }
        result.total_processed = 2;
        result
    }

    #[test]
    fn write_totals_summary_lists_states_and_estimate() {
        let totals = MergeRequestTotals {
            per_state: BTreeMap::from([("opened".to_owned(), 12), ("closed".to_owned(), 30)]),
            total: 42,
            estimate: CostEstimator::default().estimate(42),
        };

        let mut buffer = Vec::new();
        write_totals_summary(&mut buffer, &totals).expect("should write totals");

        let output = String::from_utf8(buffer).expect("output should be valid UTF-8");
        insta::assert_snapshot!(output.trim_end(), @r"
        Merge requests:
          closed: 30
          opened: 12
        Total: 42
        Estimated contributor report time: 63s
        ");
    }

    #[test]
    fn write_crawl_summary_includes_participants_when_resolved() {
        let summary = merge_request(7, "alice")
            .with_participants(vec![Identity::new("alice"), Identity::new("bob")]);

        let mut buffer = Vec::new();
        write_crawl_summary(&mut buffer, &[summary]).expect("should write summary");

        let output = String::from_utf8(buffer).expect("output should be valid UTF-8");
        assert!(
            output.contains("!7 [opened] Merge request 7 (@alice) 2025-01-01"),
            "missing merge request line: {output}"
        );
        assert!(
            output.contains("participants: alice, bob"),
            "missing participants: {output}"
        );
        assert!(output.ends_with("1 merge requests\n"), "missing count: {output}");
    }

    #[test]
    fn write_contributors_summary_orders_by_total_and_flags_partial() {
        let result = result_with(&[
            (
                "alice",
                ContributionCounters {
                    opened: 1,
                    ..ContributionCounters::default()
                },
            ),
            (
                "bob",
                ContributionCounters {
                    committed: 4,
                    reacted: 1,
                    ..ContributionCounters::default()
                },
            ),
        ]);
        let report = ContributorsOutput::new(
            &result,
            CostEstimator::default().estimate(2),
            Some(PartialReason::Cancelled),
        );

        let mut buffer = Vec::new();
        write_contributors_summary(&mut buffer, &report).expect("should write report");

        let output = String::from_utf8(buffer).expect("output should be valid UTF-8");
        let bob = output.find("bob").expect("bob should be listed");
        let alice = output.find("alice").expect("alice should be listed");
        assert!(bob < alice, "bob has more contributions: {output}");
        assert!(
            output.contains("Partial result: cancelled"),
            "missing partial flag: {output}"
        );
        assert!(!report.complete);
    }

    #[test]
    fn contributors_json_carries_charts_and_completion() {
        let result = result_with(&[(
            "carol",
            ContributionCounters {
                commented: 2,
                ..ContributionCounters::default()
            },
        )]);
        let report = ContributorsOutput::new(&result, CostEstimator::default().estimate(2), None);

        let mut buffer = Vec::new();
        write_json(&mut buffer, &report).expect("should write JSON");

        let json: serde_json::Value =
            serde_json::from_slice(&buffer).expect("output should be JSON");
        assert_eq!(json["complete"], true);
        assert_eq!(json["result"]["contributors"]["carol"]["commented"], 2);
        assert_eq!(json["charts"][0]["label"], "Total Contributions");
        assert!(json.get("partial_reason").is_none());
    }
}
