//! Chart-ready projections of an aggregation result.
//!
//! Every projection is recomputed from the result on demand; nothing is
//! cached between calls.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::gitlab::models::Identity;

use super::{AggregationResult, ContributionCounters};

/// Which counter a projection ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    /// Merge requests authored.
    Opened,
    /// Commits authored.
    Committed,
    /// Human-authored notes.
    Commented,
    /// Emoji reactions awarded.
    Reacted,
    /// Sum of the other four.
    Total,
}

impl ContributionKind {
    /// Every kind, in dashboard order.
    pub const ALL: [Self; 5] = [
        Self::Total,
        Self::Reacted,
        Self::Commented,
        Self::Committed,
        Self::Opened,
    ];

    /// Chart title for this kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Opened => "Opened MRs",
            Self::Committed => "Commits",
            Self::Commented => "Comments",
            Self::Reacted => "Reactions",
            Self::Total => "Total Contributions",
        }
    }

    /// Name used on the command line and in JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Committed => "committed",
            Self::Commented => "commented",
            Self::Reacted => "reacted",
            Self::Total => "total",
        }
    }
}

impl fmt::Display for ContributionKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ContributionKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown contribution kind: {value}"))
    }
}

impl ContributionCounters {
    /// The counter selected by `kind`.
    #[must_use]
    pub const fn value(&self, kind: ContributionKind) -> u64 {
        match kind {
            ContributionKind::Opened => self.opened,
            ContributionKind::Committed => self.committed,
            ContributionKind::Commented => self.commented,
            ContributionKind::Reacted => self.reacted,
            ContributionKind::Total => self.total(),
        }
    }
}

/// One bar of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartEntry {
    /// Contributor.
    pub identity: Identity,
    /// Counter value, always positive.
    pub value: u64,
}

/// Ranked values of one counter across contributors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    /// Which counter was ranked.
    pub kind: ContributionKind,
    /// Chart title.
    pub label: &'static str,
    /// Contributors with a non-zero value, highest first.
    pub entries: Vec<ChartEntry>,
    /// Largest value, zero when `entries` is empty.
    pub max: u64,
}

/// Ranks contributors by one counter.
///
/// Zero values are dropped. Ties are broken by username so the output is
/// deterministic.
#[must_use]
pub fn sorted_by(result: &AggregationResult, kind: ContributionKind) -> ChartSeries {
    let mut entries: Vec<ChartEntry> = result
        .contributors
        .iter()
        .map(|(identity, counters)| ChartEntry {
            identity: identity.clone(),
            value: counters.value(kind),
        })
        .filter(|entry| entry.value > 0)
        .collect();
    entries.sort_by(|left, right| {
        right
            .value
            .cmp(&left.value)
            .then_with(|| left.identity.cmp(&right.identity))
    });
    let max = entries.first().map_or(0, |entry| entry.value);

    ChartSeries {
        kind,
        label: kind.label(),
        entries,
        max,
    }
}
