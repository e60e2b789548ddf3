//! Per-contributor activity counts.
//!
//! An aggregation pass reduces each merge request to a
//! [`ContributionDelta`] and folds it into one [`AggregationResult`]. Deltas
//! only ever add, so merging them in any order gives the same counters.

mod aggregator;
pub mod projection;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::gitlab::models::{
    AwardEmoji, Identity, MergeRequestCommit, MergeRequestNote, MergeRequestSummary, Participant,
};

pub use aggregator::{AggregationError, ContributionAggregator, PartialReason};
pub use projection::{ChartEntry, ChartSeries, ContributionKind, sorted_by};

/// Activity of one contributor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContributionCounters {
    /// Merge requests authored.
    pub opened: u64,
    /// Commits authored on merge requests.
    pub committed: u64,
    /// Human-authored notes.
    pub commented: u64,
    /// Emoji reactions awarded.
    pub reacted: u64,
}

impl ContributionCounters {
    /// Sum of all four counters.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.opened
            .saturating_add(self.committed)
            .saturating_add(self.commented)
            .saturating_add(self.reacted)
    }

    /// Adds `other` counter by counter.
    pub const fn absorb(&mut self, other: &Self) {
        self.opened = self.opened.saturating_add(other.opened);
        self.committed = self.committed.saturating_add(other.committed);
        self.commented = self.commented.saturating_add(other.commented);
        self.reacted = self.reacted.saturating_add(other.reacted);
    }
}

/// Contributions found on a single merge request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionDelta {
    counters: BTreeMap<Identity, ContributionCounters>,
}

impl ContributionDelta {
    /// Reduces one merge request and its sub-resources.
    ///
    /// System notes are ignored; every commit, human note and award counts
    /// once for its author. Commit authors are matched against
    /// `participants` so git display names count under GitLab usernames.
    #[must_use]
    pub fn from_unit(
        summary: &MergeRequestSummary,
        commits: &[MergeRequestCommit],
        notes: &[MergeRequestNote],
        awards: &[AwardEmoji],
        participants: &[Participant],
    ) -> Self {
        let mut delta = Self::default();
        delta.entry(&summary.author).opened += 1;
        for commit in commits {
            delta.entry(&commit.author_identity(participants)).committed += 1;
        }
        for note in notes.iter().filter(|note| !note.system) {
            delta.entry(&note.author).commented += 1;
        }
        for award in awards {
            delta.entry(&award.user).reacted += 1;
        }
        delta
    }

    /// Counters for `identity`, if it contributed.
    #[must_use]
    pub fn get(&self, identity: &Identity) -> Option<&ContributionCounters> {
        self.counters.get(identity)
    }

    fn entry(&mut self, identity: &Identity) -> &mut ContributionCounters {
        self.counters.entry(identity.clone()).or_default()
    }
}

/// A merge request left out of a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedUnit {
    /// Project-local merge request number.
    pub iid: u64,
    /// Why its sub-resources could not be loaded.
    pub reason: String,
}

/// Outcome of an aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationResult {
    /// Counters per contributor, ordered by username.
    pub contributors: BTreeMap<Identity, ContributionCounters>,
    /// Merge requests whose contributions were merged.
    pub total_processed: u64,
    /// Merge requests the pass was asked to process.
    pub total_requested: u64,
    /// Merge requests left out after non-fatal failures.
    pub skipped: Vec<SkippedUnit>,
}

impl AggregationResult {
    /// An empty result for a pass over `total_requested` merge requests.
    #[must_use]
    pub fn new(total_requested: u64) -> Self {
        Self {
            total_requested,
            ..Self::default()
        }
    }

    /// True when every requested merge request was merged.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total_processed == self.total_requested
    }

    /// Counters for `identity`, if it contributed.
    #[must_use]
    pub fn counters(&self, identity: &Identity) -> Option<&ContributionCounters> {
        self.contributors.get(identity)
    }

    /// Merge requests handled so far, merged or skipped.
    #[must_use]
    pub fn completed_units(&self) -> u64 {
        let skipped = u64::try_from(self.skipped.len()).unwrap_or(u64::MAX);
        self.total_processed.saturating_add(skipped)
    }

    /// Folds one merge request's delta into the result.
    pub fn merge(&mut self, delta: ContributionDelta) {
        for (identity, counters) in delta.counters {
            self.contributors
                .entry(identity)
                .or_default()
                .absorb(&counters);
        }
        self.total_processed = self.total_processed.saturating_add(1);
    }

    /// Records a merge request that could not be aggregated.
    pub fn skip(&mut self, iid: u64, reason: impl Into<String>) {
        self.skipped.push(SkippedUnit {
            iid,
            reason: reason.into(),
        });
    }
}
