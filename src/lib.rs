//! Mergescope library crate for GitLab merge request contribution reports.
//!
//! The library crawls a project's merge requests through the GitLab REST
//! API, counts who opened, committed to, commented on and reacted to them,
//! and projects how long a full contributor report will take. Failures are
//! mapped into [`IntakeError`] variants a CLI or web layer can display
//! directly.

pub mod config;
pub mod contributions;
pub mod crawl;
pub mod dashboard;
pub mod estimate;
pub mod gitlab;
pub mod telemetry;

pub use config::{MergescopeConfig, OperationMode};
pub use contributions::{
    AggregationError, AggregationResult, ContributionAggregator, ContributionCounters,
    ContributionKind, PartialReason,
};
pub use crawl::{CrawlFilter, MergeRequestCrawler, ParticipantResolver};
pub use dashboard::{ContributorsReport, Dashboard, DashboardQuery, MergeRequestTotals};
pub use estimate::{CostEstimator, ProgressEstimate};
pub use gitlab::{
    IntakeError, MergeRequestGateway, MergeRequestState, MergeRequestSummary,
    PersonalAccessToken, ProjectLocator, RestGateway,
};
