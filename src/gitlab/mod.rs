//! GitLab merge request intake.
//!
//! This module addresses a project on a GitLab instance, pages through its
//! merge requests and their participants, commits, notes and award emoji,
//! and maps HTTP failures into [`IntakeError`] variants that callers can
//! classify without seeing `reqwest` internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod pagination;
pub mod rate_limit;

pub use error::IntakeError;
pub use gateway::{ApiClientConfig, MergeRequestGateway, Page, PageRequest, RestGateway};
pub use locator::{DEFAULT_API_BASE, PersonalAccessToken, ProjectLocator};
pub use models::{
    AwardEmoji, Identity, MergeRequestCommit, MergeRequestNote, MergeRequestState,
    MergeRequestSummary, Participant,
};
pub use pagination::PageInfo;
pub use rate_limit::RateLimitInfo;

#[cfg(test)]
pub use gateway::MockMergeRequestGateway;
