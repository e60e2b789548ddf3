//! Gateways for loading merge request data from GitLab.
//!
//! The trait-based design enables mocking in tests while [`RestGateway`]
//! handles real HTTP requests. Each gateway call fetches exactly one page of
//! one collection and never retries.

mod client;
mod error_mapping;
mod http_utils;
mod paging;
mod rest;
mod types;

pub use client::{ApiClientConfig, DEFAULT_USER_AGENT};
pub use paging::{Collected, collect_all};
pub use rest::RestGateway;
pub use types::{Page, PageRequest};

use async_trait::async_trait;

use crate::gitlab::error::IntakeError;
use crate::gitlab::models::{
    AwardEmoji, MergeRequestCommit, MergeRequestNote, MergeRequestState, MergeRequestSummary,
    Participant,
};

/// Gateway over the read-only merge request endpoints of one project.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MergeRequestGateway: Send + Sync {
    /// Page size this gateway was configured with.
    fn page_size(&self) -> u8;

    /// List one page of merge requests in the given state.
    async fn list_merge_requests(
        &self,
        state: MergeRequestState,
        request: PageRequest,
    ) -> Result<Page<MergeRequestSummary>, IntakeError>;

    /// List one page of participants of a merge request.
    async fn list_participants(
        &self,
        iid: u64,
        request: PageRequest,
    ) -> Result<Page<Participant>, IntakeError>;

    /// List one page of commits on a merge request.
    async fn list_commits(
        &self,
        iid: u64,
        request: PageRequest,
    ) -> Result<Page<MergeRequestCommit>, IntakeError>;

    /// List one page of notes on a merge request.
    async fn list_notes(
        &self,
        iid: u64,
        request: PageRequest,
    ) -> Result<Page<MergeRequestNote>, IntakeError>;

    /// List one page of emoji reactions on a merge request.
    async fn list_award_emoji(
        &self,
        iid: u64,
        request: PageRequest,
    ) -> Result<Page<AwardEmoji>, IntakeError>;
}
