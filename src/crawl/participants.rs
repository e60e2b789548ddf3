//! Opt-in participant resolution.
//!
//! Resolving participants costs at least one request per merge request, so
//! it is never part of a plain crawl.

use tokio_util::sync::CancellationToken;

use crate::gitlab::error::IntakeError;
use crate::gitlab::gateway::{MergeRequestGateway, collect_all};
use crate::gitlab::models::MergeRequestSummary;

/// Attaches participant lists to crawled summaries.
pub struct ParticipantResolver<'client, Gateway>
where
    Gateway: MergeRequestGateway,
{
    client: &'client Gateway,
}

impl<'client, Gateway> ParticipantResolver<'client, Gateway>
where
    Gateway: MergeRequestGateway,
{
    /// Create a resolver using the provided gateway.
    #[must_use]
    pub const fn new(client: &'client Gateway) -> Self {
        Self { client }
    }

    /// Returns a copy of `summary` with every participant page attached.
    ///
    /// # Errors
    ///
    /// Propagates the first gateway failure.
    pub async fn resolve(
        &self,
        summary: &MergeRequestSummary,
    ) -> Result<MergeRequestSummary, IntakeError> {
        let collected = collect_all(self.client.page_size(), |request| {
            self.client.list_participants(summary.iid, request)
        })
        .await?;

        tracing::debug!(
            iid = summary.iid,
            participants = collected.items.len(),
            requests = collected.requests,
            "resolved participants"
        );

        let usernames = collected
            .items
            .into_iter()
            .map(|participant| participant.username)
            .collect();
        Ok(summary.with_participants(usernames))
    }

    /// Resolves each summary in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Propagates the first gateway failure, or returns
    /// [`IntakeError::Cancelled`] when `cancel` fires between merge requests.
    pub async fn resolve_all(
        &self,
        summaries: &[MergeRequestSummary],
        cancel: &CancellationToken,
    ) -> Result<Vec<MergeRequestSummary>, IntakeError> {
        let mut resolved = Vec::with_capacity(summaries.len());
        for summary in summaries {
            if cancel.is_cancelled() {
                return Err(IntakeError::Cancelled);
            }
            resolved.push(self.resolve(summary).await?);
        }
        Ok(resolved)
    }
}
