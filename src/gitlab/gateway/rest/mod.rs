//! `reqwest`-backed gateway for the GitLab REST API (v4).

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::gitlab::error::IntakeError;
use crate::gitlab::locator::{PersonalAccessToken, ProjectLocator};
use crate::gitlab::models::{
    ApiAwardEmoji, ApiCommit, ApiMergeRequest, ApiNote, ApiUser, AwardEmoji, MergeRequestCommit,
    MergeRequestNote, MergeRequestState, MergeRequestSummary, Participant,
};
use crate::gitlab::pagination::PageInfo;
use crate::gitlab::rate_limit::RateLimitInfo;

use super::MergeRequestGateway;
use super::client::{ApiClientConfig, build_http_client};
use super::error_mapping::{map_http_error, map_transport_error};
use super::http_utils::PRIVATE_TOKEN_HEADER;
use super::types::{Page, PageRequest};

/// Gateway bound to one project, sending authenticated GET requests.
#[derive(Debug, Clone)]
pub struct RestGateway {
    client: reqwest::Client,
    config: ApiClientConfig,
    project: ProjectLocator,
}

impl RestGateway {
    /// Creates a gateway from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::Configuration` when the HTTP client cannot be
    /// built.
    pub fn new(config: ApiClientConfig, project: ProjectLocator) -> Result<Self, IntakeError> {
        Ok(Self {
            client: build_http_client()?,
            config,
            project,
        })
    }

    /// Creates a gateway for the project's own API base with the default
    /// page size.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::Configuration` when the HTTP client cannot be
    /// built.
    pub fn for_token(
        token: &PersonalAccessToken,
        project: ProjectLocator,
    ) -> Result<Self, IntakeError> {
        let config = ApiClientConfig::new(project.api_base().as_str(), token.clone())?;
        Self::new(config, project)
    }

    /// The project this gateway reads from.
    #[must_use]
    pub const fn project(&self) -> &ProjectLocator {
        &self.project
    }

    async fn fetch_page<Api, Item>(
        &self,
        operation: &str,
        path: &str,
        filters: &[(&str, &str)],
        request: PageRequest,
    ) -> Result<Page<Item>, IntakeError>
    where
        Api: DeserializeOwned + Send,
        Item: From<Api> + Send,
    {
        request.validate()?;

        let page_number = request.page().to_string();
        let per_page = request.per_page().to_string();
        let mut query: Vec<(&str, &str)> = filters.to_vec();
        query.push(("page", page_number.as_str()));
        query.push(("per_page", per_page.as_str()));

        tracing::debug!(operation, page = request.page(), "requesting GitLab page");

        let response = self
            .client
            .get(self.config.endpoint(path))
            .header(PRIVATE_TOKEN_HEADER, self.config.credential().value())
            .query(&query)
            .send()
            .await
            .map_err(|error| map_transport_error(operation, &error))?;

        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(operation, status, &headers, &body));
        }

        let records: Vec<Api> = response
            .json()
            .await
            .map_err(|error| map_transport_error(operation, &error))?;

        Ok(Page {
            items: records.into_iter().map(Item::from).collect(),
            page_info: PageInfo::from_headers(request.page(), request.per_page(), &headers),
            rate_limit: RateLimitInfo::from_headers(&headers),
        })
    }
}

#[async_trait]
impl MergeRequestGateway for RestGateway {
    fn page_size(&self) -> u8 {
        self.config.page_size()
    }

    async fn list_merge_requests(
        &self,
        state: MergeRequestState,
        request: PageRequest,
    ) -> Result<Page<MergeRequestSummary>, IntakeError> {
        let filters = [
            ("state", state.as_str()),
            ("order_by", "created_at"),
            ("sort", "desc"),
        ];
        self.fetch_page::<ApiMergeRequest, MergeRequestSummary>(
            "list merge requests",
            &self.project.merge_requests_path(),
            &filters,
            request,
        )
        .await
    }

    async fn list_participants(
        &self,
        iid: u64,
        request: PageRequest,
    ) -> Result<Page<Participant>, IntakeError> {
        self.fetch_page::<ApiUser, Participant>(
            "list participants",
            &self.project.merge_request_resource_path(iid, "participants"),
            &[],
            request,
        )
        .await
    }

    async fn list_commits(
        &self,
        iid: u64,
        request: PageRequest,
    ) -> Result<Page<MergeRequestCommit>, IntakeError> {
        self.fetch_page::<ApiCommit, MergeRequestCommit>(
            "list commits",
            &self.project.merge_request_resource_path(iid, "commits"),
            &[],
            request,
        )
        .await
    }

    async fn list_notes(
        &self,
        iid: u64,
        request: PageRequest,
    ) -> Result<Page<MergeRequestNote>, IntakeError> {
        self.fetch_page::<ApiNote, MergeRequestNote>(
            "list notes",
            &self.project.merge_request_resource_path(iid, "notes"),
            &[],
            request,
        )
        .await
    }

    async fn list_award_emoji(
        &self,
        iid: u64,
        request: PageRequest,
    ) -> Result<Page<AwardEmoji>, IntakeError> {
        self.fetch_page::<ApiAwardEmoji, AwardEmoji>(
            "list award emoji",
            &self.project.merge_request_resource_path(iid, "award_emoji"),
            &[],
            request,
        )
        .await
    }
}
