//! Client configuration and `reqwest` construction for gateway
//! implementations.

use url::Url;

use crate::gitlab::error::IntakeError;
use crate::gitlab::locator::PersonalAccessToken;
use crate::gitlab::pagination::MAX_PAGE_SIZE;

use super::types::PageRequest;

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("mergescope/", env!("CARGO_PKG_VERSION"));

/// Explicit connection settings handed to a gateway at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClientConfig {
    base_url: Url,
    credential: PersonalAccessToken,
    page_size: u8,
}

impl ApiClientConfig {
    /// Creates a configuration with the maximum page size.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidUrl` when `base_url` does not parse.
    pub fn new(base_url: &str, credential: PersonalAccessToken) -> Result<Self, IntakeError> {
        let parsed = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|error| IntakeError::InvalidUrl(error.to_string()))?;
        Ok(Self {
            base_url: parsed,
            credential,
            page_size: MAX_PAGE_SIZE,
        })
    }

    /// Overrides the page size.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidPagination` when the size falls outside
    /// `1..=100`.
    pub fn with_page_size(mut self, page_size: u8) -> Result<Self, IntakeError> {
        PageRequest::first(page_size).validate()?;
        self.page_size = page_size;
        Ok(self)
    }

    /// API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Token sent in the `PRIVATE-TOKEN` header.
    #[must_use]
    pub const fn credential(&self) -> &PersonalAccessToken {
        &self.credential
    }

    /// Records requested per page.
    #[must_use]
    pub const fn page_size(&self) -> u8 {
        self.page_size
    }

    /// Joins a path relative to the API base.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Builds the HTTP client shared by all requests of one gateway.
///
/// No request timeout is configured; callers bound whole operations.
///
/// # Errors
///
/// Returns `IntakeError::Configuration` when the TLS backend cannot be
/// initialised.
pub(super) fn build_http_client() -> Result<reqwest::Client, IntakeError> {
    reqwest::Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|error| IntakeError::Configuration {
            message: format!("failed to configure GitLab HTTP client: {error}"),
        })
}
