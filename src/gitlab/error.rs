//! Error types exposed by the GitLab intake layer.

use thiserror::Error;

use super::rate_limit::RateLimitInfo;

/// Errors surfaced while parsing input or communicating with GitLab.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntakeError {
    /// No personal access token was configured.
    #[error("personal access token is required")]
    MissingToken,

    /// Neither a project identifier nor a repository URL was configured.
    #[error("project identifier is required (use --project or --repository-url)")]
    MissingProject,

    /// The provided URL could not be parsed.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// The project identifier is blank or malformed.
    #[error("project identifier is invalid: {0}")]
    InvalidProject(String),

    /// A merge request state name was not recognised.
    #[error("unknown merge request state: {0}")]
    InvalidState(String),

    /// The token was rejected by GitLab (401).
    #[error("Unauthorized. Please check your GitLab token. ({message})")]
    Authentication {
        /// GitLab error message returned with the response.
        message: String,
    },

    /// The project or sub-resource does not exist (404).
    #[error("Project not found. Please check your project identifier. ({message})")]
    NotFound {
        /// GitLab error message returned with the response.
        message: String,
    },

    /// GitLab returned a non-success status outside the other categories.
    #[error("GitLab API error: {message}")]
    Api {
        /// Status and body detail describing the failure.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode GitLab response: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },

    /// Networking failed or GitLab returned a server error.
    #[error("network error talking to GitLab: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// GitLab throttled the request with 429.
    #[error("GitLab API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Rate limit info if available from response headers.
        rate_limit: Option<RateLimitInfo>,
        /// Error message from GitLab.
        message: String,
    },

    /// Invalid pagination parameters.
    #[error("invalid pagination: {message}")]
    InvalidPagination {
        /// Description of the invalid parameter.
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,
}

impl IntakeError {
    /// Returns true when every later request would fail the same way.
    ///
    /// A rejected credential aborts whole operations, including aggregation
    /// passes that otherwise skip individual failing merge requests.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns true for failures a caller may reasonably retry with backoff.
    ///
    /// The intake layer never retries on its own.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::RateLimitExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::IntakeError;

    #[rstest]
    #[case::auth(IntakeError::Authentication { message: "401".to_owned() }, true, false)]
    #[case::not_found(IntakeError::NotFound { message: "404".to_owned() }, false, false)]
    #[case::network(IntakeError::Network { message: "reset".to_owned() }, false, true)]
    #[case::rate_limit(
        IntakeError::RateLimitExceeded { rate_limit: None, message: "429".to_owned() },
        false,
        true
    )]
    #[case::cancelled(IntakeError::Cancelled, false, false)]
    fn classifies_errors(
        #[case] error: IntakeError,
        #[case] fatal: bool,
        #[case] retryable: bool,
    ) {
        assert_eq!(error.is_fatal(), fatal, "fatal mismatch for {error:?}");
        assert_eq!(
            error.is_retryable(),
            retryable,
            "retryable mismatch for {error:?}"
        );
    }

    #[rstest]
    fn authentication_message_keeps_dashboard_wording() {
        let error = IntakeError::Authentication {
            message: "401 Unauthorized".to_owned(),
        };
        assert!(
            error
                .to_string()
                .starts_with("Unauthorized. Please check your GitLab token."),
            "unexpected message: {error}"
        );
    }
}
