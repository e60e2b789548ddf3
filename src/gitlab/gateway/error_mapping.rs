//! Error mapping helpers for the REST gateway.

use http::{HeaderMap, StatusCode};

use crate::gitlab::error::IntakeError;
use crate::gitlab::rate_limit::RateLimitInfo;

use super::http_utils::extract_gitlab_message;

/// Checks if a status indicates a rejected credential.
///
/// 403 is not one: GitLab answers it for single resources the token may
/// not read, so it maps to a skippable [`IntakeError::Api`].
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED)
}

/// Maps a non-success response into the intake taxonomy.
pub(super) fn map_http_error(
    operation: &str,
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
) -> IntakeError {
    let message = extract_gitlab_message(body).unwrap_or_else(|| "unknown error".to_owned());

    if is_auth_failure(status) {
        return IntakeError::Authentication {
            message: format!("{operation} failed: GitLab returned {status} {message}"),
        };
    }

    if status == StatusCode::FORBIDDEN {
        return IntakeError::Api {
            message: format!("{operation} failed: access denied ({message})"),
        };
    }

    if status == StatusCode::NOT_FOUND {
        return IntakeError::NotFound {
            message: format!("{operation} failed: {message}"),
        };
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let rate_limit = RateLimitInfo::from_headers(headers);
        let base_message = format!("{operation} failed: {message}");
        let detailed = match &rate_limit {
            Some(info) => format!(
                "{base_message} (resets at {reset})",
                reset = info.reset_at().to_rfc3339()
            ),
            None => base_message,
        };
        return IntakeError::RateLimitExceeded {
            rate_limit,
            message: detailed,
        };
    }

    if status.is_server_error() {
        return IntakeError::Network {
            message: format!("{operation} failed with status {status}: {message}"),
        };
    }

    IntakeError::Api {
        message: format!("{operation} failed with status {status}: {message}"),
    }
}

/// Maps a `reqwest` failure that happened before a status was available,
/// or while reading the body.
pub(super) fn map_transport_error(operation: &str, error: &reqwest::Error) -> IntakeError {
    if error.is_decode() {
        return IntakeError::Decode {
            message: format!("{operation}: {error}"),
        };
    }

    IntakeError::Network {
        message: format!("{operation} failed: {error}"),
    }
}
