//! Project addressing and credential wrappers for GitLab intake.

use url::Url;

use super::error::IntakeError;

/// Default API base for gitlab.com.
pub const DEFAULT_API_BASE: &str = "https://gitlab.com/api/v4";

/// Personal access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, IntakeError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IntakeError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl std::fmt::Debug for PersonalAccessToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("PersonalAccessToken(***)")
    }
}

/// Identifies a GitLab project by numeric id or `namespace/project` path.
///
/// # Example
///
/// ```
/// use mergescope::ProjectLocator;
///
/// let locator = ProjectLocator::parse_repository_url("https://gitlab.example.com/group/sub/app")
///     .expect("should parse repository URL");
/// assert_eq!(locator.project(), "group/sub/app");
/// assert_eq!(locator.api_base().as_str(), "https://gitlab.example.com/api/v4");
/// assert_eq!(locator.merge_requests_path(), "projects/group%2Fsub%2Fapp/merge_requests");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLocator {
    api_base: Url,
    project: String,
}

impl ProjectLocator {
    /// Creates a locator from an API base URL and a project id or path.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidUrl` when the base URL does not parse and
    /// `IntakeError::InvalidProject` when the project is blank or has empty
    /// path segments.
    pub fn new(api_base: &str, project: &str) -> Result<Self, IntakeError> {
        let parsed = Url::parse(api_base.trim_end_matches('/'))
            .map_err(|error| IntakeError::InvalidUrl(error.to_string()))?;
        Ok(Self {
            api_base: parsed,
            project: validate_project(project)?,
        })
    }

    /// Creates a locator for a project hosted on gitlab.com.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidProject` when the project is malformed.
    pub fn on_gitlab_com(project: &str) -> Result<Self, IntakeError> {
        Self::new(DEFAULT_API_BASE, project)
    }

    /// Parses a repository web URL such as
    /// `https://gitlab.com/group/project` and derives the API base from its
    /// host.
    ///
    /// A trailing `.git` and GitLab's `/-/` route suffixes are ignored.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidUrl` when parsing fails or the URL has no
    /// host, and `IntakeError::InvalidProject` when the path is empty.
    pub fn parse_repository_url(input: &str) -> Result<Self, IntakeError> {
        let parsed =
            Url::parse(input).map_err(|error| IntakeError::InvalidUrl(error.to_string()))?;
        let api_base = derive_api_base(&parsed)?;

        let path = parsed.path().trim_matches('/');
        let without_routes = path.split("/-/").next().unwrap_or_default();
        let project = without_routes
            .strip_suffix(".git")
            .unwrap_or(without_routes);

        Ok(Self {
            api_base,
            project: validate_project(project)?,
        })
    }

    /// API base URL, e.g. `https://gitlab.com/api/v4`.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Project id or path as configured.
    #[must_use]
    pub const fn project(&self) -> &str {
        self.project.as_str()
    }

    /// Project identifier with `/` escaped for use in a URL path.
    #[must_use]
    pub fn encoded_project(&self) -> String {
        self.project.replace('/', "%2F")
    }

    /// Path of the merge request collection, relative to the API base.
    #[must_use]
    pub fn merge_requests_path(&self) -> String {
        format!("projects/{}/merge_requests", self.encoded_project())
    }

    /// Path of a sub-resource of one merge request, relative to the API
    /// base.
    #[must_use]
    pub fn merge_request_resource_path(&self, iid: u64, resource: &str) -> String {
        format!("{}/{iid}/{resource}", self.merge_requests_path())
    }
}

fn validate_project(project: &str) -> Result<String, IntakeError> {
    let trimmed = project.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(IntakeError::InvalidProject(
            "project must not be empty".to_owned(),
        ));
    }
    if trimmed.split('/').any(str::is_empty) {
        return Err(IntakeError::InvalidProject(format!(
            "project path `{trimmed}` contains an empty segment"
        )));
    }
    Ok(trimmed.to_owned())
}

fn derive_api_base(parsed: &Url) -> Result<Url, IntakeError> {
    let host = parsed
        .host_str()
        .ok_or_else(|| IntakeError::InvalidUrl("URL must include a host".to_owned()))?;
    let authority = if host.contains(':') {
        format!("[{host}]")
    } else {
        host.to_owned()
    };
    let mut api_url = Url::parse(&format!("{}://{authority}", parsed.scheme()))
        .map_err(|error| IntakeError::InvalidUrl(error.to_string()))?;

    api_url
        .set_port(parsed.port())
        .map_err(|()| IntakeError::InvalidUrl("invalid port".to_owned()))?;
    api_url.set_path("api/v4");
    Ok(api_url)
}
