//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.mergescope.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `MERGESCOPE_TOKEN`, `MERGESCOPE_PROJECT`,
//!    and so on, with `GITLAB_TOKEN`, `PROJECT_ID` and `GITLAB_API_URL` as
//!    fallbacks
//! 4. **Command-line arguments** – `--token`/`-t`, `--project`/`-p`, ...
//!
//! # Configuration File
//!
//! ```toml
//! api_url = "https://gitlab.example.com/api/v4"
//! token = "glpat-example"
//! project = "group/app"
//! states = "opened,closed"
//! max_age_days = 90
//! contributors = true
//! ```

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::crawl::CrawlFilter;
use crate::dashboard::DashboardQuery;
use crate::estimate::{CostEstimator, DEFAULT_PER_UNIT_COST};
use crate::gitlab::error::IntakeError;
use crate::gitlab::locator::{DEFAULT_API_BASE, PersonalAccessToken, ProjectLocator};
use crate::gitlab::pagination::MAX_PAGE_SIZE;

/// Environment variable read when no token is configured.
pub const TOKEN_FALLBACK_ENV: &str = "GITLAB_TOKEN";

/// Environment variable read when no project is configured.
pub const PROJECT_FALLBACK_ENV: &str = "PROJECT_ID";

/// Environment variable read when no API URL is configured.
pub const API_URL_FALLBACK_ENV: &str = "GITLAB_API_URL";

const DEFAULT_STATES: &str = "opened,closed";

/// Operation selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Print merge request summaries.
    Crawl,
    /// Print merge request summaries with participants.
    CrawlWithParticipants,
    /// Print per-contributor counters.
    Contributors,
    /// Print merge request counts and the projected report duration.
    Totals,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `MERGESCOPE_TOKEN`, `GITLAB_TOKEN`, or `--token`: personal access token
/// - `MERGESCOPE_PROJECT`, `PROJECT_ID`, or `--project`: project id or path
/// - `MERGESCOPE_REPOSITORY_URL` or `--repository-url`: project web URL
/// - `MERGESCOPE_API_URL`, `GITLAB_API_URL`, or `--api-url`: API base URL
///
/// # Example
///
/// ```no_run
/// use mergescope::MergescopeConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = MergescopeConfig::load().expect("failed to load configuration");
/// let project = config.resolve_project().expect("project required");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "MERGESCOPE",
    discovery(
        dotfile_name = ".mergescope.toml",
        config_file_name = "mergescope.toml",
        app_name = "mergescope"
    )
)]
pub struct MergescopeConfig {
    /// GitLab REST API base URL, e.g. `https://gitlab.example.com/api/v4`.
    ///
    /// Falls back to `GITLAB_API_URL`, then to gitlab.com.
    #[ortho_config(cli_short = 'a')]
    pub api_url: Option<String>,

    /// Personal access token sent in the `PRIVATE-TOKEN` header.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `MERGESCOPE_TOKEN` or `GITLAB_TOKEN`
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Numeric project id or `namespace/project` path.
    ///
    /// Falls back to `PROJECT_ID`.
    #[ortho_config(cli_short = 'p')]
    pub project: Option<String>,

    /// Project web URL; the API base and project path are derived from it.
    #[ortho_config(cli_short = 'r')]
    pub repository_url: Option<String>,

    /// Comma-separated merge request states to crawl.
    #[ortho_config(cli_short = 's')]
    pub states: String,

    /// Maximum merge requests crawled across all states.
    #[ortho_config(cli_short = 'm')]
    pub max_results: Option<u32>,

    /// Ignore merge requests created more than this many days ago.
    #[ortho_config(cli_short = 'd')]
    pub max_age_days: Option<u32>,

    /// Records requested per page of merge request sub-resources, at most
    /// 100. The crawl itself always requests full pages.
    #[ortho_config()]
    pub page_size: u8,

    /// Advisory cost of one merge request in a contributor report, in
    /// milliseconds.
    #[ortho_config()]
    pub per_unit_cost_ms: u64,

    /// Maximum sub-resource requests spent on a contributor report.
    #[ortho_config()]
    pub request_budget: Option<u32>,

    /// Cancel the operation after this many seconds.
    #[ortho_config()]
    pub deadline_seconds: Option<u64>,

    /// Resolve participants for every crawled merge request.
    #[ortho_config(cli_short = 'i')]
    pub participants: bool,

    /// Aggregate per-contributor counters.
    #[ortho_config(cli_short = 'c')]
    pub contributors: bool,

    /// Count merge requests and project the contributor report duration.
    #[ortho_config(cli_short = 'T')]
    pub totals: bool,

    /// Print a human-readable summary instead of JSON.
    #[ortho_config()]
    pub text: bool,

    /// Mirror telemetry events to stderr as JSON lines.
    #[ortho_config()]
    pub telemetry: bool,
}

impl Default for MergescopeConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            token: None,
            project: None,
            repository_url: None,
            states: DEFAULT_STATES.to_owned(),
            max_results: None,
            max_age_days: None,
            page_size: MAX_PAGE_SIZE,
            per_unit_cost_ms: u64::try_from(DEFAULT_PER_UNIT_COST.as_millis())
                .unwrap_or(1500),
            request_budget: None,
            deadline_seconds: None,
            participants: false,
            contributors: false,
            totals: false,
            text: false,
            telemetry: false,
        }
    }
}

impl MergescopeConfig {
    /// Resolves the token from configuration or `GITLAB_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::MissingToken`] when no source provides a
    /// non-blank value.
    pub fn resolve_token(&self) -> Result<PersonalAccessToken, IntakeError> {
        let value = self
            .token
            .clone()
            .or_else(|| env::var(TOKEN_FALLBACK_ENV).ok())
            .ok_or(IntakeError::MissingToken)?;
        PersonalAccessToken::new(value)
    }

    /// API base URL from configuration, `GITLAB_API_URL`, or gitlab.com.
    #[must_use]
    pub fn resolve_api_url(&self) -> String {
        self.api_url
            .clone()
            .or_else(|| env::var(API_URL_FALLBACK_ENV).ok())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_owned())
    }

    /// Locates the project from the repository URL, the project setting, or
    /// `PROJECT_ID`, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::MissingProject`] when nothing identifies a
    /// project, or the locator's parse errors.
    pub fn resolve_project(&self) -> Result<ProjectLocator, IntakeError> {
        if let Some(url) = self.repository_url.as_deref() {
            return ProjectLocator::parse_repository_url(url);
        }

        let project = self
            .project
            .clone()
            .or_else(|| env::var(PROJECT_FALLBACK_ENV).ok())
            .ok_or(IntakeError::MissingProject)?;
        ProjectLocator::new(&self.resolve_api_url(), &project)
    }

    /// Determines the operation from the mode flags.
    ///
    /// `totals` wins over `contributors`, which wins over `participants`;
    /// with no flag set the operation is a plain crawl.
    #[must_use]
    pub const fn operation_mode(&self) -> OperationMode {
        if self.totals {
            OperationMode::Totals
        } else if self.contributors {
            OperationMode::Contributors
        } else if self.participants {
            OperationMode::CrawlWithParticipants
        } else {
            OperationMode::Crawl
        }
    }

    /// Checks that the settings are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Configuration`] when both a project and a
    /// repository URL are set, when more than one mode flag is set, or when
    /// the page size is outside `1..=100`.
    pub fn validate(&self) -> Result<(), IntakeError> {
        if self.project.is_some() && self.repository_url.is_some() {
            return Err(IntakeError::Configuration {
                message: "use either --project or --repository-url, not both".to_owned(),
            });
        }

        let modes = [self.participants, self.contributors, self.totals]
            .into_iter()
            .filter(|enabled| *enabled)
            .count();
        if modes > 1 {
            return Err(IntakeError::Configuration {
                message: "choose at most one of --participants, --contributors and --totals"
                    .to_owned(),
            });
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(IntakeError::Configuration {
                message: format!("page size must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }

        Ok(())
    }

    /// Builds the dashboard query from the state list and limits.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidState`] for an unknown state name.
    pub fn dashboard_query(&self) -> Result<DashboardQuery, IntakeError> {
        let states = DashboardQuery::parse_states(&self.states)?;
        Ok(DashboardQuery::new(states, self.crawl_filter()))
    }

    /// Result cap and age cutoff; a zero cap means no cap.
    #[must_use]
    pub const fn crawl_filter(&self) -> CrawlFilter {
        let mut filter = CrawlFilter::unbounded();
        if let Some(max_results) = self.max_results {
            filter = filter.with_max_results(max_results);
        }
        if let Some(days) = self.max_age_days {
            filter = filter.with_max_age_days(days);
        }
        filter
    }

    /// Estimator charging the configured per-unit cost.
    #[must_use]
    pub const fn estimator(&self) -> CostEstimator {
        CostEstimator::new(Duration::from_millis(self.per_unit_cost_ms))
    }

    /// Whole-operation deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_seconds.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests;
