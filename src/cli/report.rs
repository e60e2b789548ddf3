//! Runs the configured dashboard operation and writes its result.

use std::io::Write;
use std::time::Duration;

use mergescope::gitlab::ApiClientConfig;
use mergescope::telemetry::TelemetrySink;
use mergescope::{
    AggregationError, Dashboard, DashboardQuery, IntakeError, MergeRequestGateway,
    MergeRequestSummary, MergescopeConfig, OperationMode, ProjectLocator, RestGateway,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::output::{
    ContributorsOutput, write_contributors_summary, write_crawl_summary, write_json,
    write_totals_summary,
};

/// How an operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every requested merge request was handled.
    Complete,
    /// The contributor report stopped early or skipped merge requests.
    Partial,
}

/// Runs the configured operation against the GitLab REST API.
///
/// # Errors
///
/// Returns configuration errors for missing or inconsistent settings and
/// propagates gateway failures.
pub async fn run<W: Write>(
    config: &MergescopeConfig,
    telemetry: &dyn TelemetrySink,
    cancel: &CancellationToken,
    writer: &mut W,
) -> Result<Outcome, IntakeError> {
    run_with_gateway_builder(config, RestGateway::new, telemetry, cancel, writer).await
}

/// Runs the configured operation using a custom gateway builder.
///
/// This function is exposed for testing with alternative gateways.
pub async fn run_with_gateway_builder<G, F, W>(
    config: &MergescopeConfig,
    build_gateway: F,
    telemetry: &dyn TelemetrySink,
    cancel: &CancellationToken,
    writer: &mut W,
) -> Result<Outcome, IntakeError>
where
    G: MergeRequestGateway,
    F: FnOnce(ApiClientConfig, ProjectLocator) -> Result<G, IntakeError>,
    W: Write,
{
    config.validate()?;
    let project = config.resolve_project()?;
    let token = config.resolve_token()?;
    let client_config = ApiClientConfig::new(project.api_base().as_str(), token)?
        .with_page_size(config.page_size)?;
    let gateway = build_gateway(client_config, project)?;

    let query = config.dashboard_query()?;
    let dashboard = Dashboard::new(&gateway)
        .with_estimator(config.estimator())
        .with_request_budget(config.request_budget)
        .with_telemetry(telemetry);

    match config.operation_mode() {
        OperationMode::Crawl => {
            let summaries = dashboard.crawl(&query, cancel).await?;
            write_summaries(config, writer, &summaries)?;
            Ok(Outcome::Complete)
        }
        OperationMode::CrawlWithParticipants => {
            let summaries = dashboard.crawl_with_participants(&query, cancel).await?;
            write_summaries(config, writer, &summaries)?;
            Ok(Outcome::Complete)
        }
        OperationMode::Contributors => {
            run_contributors(config, &dashboard, &query, cancel, writer).await
        }
        OperationMode::Totals => {
            let totals = dashboard.merge_request_totals(&query, cancel).await?;
            if config.text {
                write_totals_summary(writer, &totals)?;
            } else {
                write_json(writer, &totals)?;
            }
            Ok(Outcome::Complete)
        }
    }
}

/// Returns a token that is cancelled once `deadline` elapses.
///
/// Without a deadline the token is only cancelled by its holder.
pub fn cancel_after(deadline: Option<Duration>) -> CancellationToken {
    let cancel = CancellationToken::new();
    if let Some(limit) = deadline {
        let trigger = cancel.clone();
        let _deadline_task = tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            tracing::warn!(
                seconds = limit.as_secs(),
                "deadline reached, cancelling remaining requests"
            );
            trigger.cancel();
        });
    }
    cancel
}

async fn run_contributors<G, W>(
    config: &MergescopeConfig,
    dashboard: &Dashboard<'_, G>,
    query: &DashboardQuery,
    cancel: &CancellationToken,
    writer: &mut W,
) -> Result<Outcome, IntakeError>
where
    G: MergeRequestGateway,
    W: Write,
{
    let started = Instant::now();
    match dashboard.contributors(query, cancel).await {
        Ok(report) => {
            let output = ContributorsOutput::new(&report.result, report.estimate, None);
            write_contributors(config, writer, &output)?;
            Ok(if output.complete {
                Outcome::Complete
            } else {
                Outcome::Partial
            })
        }
        Err(AggregationError::Partial { reason, result }) => {
            let estimate = config
                .estimator()
                .estimate(result.total_requested)
                .refine(result.completed_units(), started.elapsed());
            let output = ContributorsOutput::new(&result, estimate, Some(reason));
            write_contributors(config, writer, &output)?;
            Ok(Outcome::Partial)
        }
        Err(AggregationError::Intake(error)) => Err(error),
    }
}

fn write_summaries<W: Write>(
    config: &MergescopeConfig,
    writer: &mut W,
    summaries: &[MergeRequestSummary],
) -> Result<(), IntakeError> {
    if config.text {
        write_crawl_summary(writer, summaries)
    } else {
        write_json(writer, &summaries)
    }
}

fn write_contributors<W: Write>(
    config: &MergescopeConfig,
    writer: &mut W,
    output: &ContributorsOutput<'_>,
) -> Result<(), IntakeError> {
    if config.text {
        write_contributors_summary(writer, output)
    } else {
        write_json(writer, output)
    }
}
