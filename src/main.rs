//! Mergescope CLI entrypoint for merge request contribution reports.

mod cli;

use std::io::{self, Write};
use std::process::ExitCode;

use mergescope::telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink};
use mergescope::{IntakeError, MergescopeConfig};
use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;

use cli::report::{self, Outcome};

/// Exit status for reports that stopped early or skipped merge requests.
const PARTIAL_EXIT_CODE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(Outcome::Complete) => ExitCode::SUCCESS,
        Ok(Outcome::Partial) => ExitCode::from(PARTIAL_EXIT_CODE),
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<Outcome, IntakeError> {
    let config = load_config()?;
    let cancel = report::cancel_after(config.deadline());
    let telemetry: &dyn TelemetrySink = if config.telemetry {
        &StderrJsonlTelemetrySink
    } else {
        &NoopTelemetrySink
    };

    let mut buffer = Vec::new();
    let outcome = report::run(&config, telemetry, &cancel, &mut buffer).await?;

    io::stdout()
        .lock()
        .write_all(&buffer)
        .map_err(|error| IntakeError::Io {
            message: error.to_string(),
        })?;
    Ok(outcome)
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`IntakeError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<MergescopeConfig, IntakeError> {
    MergescopeConfig::load().map_err(|error| IntakeError::Configuration {
        message: error.to_string(),
    })
}

/// Sends `tracing` output to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ignored = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
