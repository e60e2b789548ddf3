//! Tests for loading configuration from real arguments and environment.

use ortho_config::OrthoConfig;
use rstest::rstest;

use crate::MergescopeConfig;

/// Loads configuration with an isolated home directory and the given
/// environment overrides.
fn load_isolated(env: &[(&str, Option<&str>)], cli_args: &[&str]) -> MergescopeConfig {
    let temp_dir = tempfile::TempDir::new().expect("temp dir should be created");
    let home = temp_dir.path().to_string_lossy().to_string();

    let mut vars: Vec<(&str, Option<&str>)> = vec![
        ("HOME", Some(home.as_str())),
        ("XDG_CONFIG_HOME", Some(home.as_str())),
    ];
    vars.extend_from_slice(env);
    let _guard = env_lock::lock_env(vars);

    let mut args: Vec<std::ffi::OsString> = vec![std::ffi::OsString::from("mergescope")];
    args.extend(cli_args.iter().map(std::ffi::OsString::from));

    MergescopeConfig::load_from_iter(args).expect("config should load")
}

#[rstest]
fn max_age_days_loads_from_environment_variable() {
    let config = load_isolated(&[("MERGESCOPE_MAX_AGE_DAYS", Some("30"))], &[]);

    assert_eq!(
        config.max_age_days,
        Some(30),
        "expected MERGESCOPE_MAX_AGE_DAYS to set the cutoff"
    );
}

#[rstest]
fn cli_overrides_environment_for_max_results() {
    let config = load_isolated(
        &[("MERGESCOPE_MAX_RESULTS", Some("500"))],
        &["--max-results", "25"],
    );

    assert_eq!(
        config.max_results,
        Some(25),
        "CLI should override environment for max_results"
    );
}

#[rstest]
fn mode_flags_load_from_cli() {
    let config = load_isolated(&[], &["--contributors", "--project", "group/app"]);

    assert!(config.contributors, "--contributors should enable the report");
    assert_eq!(config.project.as_deref(), Some("group/app"));
}

#[rstest]
fn dotfile_in_home_is_discovered() {
    let temp_dir = tempfile::TempDir::new().expect("temp dir should be created");
    let home = temp_dir.path().to_string_lossy().to_string();
    std::fs::write(
        temp_dir.path().join(".mergescope.toml"),
        "project = \"from-dotfile\"\nper_unit_cost_ms = 900\n",
    )
    .expect("dotfile should be written");

    let _guard = env_lock::lock_env([
        ("HOME", Some(home.as_str())),
        ("XDG_CONFIG_HOME", Some(home.as_str())),
    ]);

    let config = MergescopeConfig::load_from_iter([std::ffi::OsString::from("mergescope")])
        .expect("config should load");

    assert_eq!(config.project.as_deref(), Some("from-dotfile"));
    assert_eq!(config.per_unit_cost_ms, 900);
}

#[rstest]
fn short_flags_reach_participants_and_page_size() {
    let config = load_isolated(&[], &["-i", "-P", "20", "-p", "group/app"]);

    assert!(config.participants, "-i should enable participant resolution");
    assert_eq!(config.page_size, 20, "-P should set the page size");
    assert_eq!(config.project.as_deref(), Some("group/app"));
}
