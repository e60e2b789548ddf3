//! Tests for configuration layer precedence.

use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::{Value, json};

use super::helpers::{apply_layer, build_config_from_layers};
use crate::MergescopeConfig;

#[rstest]
#[case::file_overrides_defaults(
    vec![
        ("defaults", json!({"project": "default-project"})),
        ("file", json!({"project": "file-project"})),
    ],
    "project",
    "file-project",
    "file should override default"
)]
#[case::environment_overrides_file(
    vec![("file", json!({"token": "file-token"})), ("environment", json!({"token": "env-token"}))],
    "token",
    "env-token",
    "environment should override file"
)]
#[case::cli_overrides_environment(
    vec![("environment", json!({"states": "opened"})), ("cli", json!({"states": "merged"}))],
    "states",
    "merged",
    "CLI should override environment"
)]
#[case::api_url_defaults_file_env_cli(
    vec![
        ("defaults", json!({"api_url": "https://default.example.com/api/v4"})),
        ("file", json!({"api_url": "https://file.example.com/api/v4"})),
        ("environment", json!({"api_url": "https://env.example.com/api/v4"})),
        ("cli", json!({"api_url": "https://cli.example.com/api/v4"}))
    ],
    "api_url",
    "https://cli.example.com/api/v4",
    "CLI should win for api_url"
)]
fn test_layer_precedence(
    #[case] layers: Vec<(&str, Value)>,
    #[case] field: &str,
    #[case] expected: &str,
    #[case] message: &str,
) {
    let mut composer = MergeComposer::new();

    for (layer_type, value) in layers {
        apply_layer(&mut composer, layer_type, value);
    }

    let config =
        MergescopeConfig::merge_from_layers(composer.layers()).expect("merge should succeed");

    let actual = match field {
        "project" => config.project.as_deref(),
        "token" => config.token.as_deref(),
        "states" => Some(config.states.as_str()),
        "api_url" => config.api_url.as_deref(),
        _ => panic!("unknown field: {field}"),
    };

    assert_eq!(actual, Some(expected), "{message}");
}

#[rstest]
fn defaults_apply_when_no_sources_provided() {
    let mut composer = MergeComposer::new();
    composer.push_defaults(json!({"project": null, "token": null}));

    let config = MergescopeConfig::merge_from_layers(composer.layers())
        .expect("merge should succeed with empty defaults");

    assert!(config.project.is_none(), "project should be None");
    assert!(config.token.is_none(), "token should be None");
    assert_eq!(config.states, "opened,closed", "states should default to both");
    assert_eq!(config.page_size, 100, "page size should default to 100");
    assert_eq!(
        config.per_unit_cost_ms, 1500,
        "per-unit cost should default to 1.5 seconds"
    );
    assert!(!config.contributors, "contributors should default to false");
}

#[rstest]
fn full_precedence_chain() {
    let config = build_config_from_layers(&[
        (
            "defaults",
            json!({"project": "default", "token": "default-token", "max_age_days": 365}),
        ),
        (
            "file",
            json!({"project": "file", "token": "file-token", "max_age_days": 90}),
        ),
        ("environment", json!({"project": "env"})),
        ("cli", json!({"project": "cli", "max_age_days": 30})),
    ]);

    assert_eq!(config.project.as_deref(), Some("cli"), "CLI wins for project");
    assert_eq!(
        config.token.as_deref(),
        Some("file-token"),
        "file wins for token (no env/cli override)"
    );
    assert_eq!(config.max_age_days, Some(30), "CLI wins for max_age_days");
}

#[rstest]
#[case::file_overrides_defaults(
    vec![
        ("defaults", json!({"per_unit_cost_ms": 1500})),
        ("file", json!({"per_unit_cost_ms": 900}))
    ],
    900
)]
#[case::environment_overrides_file(
    vec![
        ("file", json!({"per_unit_cost_ms": 900})),
        ("environment", json!({"per_unit_cost_ms": 2500}))
    ],
    2500
)]
#[case::cli_overrides_environment(
    vec![
        ("environment", json!({"per_unit_cost_ms": 2500})),
        ("cli", json!({"per_unit_cost_ms": 700}))
    ],
    700
)]
fn per_unit_cost_follows_precedence(
    #[case] layers: Vec<(&str, Value)>,
    #[case] expected: u64,
) {
    let config = build_config_from_layers(&layers);
    assert_eq!(
        config.per_unit_cost_ms, expected,
        "per_unit_cost_ms should follow standard precedence rules"
    );
}
