//! Tests for configuration consistency validation.

use rstest::rstest;

use crate::MergescopeConfig;
use crate::gitlab::error::IntakeError;

#[rstest]
fn validates_defaults() {
    assert!(
        MergescopeConfig::default().validate().is_ok(),
        "defaults should be consistent"
    );
}

#[rstest]
fn rejects_both_project_and_repository_url() {
    let config = MergescopeConfig {
        project: Some("42".to_owned()),
        repository_url: Some("https://gitlab.com/group/app".to_owned()),
        ..Default::default()
    };

    let result = config.validate();

    assert!(
        matches!(result, Err(IntakeError::Configuration { .. })),
        "should reject conflicting project sources, got {result:?}"
    );
}

#[rstest]
fn rejects_more_than_one_mode() {
    let config = MergescopeConfig {
        contributors: true,
        totals: true,
        ..Default::default()
    };

    assert!(
        matches!(config.validate(), Err(IntakeError::Configuration { .. })),
        "should reject two mode flags"
    );
}

#[rstest]
#[case::zero(0)]
#[case::oversized(101)]
fn rejects_page_size_outside_gitlab_limits(#[case] page_size: u8) {
    let config = MergescopeConfig {
        page_size,
        ..Default::default()
    };

    assert!(
        matches!(config.validate(), Err(IntakeError::Configuration { .. })),
        "page size {page_size} should be rejected"
    );
}
