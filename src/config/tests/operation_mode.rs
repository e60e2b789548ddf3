//! Tests for operation mode determination.

use rstest::rstest;

use crate::MergescopeConfig;
use crate::config::OperationMode;

#[rstest]
#[case::nothing_set(false, false, false, OperationMode::Crawl)]
#[case::participants(true, false, false, OperationMode::CrawlWithParticipants)]
#[case::contributors(false, true, false, OperationMode::Contributors)]
#[case::totals(false, false, true, OperationMode::Totals)]
#[case::contributors_over_participants(true, true, false, OperationMode::Contributors)]
#[case::totals_over_everything(true, true, true, OperationMode::Totals)]
fn selects_operation_from_flags(
    #[case] participants: bool,
    #[case] contributors: bool,
    #[case] totals: bool,
    #[case] expected: OperationMode,
) {
    let config = MergescopeConfig {
        participants,
        contributors,
        totals,
        ..Default::default()
    };

    assert_eq!(config.operation_mode(), expected);
}
