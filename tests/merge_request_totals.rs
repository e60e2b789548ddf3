//! Merge request totals over the REST gateway.

mod support;

use std::time::Duration;

use mergescope::{CrawlFilter, Dashboard, DashboardQuery, MergeRequestState};
use rstest::rstest;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use support::{GitLabFixture, merge_request_json};

#[rstest]
#[tokio::test]
async fn totals_read_the_total_header_per_state() {
    let gitlab = GitLabFixture::start().await;
    gitlab.mount_total("opened", 12).await;
    gitlab.mount_total("closed", 30).await;

    let gateway = gitlab.gateway(100);
    let totals = Dashboard::new(&gateway)
        .merge_request_totals(&DashboardQuery::default(), &CancellationToken::new())
        .await
        .expect("totals should load");

    assert_eq!(totals.per_state.get("opened"), Some(&12));
    assert_eq!(totals.per_state.get("closed"), Some(&30));
    assert_eq!(totals.total, 42);
    assert_eq!(totals.estimate.estimated, Duration::from_secs(63));
}

#[rstest]
#[tokio::test]
async fn capped_totals_count_the_crawled_merge_requests() {
    let gitlab = GitLabFixture::start().await;
    gitlab
        .mount_merge_requests(
            "merged",
            1,
            json!([
                merge_request_json(3, "merged", "alice", "2025-02-03T10:00:00.000Z"),
                merge_request_json(2, "merged", "bob", "2025-02-02T10:00:00.000Z"),
                merge_request_json(1, "merged", "carol", "2025-02-01T10:00:00.000Z"),
            ]),
        )
        .await;

    let query = DashboardQuery::new(
        vec![MergeRequestState::Merged],
        CrawlFilter::unbounded().with_max_results(2),
    );
    let gateway = gitlab.gateway(100);
    let totals = Dashboard::new(&gateway)
        .merge_request_totals(&query, &CancellationToken::new())
        .await
        .expect("totals should load");

    assert_eq!(totals.per_state.get("merged"), Some(&2));
    assert_eq!(totals.total, 2);
}
