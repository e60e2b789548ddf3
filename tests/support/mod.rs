//! Shared test utilities for driving the REST gateway against a mock GitLab.

use mergescope::gitlab::ApiClientConfig;
use mergescope::{PersonalAccessToken, ProjectLocator, RestGateway};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Project id every fixture points at.
pub const PROJECT_ID: &str = "42";

/// Token every fixture authenticates with.
pub const TOKEN: &str = "glpat-integration";

/// Mock GitLab server plus helpers for mounting merge request endpoints.
pub struct GitLabFixture {
    server: MockServer,
}

impl GitLabFixture {
    /// Starts a fresh mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// API base URL served by the mock, e.g. `http://127.0.0.1:1234/api/v4`.
    pub fn api_base(&self) -> String {
        format!("{}/api/v4", self.server.uri())
    }

    /// Gateway bound to the fixture project with the given page size.
    ///
    /// # Panics
    ///
    /// Panics if the gateway cannot be configured.
    pub fn gateway(&self, page_size: u8) -> RestGateway {
        let token = PersonalAccessToken::new(TOKEN)
            .unwrap_or_else(|error| panic!("token should be valid: {error}"));
        let project = ProjectLocator::new(&self.api_base(), PROJECT_ID)
            .unwrap_or_else(|error| panic!("locator should build: {error}"));
        let config = ApiClientConfig::new(project.api_base().as_str(), token)
            .and_then(|config| config.with_page_size(page_size))
            .unwrap_or_else(|error| panic!("client config should build: {error}"));
        RestGateway::new(config, project)
            .unwrap_or_else(|error| panic!("gateway should build: {error}"))
    }

    /// Serves one full-size page of merge requests in `state`.
    pub async fn mount_merge_requests(&self, state: &str, page: u32, body: Value) {
        Mock::given(method("GET"))
            .and(path(merge_requests_path()))
            .and(header("PRIVATE-TOKEN", TOKEN))
            .and(query_param("state", state))
            .and(query_param("page", page.to_string()))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Serves the `X-Total` count for `state`.
    pub async fn mount_total(&self, state: &str, total: u64) {
        Mock::given(method("GET"))
            .and(path(merge_requests_path()))
            .and(query_param("state", state))
            .and(query_param("per_page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .insert_header("X-Total", total.to_string()),
            )
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Serves a sub-resource (`commits`, `notes`, `award_emoji`, ...) of a
    /// merge request.
    pub async fn mount_resource(&self, iid: u64, resource: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(resource_path(iid, resource)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Fails a sub-resource of a merge request with `status`.
    pub async fn fail_resource(&self, iid: u64, resource: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(resource_path(iid, resource)))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "message": format!("{status} failure")
            })))
            .mount(&self.server)
            .await;
    }

    /// Serves an empty collection for every activity resource of `iid`.
    pub async fn mount_quiet(&self, iid: u64) {
        for resource in ["commits", "notes", "award_emoji", "participants"] {
            self.mount_resource(iid, resource, json!([])).await;
        }
    }
}

/// JSON for a merge request as GitLab returns it.
pub fn merge_request_json(iid: u64, state: &str, author: &str, created_at: &str) -> Value {
    json!({
        "id": 1000 + iid,
        "iid": iid,
        "title": format!("MR {iid}"),
        "state": state,
        "created_at": created_at,
        "web_url": format!("https://gitlab.example.com/group/app/-/merge_requests/{iid}"),
        "author": { "id": iid, "username": author, "name": author }
    })
}

/// JSON for a commit as GitLab lists it: git author name and email, no
/// username.
pub fn commit_json(sha: &str, author_name: &str, author_email: &str) -> Value {
    json!({
        "id": sha,
        "short_id": sha,
        "author_name": author_name,
        "author_email": author_email
    })
}

/// JSON for a merge request participant.
pub fn participant_json(username: &str, name: &str) -> Value {
    json!({ "id": 1, "username": username, "name": name, "state": "active" })
}

/// JSON for a note; `system` marks GitLab-generated notes.
pub fn note_json(id: u64, author: &str, system: bool) -> Value {
    json!({ "id": id, "author": { "username": author }, "system": system })
}

/// JSON for an emoji reaction.
pub fn award_json(id: u64, user: &str) -> Value {
    json!({ "id": id, "name": "thumbsup", "user": { "username": user } })
}

fn merge_requests_path() -> String {
    format!("/api/v4/projects/{PROJECT_ID}/merge_requests")
}

fn resource_path(iid: u64, resource: &str) -> String {
    format!("{}/{iid}/{resource}", merge_requests_path())
}
