//! Request format and response handling of `GitHubClient`.

use crate::common::{BRANCH, MockGitHub, OWNER, REPO, raw_path};
use game_updater::config::UpdaterConfig;
use game_updater::core::UpdaterError;
use game_updater::update::{EntryKind, GitHubClient, RemoteRepository};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

fn commit_path() -> String {
    format!("/repos/{OWNER}/{REPO}/commits/{BRANCH}")
}

fn client(github: &MockGitHub, configure: impl FnOnce(&mut UpdaterConfig)) -> GitHubClient {
    let temp = TempDir::new().unwrap();
    let mut config = github.config(temp.path());
    configure(&mut config);
    GitHubClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_latest_revision_sends_api_headers() {
    let github = MockGitHub::start().await;
    Mock::given(method("GET"))
        .and(path(commit_path()))
        .and(header("accept", "application/vnd.github+json"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "bbb222bbb222",
            "commit": {"message": "Add level 3"}
        })))
        .expect(1)
        .mount(&github.server)
        .await;

    let revision = client(&github, |_| {}).latest_revision().await.unwrap();
    assert_eq!(revision.id, "bbb222bbb222");
    assert_eq!(revision.summary(), Some("Add level 3"));
}

#[tokio::test]
async fn test_token_is_sent_as_bearer() {
    let github = MockGitHub::start().await;
    Mock::given(method("GET"))
        .and(path(commit_path()))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "abc"})))
        .expect(1)
        .mount(&github.server)
        .await;

    let client = client(&github, |config| config.token = Some("s3cret".to_string()));
    assert_eq!(client.latest_revision().await.unwrap().id, "abc");
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let github = MockGitHub::start().await;
    Mock::given(method("GET"))
        .and(path(commit_path()))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&github.server)
        .await;

    let client = client(&github, |config| config.max_retries = 3);
    let error = client.latest_revision().await.unwrap_err();
    assert!(matches!(error, UpdaterError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let github = MockGitHub::start().await;
    Mock::given(method("GET"))
        .and(path(commit_path()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&github.server)
        .await;
    Mock::given(method("GET"))
        .and(path(commit_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "ccc333"})))
        .expect(1)
        .mount(&github.server)
        .await;

    let client = client(&github, |config| config.max_retries = 2);
    assert_eq!(client.latest_revision().await.unwrap().id, "ccc333");
}

#[tokio::test]
async fn test_malformed_commit_is_parse_error() {
    let github = MockGitHub::start().await;
    Mock::given(method("GET"))
        .and(path(commit_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&github.server)
        .await;

    let error = client(&github, |_| {}).latest_revision().await.unwrap_err();
    assert!(matches!(error, UpdaterError::Parse { .. }));
    assert!(!error.is_transient());
}

#[tokio::test]
async fn test_list_files_keeps_kinds_and_order() {
    let github = MockGitHub::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/git/trees/bbb222")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "bbb222",
            "truncated": true,
            "tree": [
                {"path": "assets", "type": "tree"},
                {"path": "assets/a.png", "type": "blob"},
                {"path": "index.html", "type": "blob"}
            ]
        })))
        .mount(&github.server)
        .await;

    let entries = client(&github, |_| {}).list_files("bbb222").await.unwrap();
    let listed: Vec<(&str, EntryKind)> =
        entries.iter().map(|e| (e.path.as_str(), e.kind)).collect();
    assert_eq!(
        listed,
        vec![
            ("assets", EntryKind::Tree),
            ("assets/a.png", EntryKind::Blob),
            ("index.html", EntryKind::Blob),
        ]
    );
}

#[tokio::test]
async fn test_fetch_file_returns_bytes_and_content_type() {
    let github = MockGitHub::start().await;
    github
        .mount_raw("assets/a.png", &[0x89, b'P', b'N', b'G'], "image/png")
        .await;

    let content = client(&github, |_| {}).fetch_file("assets/a.png").await.unwrap();
    assert_eq!(content.bytes, vec![0x89, b'P', b'N', b'G']);
    assert_eq!(content.content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_raw_requests_do_not_carry_token() {
    let github = MockGitHub::start().await;
    github.mount_raw("index.html", b"<html>", "text/html").await;

    let client = client(&github, |config| config.token = Some("s3cret".to_string()));
    client.fetch_file("index.html").await.unwrap();

    let requests = github.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), raw_path("index.html"));
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_fetch_file_status_error() {
    let github = MockGitHub::start().await;
    github.mount_raw_status("game.js", 500).await;

    let error = client(&github, |_| {}).fetch_file("game.js").await.unwrap_err();
    assert!(matches!(error, UpdaterError::HttpStatus { status: 500, .. }));
}
