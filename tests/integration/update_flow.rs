//! Check and apply against the mock GitHub with files written to disk.

use crate::common::{MockGitHub, installed_revision, raw_path, write_installed};
use game_updater::test_utils::RecordingObserver;
use game_updater::update::{HostSetup, MarkerOutcome, NoopObserver, UpdateState};
use tempfile::TempDir;

async fn setup_for(github: &MockGitHub, install: &TempDir) -> HostSetup {
    let config = github.config(install.path());
    HostSetup::new(&config, install.path().join(".state")).unwrap()
}

#[tokio::test]
async fn test_up_to_date_makes_no_further_requests() {
    let github = MockGitHub::start().await;
    github.mount_head("aaa111").await;
    let install = TempDir::new().unwrap();
    write_installed(install.path(), "aaa111");

    let mut setup = setup_for(&github, &install).await;
    let state = setup.updater.check(&NoopObserver).await;
    assert!(matches!(state, UpdateState::UpToDate { .. }));

    assert_eq!(github.requested_paths().await.len(), 1);
}

#[tokio::test]
async fn test_update_replaces_files_and_records_revision() {
    let github = MockGitHub::start().await;
    github.mount_head("bbb222").await;
    github
        .mount_tree("bbb222", &["index.html", "assets/a.png", "main.js"])
        .await;
    github
        .mount_raw("index.html", b"<html>v2</html>", "text/plain; charset=utf-8")
        .await;
    github
        .mount_raw("assets/a.png", &[0x89, b'P', b'N', b'G', 0x0d, 0x0a], "text/plain")
        .await;
    github.mount_raw("main.js", b"overwritten!", "text/plain").await;

    let install = TempDir::new().unwrap();
    write_installed(install.path(), "aaa111");
    std::fs::write(install.path().join("index.html"), "<html>v1</html>").unwrap();
    std::fs::write(install.path().join("main.js"), "host").unwrap();

    let mut setup = setup_for(&github, &install).await;
    let observer = RecordingObserver::default();
    assert!(matches!(
        setup.updater.check(&observer).await,
        UpdateState::UpdateAvailable { .. }
    ));
    let state = setup.updater.apply(&observer).await.unwrap().clone();

    let UpdateState::Completed(report) = state else {
        panic!("expected Completed");
    };
    assert_eq!(report.written, 2);
    assert_eq!(report.excluded, 1);
    assert_eq!(report.marker, MarkerOutcome::Advanced);

    assert_eq!(
        std::fs::read_to_string(install.path().join("index.html")).unwrap(),
        "<html>v2</html>"
    );
    assert_eq!(
        std::fs::read(install.path().join("assets/a.png")).unwrap(),
        vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a]
    );
    assert_eq!(std::fs::read_to_string(install.path().join("main.js")).unwrap(), "host");
    assert_eq!(installed_revision(install.path()).as_deref(), Some("bbb222"));

    let requested = github.requested_paths().await;
    assert!(!requested.contains(&raw_path("main.js")));
    assert_eq!(observer.progress(), vec![0.5, 1.0]);
}

#[tokio::test]
async fn test_failed_download_is_skipped() {
    let github = MockGitHub::start().await;
    github.mount_head("bbb222").await;
    github
        .mount_tree("bbb222", &["index.html", "game.js", "style.css"])
        .await;
    github.mount_raw("index.html", b"<html>", "text/html").await;
    github.mount_raw_status("game.js", 500).await;
    github.mount_raw("style.css", b"body {}", "text/css").await;

    let install = TempDir::new().unwrap();
    write_installed(install.path(), "aaa111");

    let mut setup = setup_for(&github, &install).await;
    setup.updater.check(&NoopObserver).await;
    let state = setup.updater.apply(&NoopObserver).await.unwrap();

    let UpdateState::Completed(report) = state else {
        panic!("expected Completed, got {state:?}");
    };
    assert_eq!(report.written, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("500"));

    assert!(install.path().join("index.html").exists());
    assert!(install.path().join("style.css").exists());
    assert!(!install.path().join("game.js").exists());
    assert!(setup.updater.log().contains("game.js"));
    assert_eq!(installed_revision(install.path()).as_deref(), Some("bbb222"));
}

#[tokio::test]
async fn test_missing_tree_fails_apply_without_touching_record() {
    let github = MockGitHub::start().await;
    github.mount_head("bbb222").await;

    let install = TempDir::new().unwrap();
    write_installed(install.path(), "aaa111");

    let mut setup = setup_for(&github, &install).await;
    setup.updater.check(&NoopObserver).await;
    let state = setup.updater.apply(&NoopObserver).await.unwrap();
    assert!(matches!(state, UpdateState::Failed { .. }));
    assert_eq!(installed_revision(install.path()).as_deref(), Some("aaa111"));
}
