//! The `game-updater` binary against the mock GitHub.

use crate::common::{MockGitHub, installed_revision, write_installed};
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn updater(config_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("game-updater").unwrap();
    cmd.arg("--config")
        .arg(config_path)
        .arg("--no-progress")
        .env_remove("GAME_UPDATER_CONFIG")
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

struct Fixture {
    github: MockGitHub,
    install: TempDir,
    config_path: std::path::PathBuf,
}

impl Fixture {
    async fn new() -> Self {
        let github = MockGitHub::start().await;
        let install = TempDir::new().unwrap();
        let config_path = install.path().join("updater.toml");
        github.write_config(install.path(), &config_path);
        Self {
            github,
            install,
            config_path,
        }
    }

    fn cmd(&self) -> Command {
        updater(&self.config_path)
    }
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("game-updater")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("status"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json_on_first_run() {
    let fixture = Fixture::new().await;

    fixture
        .cmd()
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""version": "1.0.0""#))
        .stdout(predicate::str::contains(r#""commit": null"#));

    assert!(fixture.install.path().join("version.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_reports_available_update() {
    let fixture = Fixture::new().await;
    fixture.github.mount_head("bbb22200cafe").await;
    write_installed(fixture.install.path(), "aaa11100beef");

    fixture
        .cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Update available"))
        .stdout(predicate::str::contains("aaa11100"))
        .stdout(predicate::str::contains("bbb22200"));

    fixture
        .cmd()
        .args(["check", "--short"])
        .assert()
        .success()
        .stdout("bbb22200cafe\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_then_check_is_up_to_date() {
    let fixture = Fixture::new().await;
    fixture.github.mount_head("bbb222").await;
    fixture.github.mount_tree("bbb222", &["index.html", "main.js"]).await;
    fixture
        .github
        .mount_raw("index.html", b"<html>v2</html>", "text/html")
        .await;
    write_installed(fixture.install.path(), "aaa111");

    fixture
        .cmd()
        .args(["apply", "--yes", "--no-restart"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed 1 file(s) from bbb222"));

    assert_eq!(
        std::fs::read_to_string(fixture.install.path().join("index.html")).unwrap(),
        "<html>v2</html>"
    );
    assert!(!fixture.install.path().join("main.js").exists());
    assert_eq!(
        installed_revision(fixture.install.path()).as_deref(),
        Some("bbb222")
    );

    fixture
        .cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_without_terminal_requires_yes() {
    let fixture = Fixture::new().await;
    fixture.github.mount_head("bbb222").await;
    write_installed(fixture.install.path(), "aaa111");

    fixture
        .cmd()
        .args(["apply", "--no-restart"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("pass --yes"));

    assert_eq!(
        installed_revision(fixture.install.path()).as_deref(),
        Some("aaa111")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_repository_suggests_fix() {
    let fixture = Fixture::new().await;

    fixture
        .cmd()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"))
        .stderr(predicate::str::contains("Check the owner, repo and branch"));
}

#[test]
fn test_invalid_config_fails() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("updater.toml");
    std::fs::write(&config_path, "owner = \"\"\n").unwrap();

    updater(&config_path)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let temp = TempDir::new().unwrap();

    updater(&temp.path().join("absent.toml"))
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read updater config"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_prints_update_log() {
    let fixture = Fixture::new().await;
    fixture.github.mount_head("bbb222").await;
    fixture
        .github
        .mount_tree("bbb222", &["index.html", "style.css"])
        .await;
    fixture
        .github
        .mount_raw("index.html", b"<html>v2</html>", "text/html")
        .await;
    fixture.github.mount_raw_status("style.css", 500).await;
    write_installed(fixture.install.path(), "aaa111");

    fixture
        .cmd()
        .args(["apply", "--yes", "--no-restart"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Starting update check"))
        .stdout(predicate::str::contains("Found 2 files to update"))
        .stdout(predicate::str::contains("Updated index.html"))
        .stdout(predicate::str::contains("Failed to update style.css"))
        .stdout(predicate::str::contains("1 of 2 files failed to update"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_quiet_hides_update_log() {
    let fixture = Fixture::new().await;
    fixture.github.mount_head("bbb222").await;
    fixture.github.mount_tree("bbb222", &["index.html"]).await;
    fixture
        .github
        .mount_raw("index.html", b"<html>v2</html>", "text/html")
        .await;
    write_installed(fixture.install.path(), "aaa111");

    fixture
        .cmd()
        .args(["--quiet", "apply", "--yes", "--no-restart"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed 1 file(s) from bbb222"))
        .stdout(predicate::str::contains("Updated index.html").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_shows_semantic_version() {
    let fixture = Fixture::new().await;
    write_installed(fixture.install.path(), "aaa11100beef");

    fixture
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Revision:    aaa11100"))
        .stdout(predicate::str::contains("Version:     1.0.0"));

    std::fs::write(
        fixture.install.path().join("version.json"),
        r#"{"commit": "aaa111", "lastUpdate": null, "version": "beta"}"#,
    )
    .unwrap();
    fixture
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("beta (not a semantic version)"));
}
