//! Shared helpers: a mock GitHub and configurations pointing at it.

use game_updater::config::UpdaterConfig;
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER: &str = "snirsnir";
pub const REPO: &str = "dave";
pub const BRANCH: &str = "main";

/// A `MockServer` serving both the API and raw content.
pub struct MockGitHub {
    pub server: MockServer,
}

impl MockGitHub {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Configuration for this server installing into `install_dir`.
    pub fn config(&self, install_dir: &Path) -> UpdaterConfig {
        UpdaterConfig {
            api_base: self.uri(),
            raw_base: self.uri(),
            install_dir: Some(install_dir.to_string_lossy().into_owned()),
            token: None,
            max_retries: 0,
            ..UpdaterConfig::default()
        }
    }

    /// Write a TOML config file for the CLI.
    pub fn write_config(&self, install_dir: &Path, config_path: &Path) {
        let config = UpdaterConfig {
            data_dir: Some(install_dir.join(".state").to_string_lossy().into_owned()),
            ..self.config(install_dir)
        };
        std::fs::write(config_path, toml::to_string_pretty(&config).unwrap()).unwrap();
    }

    pub async fn mount_head(&self, sha: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{OWNER}/{REPO}/commits/{BRANCH}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": sha,
                "commit": {"message": format!("Release {sha}\n\nDetails")}
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount the recursive tree; `blobs` become blob entries in order.
    pub async fn mount_tree(&self, sha: &str, blobs: &[&str]) {
        let tree: Vec<_> = blobs
            .iter()
            .map(|path| json!({"path": path, "type": "blob", "mode": "100644"}))
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("/repos/{OWNER}/{REPO}/git/trees/{sha}")))
            .and(query_param("recursive", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": sha,
                "tree": tree,
                "truncated": false
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_raw(&self, file: &str, body: &[u8], content_type: &str) {
        Mock::given(method("GET"))
            .and(path(raw_path(file)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body.to_vec(), content_type),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mount_raw_status(&self, file: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(raw_path(file)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Paths of every request the server received, in order.
    pub async fn requested_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| request.url.path().to_string())
            .collect()
    }
}

pub fn raw_path(file: &str) -> String {
    format!("/{OWNER}/{REPO}/{BRANCH}/{file}")
}

/// Write `version.json` recording `sha` as installed.
pub fn write_installed(install_dir: &Path, sha: &str) {
    std::fs::write(
        install_dir.join("version.json"),
        json!({"commit": sha, "lastUpdate": "2024-01-01T00:00:00.000Z", "version": "1.0.0"})
            .to_string(),
    )
    .unwrap();
}

/// Revision recorded in `version.json`, if any.
pub fn installed_revision(install_dir: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(install_dir.join("version.json")).ok()?;
    let value: serde_json::Value = serde_json::from_str(&raw).ok()?;
    value["commit"].as_str().map(str::to_string)
}
