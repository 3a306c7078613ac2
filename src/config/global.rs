//! Updater configuration file (`~/.game-updater/config.toml`).
//!
//! Every field has a default, so a missing file or an empty file yields a
//! working configuration that tracks `snirsnir/dave@main` and installs into
//! the current directory.
//!
//! ```toml
//! owner = "snirsnir"
//! repo = "dave"
//! branch = "main"
//! install_dir = "~/Games/dave"
//! mode = "native"
//! max_parallel = 4
//! consistency = "require-full-success"
//! launch_command = ["~/Games/dave/dave"]
//! ```

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_BRANCH, DEFAULT_MAX_RETRIES, DEFAULT_OWNER, DEFAULT_RAW_BASE,
    DEFAULT_REPO, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RESTART_DELAY_SECS,
};
use crate::core::UpdaterError;
use crate::update::ConsistencyPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "GAME_UPDATER_CONFIG";

/// Environment variable consulted when no token is configured.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Where the game runs, which decides how state is persisted and files are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostMode {
    /// The game lives in a writable install directory: files are written there and
    /// the version record is `version.json` next to them.
    #[default]
    Native,
    /// No writable install directory: the version record goes to a keyed store in
    /// the user data directory and synced files are only logged.
    Sandboxed,
}

/// Configuration for the updater.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// GitHub repository owner.
    pub owner: String,
    /// GitHub repository name.
    pub repo: String,
    /// Branch whose head is the update target.
    pub branch: String,
    /// Base URL of the GitHub REST API.
    pub api_base: String,
    /// Base URL serving raw file content.
    pub raw_base: String,
    /// Install directory; `~` is expanded. Defaults to the current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<String>,
    /// Host mode, see [`HostMode`].
    pub mode: HostMode,
    /// Directory for sandboxed state; `~` is expanded. Defaults to
    /// [`data_dir`](Self::data_dir).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// API token. Falls back to `GITHUB_TOKEN`.
    ///
    /// Never logged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Retries for transient API failures (check and listing only).
    pub max_retries: usize,
    /// Number of files fetched concurrently. `1` is strictly sequential.
    pub max_parallel: usize,
    /// Whether a batch with per-file failures still advances the revision marker.
    pub consistency: ConsistencyPolicy,
    /// Seconds between the restart announcement and the restart.
    pub restart_delay_secs: u64,
    /// Command (program followed by arguments) used to relaunch the game after an update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_command: Option<Vec<String>>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            install_dir: None,
            mode: HostMode::Native,
            data_dir: None,
            token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            max_retries: DEFAULT_MAX_RETRIES,
            max_parallel: 1,
            consistency: ConsistencyPolicy::default(),
            restart_delay_secs: DEFAULT_RESTART_DELAY_SECS,
            launch_command: None,
        }
    }
}

impl UpdaterConfig {
    /// Load the configuration.
    ///
    /// Resolution order: `explicit` path, then `GAME_UPDATER_CONFIG`, then
    /// [`default_path`](Self::default_path). An explicitly named file must
    /// exist; a missing default file yields [`UpdaterConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or fails
    /// [`validate`](Self::validate).
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match std::env::var(CONFIG_PATH_ENV) {
                Ok(path) => (PathBuf::from(path), true),
                Err(_) => (Self::default_path()?, false),
            },
        };

        if !required && !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load_from(&path).await
    }

    /// Load and validate the configuration at `path`.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read updater config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse updater config from {}", path.display()))?;
        config.validate()?;
        debug!("Loaded updater config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as pretty TOML, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize updater config")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write updater config to {}", path.display()))
    }

    /// Platform path of the configuration file: `~/.game-updater/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("config.toml"))
    }

    /// Per-user data directory of the updater (`~/.game-updater`, or
    /// `%LOCALAPPDATA%\game-updater` on Windows).
    pub fn data_dir() -> Result<PathBuf> {
        let dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("game-updater")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".game-updater")
        };
        Ok(dir)
    }

    /// Check field values that serde cannot.
    pub fn validate(&self) -> Result<(), UpdaterError> {
        for (name, value) in [("owner", &self.owner), ("repo", &self.repo), ("branch", &self.branch)]
        {
            if value.trim().is_empty() {
                return Err(UpdaterError::Config {
                    message: format!("`{name}` must not be empty"),
                });
            }
        }

        for (name, value) in [("api_base", &self.api_base), ("raw_base", &self.raw_base)] {
            let url = reqwest::Url::parse(value).map_err(|e| UpdaterError::Config {
                message: format!("`{name}` is not a valid URL ({value}): {e}"),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(UpdaterError::Config {
                    message: format!("`{name}` must use http or https: {value}"),
                });
            }
        }

        if self.max_parallel == 0 {
            return Err(UpdaterError::Config {
                message: "`max_parallel` must be at least 1".to_string(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(UpdaterError::Config {
                message: "`request_timeout_secs` must be at least 1".to_string(),
            });
        }

        if let Some(command) = &self.launch_command
            && command.first().is_none_or(|program| program.trim().is_empty())
        {
            return Err(UpdaterError::Config {
                message: "`launch_command` must name a program".to_string(),
            });
        }

        Ok(())
    }

    /// The install directory with `~` expanded, or the current directory.
    pub fn install_dir(&self) -> Result<PathBuf> {
        match &self.install_dir {
            Some(dir) => Ok(PathBuf::from(shellexpand::tilde(dir).as_ref())),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }

    /// The configured state directory, or [`data_dir`](Self::data_dir).
    pub fn state_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(PathBuf::from(shellexpand::tilde(dir).as_ref())),
            None => Self::data_dir(),
        }
    }

    /// The configured token, or `GITHUB_TOKEN` when none is configured.
    pub fn resolved_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .filter(|token| !token.trim().is_empty())
    }

    /// Per-request timeout.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Delay before restarting after a completed update.
    pub const fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }
}
