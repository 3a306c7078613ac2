//! Configuration resolution through environment variables.
//!
//! These tests mutate the process environment and run serially.

use game_updater::config::{CONFIG_PATH_ENV, TOKEN_ENV, UpdaterConfig};
use serial_test::serial;
use tempfile::TempDir;

struct EnvGuard {
    name: &'static str,
    previous: Option<String>,
}

impl EnvGuard {
    fn set(name: &'static str, value: &str) -> Self {
        let previous = std::env::var(name).ok();
        // SAFETY: every test touching these variables is `#[serial]`.
        unsafe { std::env::set_var(name, value) };
        Self { name, previous }
    }

    fn remove(name: &'static str) -> Self {
        let previous = std::env::var(name).ok();
        // SAFETY: see `set`.
        unsafe { std::env::remove_var(name) };
        Self { name, previous }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: see `set`.
        unsafe {
            match &self.previous {
                Some(value) => std::env::set_var(self.name, value),
                None => std::env::remove_var(self.name),
            }
        }
    }
}

#[tokio::test]
#[serial]
async fn test_config_path_from_environment() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("updater.toml");
    std::fs::write(&path, "owner = \"someone\"\nrepo = \"other-game\"\nbranch = \"beta\"\n")
        .unwrap();
    let _guard = EnvGuard::set(CONFIG_PATH_ENV, path.to_str().unwrap());

    let config = UpdaterConfig::load(None).await.unwrap();
    assert_eq!(config.owner, "someone");
    assert_eq!(config.repo, "other-game");
    assert_eq!(config.branch, "beta");
    assert_eq!(config.max_parallel, 1);
}

#[tokio::test]
#[serial]
async fn test_explicit_path_wins_over_environment() {
    let temp = TempDir::new().unwrap();
    let explicit = temp.path().join("explicit.toml");
    std::fs::write(&explicit, "repo = \"explicit\"\n").unwrap();
    let _guard = EnvGuard::set(CONFIG_PATH_ENV, temp.path().join("absent.toml").to_str().unwrap());

    let config = UpdaterConfig::load(Some(&explicit)).await.unwrap();
    assert_eq!(config.repo, "explicit");
}

#[tokio::test]
#[serial]
async fn test_missing_config_from_environment_is_an_error() {
    let temp = TempDir::new().unwrap();
    let _guard = EnvGuard::set(CONFIG_PATH_ENV, temp.path().join("absent.toml").to_str().unwrap());

    assert!(UpdaterConfig::load(None).await.is_err());
}

#[test]
#[serial]
fn test_token_falls_back_to_environment() {
    let _guard = EnvGuard::set(TOKEN_ENV, "from-env");

    let config = UpdaterConfig::default();
    assert_eq!(config.resolved_token().as_deref(), Some("from-env"));

    let config = UpdaterConfig {
        token: Some("from-config".to_string()),
        ..UpdaterConfig::default()
    };
    assert_eq!(config.resolved_token().as_deref(), Some("from-config"));
}

#[test]
#[serial]
fn test_blank_token_is_ignored() {
    let _guard = EnvGuard::set(TOKEN_ENV, "  ");
    assert_eq!(UpdaterConfig::default().resolved_token(), None);

    let _guard = EnvGuard::remove(TOKEN_ENV);
    assert_eq!(UpdaterConfig::default().resolved_token(), None);
}
