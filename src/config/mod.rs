//! Configuration management for the updater
//!
//! A single TOML file describes which repository to track, where the game is
//! installed, how the host persists state, and how aggressive the sync is.
//!
//! # Location Priority
//!
//! 1. `--config <path>` on the command line
//! 2. `GAME_UPDATER_CONFIG` environment variable
//! 3. `~/.game-updater/config.toml` (`%LOCALAPPDATA%\game-updater\config.toml` on Windows)
//! 4. Built-in defaults when no file exists
//!
//! The optional API token is read from the file or from `GITHUB_TOKEN` and is
//! never written to logs.

mod global;

pub use global::{CONFIG_PATH_ENV, HostMode, TOKEN_ENV, UpdaterConfig};
