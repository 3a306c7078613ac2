//! Command-line interface for the game updater.
//!
//! # Available Commands
//!
//! - `check` - Report whether a newer revision is available
//! - `apply` - Check, confirm, install and restart the game
//! - `status` - Show the installed revision and the tracked repository
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only show errors and results, without the update log
//! - `--no-progress` - Disable progress bars and spinners
//! - `--config <PATH>` - Use an alternative configuration file
//!
//! # Examples
//!
//! ```bash
//! game-updater check
//! game-updater --verbose apply --yes
//! game-updater --config ./updater.toml status --json
//! ```

mod apply;
mod check;
mod common;
mod status;

use crate::config::CONFIG_PATH_ENV;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use common::CliObserver;

/// Runtime settings derived from the global flags.
///
/// Passed to every command instead of being written to the process
/// environment, so tests can build one directly.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Hide progress bars and spinners.
    pub no_progress: bool,
    /// Suppress the update log.
    pub quiet: bool,
    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    pub fn new() -> Self {
        Self {
            log_level: "warn".to_string(),
            ..Self::default()
        }
    }

    /// Install the global tracing subscriber. `RUST_LOG` takes precedence.
    ///
    /// Safe to call more than once; later calls are ignored.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Keep an installed game in sync with its GitHub repository.
#[derive(Parser)]
#[command(name = "game-updater", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable progress bars and spinners.
    #[arg(long, global = true)]
    no_progress: bool,

    /// Path to the configuration file.
    #[arg(long, global = true, value_name = "PATH", env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a newer revision of the game is available.
    ///
    /// Compares the installed revision with the head of the tracked branch.
    /// Nothing is downloaded.
    Check(check::CheckCommand),

    /// Download and install the latest revision.
    ///
    /// Asks for confirmation unless `--yes` is given, then relaunches or
    /// reloads the game unless `--no-restart` is given.
    Apply(apply::ApplyCommand),

    /// Show the installed revision.
    Status(status::StatusCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    ///
    /// `--verbose` maps to `debug` for this crate, `--quiet` to `error`, and the
    /// default to `warn`: regular output is printed by the commands themselves.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "game_updater=debug,warn"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress,
            quiet: self.quiet,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Check(cmd) => cmd.execute(&config).await,
            Commands::Apply(cmd) => cmd.execute(&config).await,
            Commands::Status(cmd) => cmd.execute(&config).await,
        }
    }
}
