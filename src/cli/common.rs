//! Helpers shared by the CLI commands.

use super::CliConfig;
use crate::config::UpdaterConfig;
use crate::update::{
    GameUpdater, HostSetup, LogEntry, LogLevel, UpdateObserver, UpdateState, short_revision,
};
use crate::utils::progress::ProgressBar;
use anyhow::{Result, anyhow};
use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Load the configuration and assemble the updater for it.
pub(super) async fn load_setup(cli: &CliConfig) -> Result<(UpdaterConfig, HostSetup)> {
    let config = UpdaterConfig::load(cli.config_path.as_deref()).await?;
    let setup = HostSetup::new(&config, config.state_dir()?)?;
    Ok((config, setup))
}

/// Renders orchestrator status and progress on a terminal progress bar.
///
/// Update log entries are printed above the bar, or as plain lines when the
/// bar is hidden.
pub struct CliObserver {
    bar: ProgressBar,
    show_log: bool,
}

impl CliObserver {
    /// A spinner, for the check phase.
    pub fn spinner(no_progress: bool) -> Self {
        let bar = if no_progress {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        Self {
            bar,
            show_log: true,
        }
    }

    /// A bar whose length is set by the first progress report, for the apply phase.
    pub fn bar(no_progress: bool) -> Self {
        let bar = if no_progress {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        Self {
            bar,
            show_log: true,
        }
    }

    /// Whether update log entries are printed.
    pub fn with_log(mut self, show_log: bool) -> Self {
        self.show_log = show_log;
        self
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl UpdateObserver for CliObserver {
    fn on_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    fn on_progress(&self, completed: usize, total: usize, _fraction: f64) {
        self.bar.set_length(total as u64);
        self.bar.set_position(completed as u64);
    }

    fn on_log(&self, entry: &LogEntry) {
        if !self.show_log {
            return;
        }
        let line = entry.to_string();
        let line = match entry.level {
            LogLevel::Info => line.normal(),
            LogLevel::Warn => line.yellow(),
            LogLevel::Error => line.red(),
        };
        if self.bar.is_hidden() {
            println!("{line}");
        } else {
            self.bar.println(line.to_string());
        }
    }
}

/// Print the outcome of a check.
///
/// Returns `true` when an update is pending.
///
/// # Errors
///
/// Returns the check's error when it failed.
pub(super) fn report_check(updater: &mut GameUpdater) -> Result<bool> {
    match updater.state().clone() {
        UpdateState::UpToDate { revision } => {
            println!(
                "{} The game is up to date ({})",
                "✓".green(),
                short_revision(&revision)
            );
            Ok(false)
        }
        UpdateState::UpdateAvailable { current, latest } => {
            println!(
                "{} Update available: {} → {}",
                "↑".cyan(),
                current.as_deref().map_or("none", short_revision).yellow(),
                latest.short_id().green()
            );
            if let Some(summary) = latest.summary() {
                println!("  {}", summary.dimmed());
            }
            Ok(true)
        }
        UpdateState::Failed { message } => Err(updater
            .take_error()
            .map_or_else(|| anyhow!(message), anyhow::Error::from)),
        other => Err(anyhow!("Unexpected state after check: {other:?}")),
    }
}

/// Ask a yes/no question on the terminal. An empty answer counts as yes.
///
/// Returns `Ok(None)` without prompting when stdin is not a terminal.
pub(super) async fn confirm(question: &str) -> Result<Option<bool>> {
    if !io::stdin().is_terminal() {
        return Ok(None);
    }

    print!("{} ", format!("{question} [Y/n]:").green());
    io::stdout().flush()?;

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut response = String::new();
    reader.read_line(&mut response).await?;
    let response = response.trim().to_lowercase();

    Ok(Some(response.is_empty() || response == "y" || response == "yes"))
}
