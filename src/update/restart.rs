//! What happens after a completed update.
//!
//! The orchestrator never restarts anything itself. The caller waits
//! [`COMPLETION_PAUSE`](crate::constants::COMPLETION_PAUSE), announces the
//! restart, waits the configured delay and then calls [`RestartAction::perform`].

use crate::config::{HostMode, UpdaterConfig};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::info;

/// How to bring the updated game back up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartAction {
    /// Start the configured launch command in the install directory.
    Relaunch {
        program: String,
        args: Vec<String>,
        working_dir: PathBuf,
    },
    /// Ask the sandboxed host to reload the game.
    Reload,
    /// No launch command is configured; the user restarts the game.
    Manual,
}

impl RestartAction {
    /// Pick the action for the configured host.
    pub fn from_config(config: &UpdaterConfig, install_dir: PathBuf) -> Self {
        match (config.mode, &config.launch_command) {
            (HostMode::Sandboxed, _) => Self::Reload,
            (HostMode::Native, Some(command)) => match command.split_first() {
                Some((program, args)) => Self::Relaunch {
                    program: shellexpand::tilde(program).into_owned(),
                    args: args.to_vec(),
                    working_dir: install_dir,
                },
                None => Self::Manual,
            },
            (HostMode::Native, None) => Self::Manual,
        }
    }

    /// Message shown before the restart delay starts.
    pub fn announcement(&self, delay_secs: u64) -> String {
        match self {
            Self::Relaunch { .. } => {
                format!("Update complete! The game will relaunch in {delay_secs} seconds...")
            }
            Self::Reload => {
                format!("Update complete! The game will reload in {delay_secs} seconds...")
            }
            Self::Manual => "Update complete! Restart the game to play the new version.".to_string(),
        }
    }

    /// Whether there is anything to wait for.
    pub fn is_automatic(&self) -> bool {
        !matches!(self, Self::Manual)
    }

    /// Carry out the restart.
    ///
    /// `Relaunch` spawns the game detached from the updater's stdio and
    /// returns its process id. `Reload` and `Manual` only log.
    pub fn perform(&self) -> Result<Option<u32>> {
        match self {
            Self::Relaunch {
                program,
                args,
                working_dir,
            } => {
                let child = Command::new(program)
                    .args(args)
                    .current_dir(working_dir)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .with_context(|| format!("Failed to relaunch the game with `{program}`"))?;
                info!("Relaunched {} (pid {})", program, child.id());
                Ok(Some(child.id()))
            }
            Self::Reload => {
                info!("Reload requested");
                Ok(None)
            }
            Self::Manual => Ok(None),
        }
    }
}
