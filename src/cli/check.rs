//! Report whether a newer revision is available.

use super::CliConfig;
use super::common::{CliObserver, load_setup, report_check};
use crate::update::UpdateState;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Check for updates without downloading anything.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Only print the latest revision id (or nothing when up to date).
    #[arg(long)]
    short: bool,
}

impl CheckCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let (_config, mut setup) = load_setup(cli).await?;
        let observer =
            CliObserver::spinner(cli.no_progress || self.short).with_log(!self.short && !cli.quiet);

        if !self.short {
            println!("{} {}", "Checking".cyan(), setup.updater.remote().describe());
        }
        setup.updater.check(&observer).await;
        observer.finish();

        if self.short {
            if let UpdateState::UpdateAvailable { latest, .. } = setup.updater.state() {
                println!("{}", latest.id);
                return Ok(());
            }
            if let Some(error) = setup.updater.take_error() {
                return Err(error.into());
            }
            return Ok(());
        }

        if report_check(&mut setup.updater)? {
            println!("Run {} to install it.", "game-updater apply".bold());
        }
        Ok(())
    }
}
