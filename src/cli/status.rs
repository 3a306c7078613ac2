//! Show the installed revision.

use super::CliConfig;
use super::common::load_setup;
use crate::update::short_revision;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

/// Print the installed version record and what is being tracked.
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Print the version record as JSON.
    #[arg(long)]
    json: bool,
}

impl StatusCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let (config, setup) = load_setup(cli).await?;
        let record = setup.updater.installed();

        if self.json {
            let json =
                serde_json::to_string_pretty(&record).context("Failed to serialize version record")?;
            println!("{json}");
            return Ok(());
        }

        println!("{}", "Installed game".bold());
        println!(
            "  Revision:    {}",
            record
                .revision_id
                .as_deref()
                .map_or_else(|| "none".dimmed().to_string(), |id| short_revision(id).green().to_string())
        );
        match record.parsed_version() {
            Some(version) => println!("  Version:     {version}"),
            None => println!(
                "  Version:     {} {}",
                record.semantic_version,
                "(not a semantic version)".yellow()
            ),
        }
        println!(
            "  Last update: {}",
            record.last_update.as_deref().unwrap_or("never")
        );
        println!("  Tracking:    {}", setup.updater.remote().describe());
        println!("  Install dir: {}", setup.install_dir.display());
        println!("  Mode:        {:?}", config.mode);
        Ok(())
    }
}
