//! game-updater CLI entry point
//!
//! Parses arguments, runs the selected command and renders failures as a
//! colored message with a suggestion.
//!
//! - `check` - Report whether an update is available
//! - `apply` - Download and install the latest revision
//! - `status` - Show the installed revision

use anyhow::Result;
use clap::Parser;
use game_updater::cli;
use game_updater::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
