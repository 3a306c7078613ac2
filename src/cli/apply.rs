//! Install the latest revision.
//!
//! Runs a check, asks for confirmation, downloads every file of the new
//! revision and finally restarts the game. Ctrl-C during the download stops
//! it at once, abandoning any download in flight, and leaves the installed
//! revision unchanged. Ctrl-C during the restart countdown skips the restart.

use super::CliConfig;
use super::common::{CliObserver, confirm, load_setup, report_check};
use crate::constants::COMPLETION_PAUSE;
use crate::update::{ApplyReport, MarkerOutcome, RestartAction, UpdateState, short_revision};
use anyhow::{Result, anyhow, bail};
use clap::Args;
use colored::Colorize;
use std::time::Duration;
use tracing::debug;

/// Download and install the latest revision.
#[derive(Args, Debug)]
pub struct ApplyCommand {
    /// Install without asking for confirmation.
    #[arg(short, long)]
    yes: bool,

    /// Do not relaunch or reload the game afterwards.
    #[arg(long)]
    no_restart: bool,
}

impl ApplyCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let (config, mut setup) = load_setup(cli).await?;
        let updater = &mut setup.updater;

        let observer = CliObserver::spinner(cli.no_progress).with_log(!cli.quiet);
        updater.check(&observer).await;
        observer.finish();
        if !report_check(updater)? {
            return Ok(());
        }

        if !self.yes {
            match confirm("Install the update now?").await? {
                Some(true) => {}
                Some(false) => {
                    updater.dismiss();
                    println!("{}", "Update postponed.".yellow());
                    return Ok(());
                }
                None => bail!("Refusing to install without confirmation; pass --yes"),
            }
        }

        let cancel = updater.cancellation();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        let observer = CliObserver::bar(cli.no_progress).with_log(!cli.quiet);
        let state = updater.apply(&observer).await?.clone();
        observer.finish();
        ctrl_c.abort();

        match state {
            UpdateState::Completed(report) => {
                print_report(&report);
                if !self.no_restart {
                    restart(&setup.restart, config.restart_delay()).await?;
                }
                Ok(())
            }
            UpdateState::Cancelled { completed, total } => {
                bail!("Update cancelled after {completed}/{total} files; run apply again to finish")
            }
            UpdateState::Failed { message } => Err(setup
                .updater
                .take_error()
                .map_or_else(|| anyhow!(message), anyhow::Error::from)),
            other => Err(anyhow!("Unexpected state after apply: {other:?}")),
        }
    }
}

fn print_report(report: &ApplyReport) {
    let summary = format!(
        "Installed {} file(s) from {}",
        report.written,
        short_revision(&report.revision)
    );
    if report.failures.is_empty() {
        println!("{} {}", "✓".green(), summary.green());
    } else {
        println!("{} {}", "!".yellow(), summary.yellow());
        for failure in &report.failures {
            println!("  {} {}: {}", "✗".red(), failure.path, failure.error.dimmed());
        }
    }
    if report.skipped > 0 {
        println!(
            "  {} file(s) could not be saved on this host",
            report.skipped.to_string().yellow()
        );
    }
    if report.excluded > 0 {
        debug!("{} excluded file(s) left untouched", report.excluded);
    }

    match &report.marker {
        MarkerOutcome::Advanced => {}
        MarkerOutcome::Retained => println!(
            "{}",
            "Installed revision not advanced; the update will be offered again.".yellow()
        ),
        MarkerOutcome::SaveFailed(error) => println!(
            "{} {}",
            "Failed to record the installed revision:".red(),
            error
        ),
    }
}

/// Sleep for `duration`. Returns `false` if Ctrl-C arrived first.
async fn wait_or_interrupt(duration: Duration) -> bool {
    tokio::select! {
        () = tokio::time::sleep(duration) => true,
        _ = tokio::signal::ctrl_c() => false,
    }
}

async fn restart(action: &RestartAction, delay: Duration) -> Result<()> {
    if !wait_or_interrupt(COMPLETION_PAUSE).await {
        println!("{}", "Restart skipped.".yellow());
        return Ok(());
    }
    println!("{}", action.announcement(delay.as_secs()).cyan());
    if !action.is_automatic() {
        return Ok(());
    }

    if !wait_or_interrupt(delay).await {
        println!("{}", "Restart skipped.".yellow());
        return Ok(());
    }
    match action.perform()? {
        Some(pid) => println!("{} (pid {pid})", "Game relaunched".green()),
        None => println!("{}", "Reload requested.".cyan()),
    }
    Ok(())
}
