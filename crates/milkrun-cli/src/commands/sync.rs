//! Sync command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use milkrun_sync::SyncAttempt;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Exits non-zero only when the local store fails; an unreachable server
/// is reported and leaves records pending.
pub async fn run(args: SyncArgs, config: &Config) -> Result<()> {
    let sync = config.synchronizer()?;

    if !args.json {
        eprintln!("{}", "Syncing...".dimmed());
    }

    let attempt = sync.sync().await.context("Failed to update local store")?;

    let report = match attempt {
        SyncAttempt::Completed(report) => report,
        SyncAttempt::AlreadyRunning => {
            output::warning("Sync already running");
            return Ok(());
        }
    };

    if args.json {
        output::json(&report)
    } else {
        output::report(&report);
        Ok(())
    }
}
