//! List command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use milkrun_core::FarmId;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show records for this farm
    #[arg(long)]
    pub farm: Option<FarmId>,

    /// Only show records not yet synced
    #[arg(long)]
    pub pending: bool,

    /// Output one JSON object per line
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ListArgs, config: &Config) -> Result<()> {
    let store = config.open_store()?;
    let records = store.records().context("Failed to read records")?;

    let shown: Vec<_> = records
        .iter()
        .rev()
        .filter(|r| args.farm.is_none_or(|farm| r.farm() == farm))
        .filter(|r| !args.pending || !r.is_synced())
        .collect();

    if args.json {
        for record in shown {
            output::json(record)?;
        }
        return Ok(());
    }

    if shown.is_empty() {
        eprintln!("{}", "No records found.".dimmed());
        return Ok(());
    }

    let farms = store.farms().context("Failed to read farm cache")?;
    for record in &shown {
        output::record(record, &farms);
    }

    let pending = shown.iter().filter(|r| !r.is_synced()).count();
    eprintln!();
    eprintln!(
        "{}: {} shown, {} pending",
        "Total".dimmed(),
        shown.len(),
        pending
    );

    Ok(())
}
