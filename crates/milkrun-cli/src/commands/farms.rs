//! Farms command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use milkrun_core::Farm;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct FarmsArgs {
    /// Fetch the list from the server even if a cached copy exists
    #[arg(long)]
    pub refresh: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: FarmsArgs, config: &Config) -> Result<()> {
    let store = config.open_store()?;
    let cached = store.farms().context("Failed to read farm cache")?;

    let farms = if !args.refresh && !cached.is_empty() {
        cached
    } else {
        let remote = config.remote()?;
        match remote.farms().await {
            Ok(farms) => {
                store
                    .save_farms(&farms)
                    .context("Failed to update farm cache")?;
                farms
            }
            Err(e) if e.is_recoverable() && !cached.is_empty() => {
                output::warning(&format!("Could not refresh farms ({}); showing cached list", e));
                cached
            }
            Err(e) => return Err(e).context("Failed to fetch farms"),
        }
    };

    print(&farms, args.json)
}

fn print(farms: &[Farm], json: bool) -> Result<()> {
    if json {
        return output::json_pretty(&farms);
    }

    if farms.is_empty() {
        eprintln!("{}", "No farms found.".dimmed());
        return Ok(());
    }

    for farm in farms {
        println!("{:>5}  {}", farm.id, farm.name);
    }

    Ok(())
}
