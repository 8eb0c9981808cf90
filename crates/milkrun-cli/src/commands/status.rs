//! Status command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: StatusArgs, config: &Config) -> Result<()> {
    let sync = config.synchronizer()?;
    let online = sync.client().is_reachable().await;
    let status = sync.status(online).await.context("Failed to read local store")?;

    if args.json {
        return output::json_pretty(&status);
    }

    let operator = sync
        .store()
        .user()
        .context("Failed to read operator")?
        .map(|o| o.username)
        .unwrap_or_else(|| "(not logged in)".to_string());

    let server = if status.online {
        format!("{} ({})", config.server, "online".green())
    } else {
        format!("{} ({})", config.server, "offline".red())
    };

    let last_sync = status
        .last_sync
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());

    output::field("Operator", &operator);
    output::field("Server", &server);
    output::field("Pending", &status.pending.to_string());
    output::field("Last sync", &last_sync);
    output::field("Data dir", &config.data_dir.display().to_string());

    Ok(())
}
