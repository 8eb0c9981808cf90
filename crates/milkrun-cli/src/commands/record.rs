//! Record command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use tokio::sync::{mpsc, watch};

use milkrun_core::{FarmId, NewRecord};
use milkrun_sync::{Notice, Orchestrator, Synchronizer, Trigger};

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Farm the milk was collected from
    #[arg(long)]
    pub farm: FarmId,

    /// Litres collected
    #[arg(long)]
    pub quantity: f64,

    /// Balance owed to the farm (may be negative)
    #[arg(long, allow_negative_numbers = true)]
    pub balance: f64,

    /// Collection time as RFC 3339 (defaults to now)
    #[arg(long)]
    pub at: Option<String>,

    /// Only save locally; do not try to sync
    #[arg(long)]
    pub no_sync: bool,
}

pub async fn run(args: RecordArgs, config: &Config) -> Result<()> {
    let store = config.open_store()?;
    let operator = store
        .user()
        .context("Failed to read operator")?
        .context("Not logged in. Run 'milkrun login' first.")?;

    let mut record = NewRecord::new(args.farm, operator.id, args.quantity, args.balance)
        .context("Invalid record")?;
    if let Some(at) = &args.at {
        let at = DateTime::parse_from_rfc3339(at)
            .with_context(|| format!("Invalid timestamp '{}'", at))?;
        record = record.with_timestamp(at.with_timezone(&Utc));
    }

    let stored = store.append(record).context("Failed to save record")?;
    output::success(&format!(
        "Recorded #{}: {:.2} L from farm {}",
        stored.local_id(),
        stored.quantity(),
        stored.farm()
    ));

    if args.no_sync {
        return Ok(());
    }

    let remote = config.remote()?;
    let online = remote.is_reachable().await;
    let sync = Synchronizer::new(Arc::new(store), remote).with_submit_timeout(config.timeout);

    let (_online_tx, online_rx) = watch::channel(online);
    let (notice_tx, _notices) = mpsc::unbounded_channel();
    let orchestrator = Orchestrator::new(Arc::new(sync), online_rx, notice_tx);

    match orchestrator.fire(Trigger::RecordAppended).await {
        None => eprintln!("{}", "Server unreachable; record will sync later.".dimmed()),
        Some(Notice::StoreFailed { error, .. }) => {
            anyhow::bail!("Local store failed during sync: {}", error)
        }
        Some(notice) => output::notice(&notice),
    }

    Ok(())
}
