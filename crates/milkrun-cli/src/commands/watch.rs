//! Watch command implementation.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use milkrun_sync::{Notice, Orchestrator, Trigger};

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between connectivity probes
    #[arg(long, default_value_t = 10)]
    pub interval: u64,
}

/// Probe the server on an interval and sync each time it comes back.
/// Pressing Enter asks for a sync straight away.
pub async fn run(args: WatchArgs, config: &Config) -> Result<()> {
    let sync = Arc::new(config.synchronizer()?);
    let probe = sync.client().clone();

    let (online_tx, online_rx) = watch::channel(false);
    let (notice_tx, mut notices) = mpsc::unbounded_channel();
    let (trigger_tx, trigger_rx) = mpsc::channel(8);

    let orchestrator = Orchestrator::new(Arc::clone(&sync), online_rx, notice_tx);
    let runner = tokio::spawn(orchestrator.run(trigger_rx));

    eprintln!(
        "{}",
        format!("Watching {} every {}s.", config.server, args.interval.max(1)).dimmed()
    );
    eprintln!("{}", "Press Enter to sync now, Ctrl+C to stop.".dimmed());
    eprintln!();

    let mut requests = sync_requests();
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let outcome = loop {
        tokio::select! {
            _ = ticker.tick() => {
                let online = probe.is_reachable().await;
                let changed = online_tx.send_if_modified(|current| {
                    let changed = *current != online;
                    *current = online;
                    changed
                });
                if changed {
                    if online {
                        println!("{}", "Server reachable".green());
                    } else {
                        println!("{}", "Server unreachable".yellow());
                    }
                }
            }
            Some(()) = requests.recv() => {
                if trigger_tx.send(Trigger::Manual).await.is_err() {
                    break Err(anyhow::anyhow!("Orchestrator stopped unexpectedly"));
                }
            }
            Some(notice) = notices.recv() => {
                output::notice(&notice);
                if let Notice::StoreFailed { error, .. } = notice {
                    break Err(anyhow::anyhow!("Local store failed: {}", error));
                }
            }
            result = &mut shutdown => {
                result.context("Failed to listen for Ctrl+C")?;
                debug!("Interrupted");
                break Ok(());
            }
        }
    };

    drop(trigger_tx);
    runner.await.context("Orchestrator task failed")?;

    outcome
}

/// One message per line typed on stdin; closes at end of input.
///
/// The read happens off the runtime so a pending read never holds up
/// shutdown after Ctrl+C.
fn sync_requests() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if let Err(e) = line {
                warn!(error = %e, "Failed to read input");
                break;
            }
            if tx.send(()).is_err() {
                break;
            }
        }
        debug!("Input closed");
    });

    rx
}
