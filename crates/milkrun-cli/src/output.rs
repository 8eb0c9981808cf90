//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use milkrun_core::{Farm, StoredRecord};
use milkrun_sync::{Notice, SyncReport};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print the outcome of a reconciliation pass.
pub fn report(report: &SyncReport) {
    if report.success {
        success(&report.summary());
    } else {
        error(&report.summary());
    }
    rejections(report);
}

fn rejections(report: &SyncReport) {
    for rejection in &report.rejected {
        eprintln!(
            "  {} #{} {}",
            "rejected".red(),
            rejection.temp_id,
            rejection.reason
        );
    }
}

/// Print a transient sync notification, prefixed with its trigger.
pub fn notice(notice: &Notice) {
    match notice {
        Notice::Synced { trigger, report } => {
            let prefix = format!("[{}]", trigger).dimmed();
            if report.success {
                println!("{} {} {}", prefix, "✓".green(), report.summary());
            } else {
                println!("{} {} {}", prefix, "✗".red(), report.summary());
            }
            rejections(report);
        }
        Notice::Busy { trigger } => {
            let prefix = format!("[{}]", trigger).dimmed();
            println!("{} {}", prefix, "Sync already running".dimmed());
        }
        Notice::StoreFailed { trigger, error } => {
            let prefix = format!("[{}]", trigger).dimmed();
            eprintln!("{} {} Local store failed: {}", prefix, "✗".red(), error);
        }
    }
}

/// One line per record: id, time, farm, litres, balance, sync state.
pub fn record(record: &StoredRecord, farms: &[Farm]) {
    let farm = farms
        .iter()
        .find(|f| f.id == record.farm())
        .map(|f| f.name.clone())
        .unwrap_or_else(|| format!("farm {}", record.farm()));

    let state = match record.remote_id() {
        Some(remote) => format!("synced #{}", remote).green(),
        None => "pending".yellow(),
    };

    println!(
        "{:>5}  {}  {:<20}  {:>8.2} L  {:>10.2}  {}",
        format!("#{}", record.local_id()),
        record.timestamp().format("%Y-%m-%d %H:%M"),
        farm,
        record.quantity(),
        record.balance(),
        state
    );
}
