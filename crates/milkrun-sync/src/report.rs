//! Outcomes of reconciliation passes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use milkrun_core::submission::Rejection;

/// Summary of one reconciliation pass.
///
/// `success` is false only when the batch never reached a usable server
/// response; individual rejections still count as a successful pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success: bool,
    pub synced_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<Rejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncReport {
    /// Nothing was pending, so no request was made.
    pub fn nothing_pending() -> Self {
        Self {
            success: true,
            synced_count: 0,
            rejected: Vec::new(),
            error: None,
        }
    }

    /// The whole batch failed; every record stays pending.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            synced_count: 0,
            rejected: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Number of records the server refused.
    pub fn failed_count(&self) -> usize {
        self.rejected.len()
    }

    /// One-line description suitable for a notification.
    pub fn summary(&self) -> String {
        match (&self.error, self.rejected.is_empty()) {
            (Some(error), _) => format!("Sync failed: {}", error),
            (None, true) => format!("Synced {} record(s)", self.synced_count),
            (None, false) => format!(
                "Synced {} record(s), {} rejected",
                self.synced_count,
                self.rejected.len()
            ),
        }
    }
}

/// Result of asking the synchronizer to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAttempt {
    /// A pass ran to completion.
    Completed(SyncReport),
    /// Another pass was already in flight; this trigger was dropped.
    AlreadyRunning,
}

/// Snapshot of the device's sync state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub online: bool,
    pub pending: usize,
    pub last_sync: Option<DateTime<Utc>>,
}
