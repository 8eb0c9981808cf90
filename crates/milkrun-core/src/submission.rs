//! Batch submission types shared by the synchronizer and remote clients.
//!
//! A batch is a list of [`SubmissionEntry`] values, each carrying its local
//! id as the correlation token. The server answers with per-entry
//! acknowledgements and rejections, matched back by token, never by
//! position.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{FarmId, LocalId, OperatorId, RemoteId};

/// One record as sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionEntry {
    pub temp_id: LocalId,
    pub farm: FarmId,
    pub operator: OperatorId,
    pub quantity: f64,
    pub balance: f64,
    pub timestamp: DateTime<Utc>,
}

/// The server persisted the entry sent under `temp_id` as `remote_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    pub temp_id: LocalId,
    pub remote_id: RemoteId,
}

/// The server refused the entry sent under `temp_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub temp_id: LocalId,
    pub reason: String,
}

/// Per-entry outcome of a batch the server accepted for processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionResult {
    pub accepted: Vec<Acknowledgement>,
    pub rejected: Vec<Rejection>,
}

impl SubmissionResult {
    /// Restrict the outcome to the tokens that were actually submitted.
    ///
    /// - Entries for tokens outside `batch` are dropped.
    /// - Only the first acknowledgement per token is kept.
    /// - A token that is both acknowledged and rejected counts as
    ///   acknowledged, since the server persisted it.
    pub fn reconcile(self, batch: &[SubmissionEntry]) -> Self {
        let submitted: HashSet<LocalId> = batch.iter().map(|e| e.temp_id).collect();

        let mut seen = HashSet::new();
        let mut accepted = Vec::with_capacity(self.accepted.len());
        for ack in self.accepted {
            if !submitted.contains(&ack.temp_id) {
                warn!(temp_id = %ack.temp_id, "Ignoring acknowledgement for unsubmitted record");
                continue;
            }
            if seen.insert(ack.temp_id) {
                accepted.push(ack);
            }
        }

        let mut rejected_ids = HashSet::new();
        let rejected = self
            .rejected
            .into_iter()
            .filter(|r| {
                if !submitted.contains(&r.temp_id) {
                    warn!(temp_id = %r.temp_id, "Ignoring rejection for unsubmitted record");
                    return false;
                }
                !seen.contains(&r.temp_id) && rejected_ids.insert(r.temp_id)
            })
            .collect();

        Self { accepted, rejected }
    }

    /// The local ids the server acknowledged.
    pub fn accepted_ids(&self) -> BTreeSet<LocalId> {
        self.accepted.iter().map(|a| a.temp_id).collect()
    }
}
