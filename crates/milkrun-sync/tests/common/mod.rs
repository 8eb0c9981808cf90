//! Test doubles for the submission client and store.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use milkrun_core::error::{StorageError, TransportError};
use milkrun_core::{
    Acknowledgement, Error, FarmId, LocalId, NewRecord, OperatorId, PassLease, RecordStore,
    Rejection, RemoteId, Result, StoredRecord, SubmissionClient, SubmissionEntry,
    SubmissionResult,
};
use milkrun_file::FileStore;

pub fn record(quantity: f64, balance: f64) -> NewRecord {
    NewRecord::new(FarmId::new(1), OperatorId::new(9), quantity, balance).unwrap()
}

/// Server behaviour for one request.
#[derive(Debug, Clone)]
pub enum Script {
    /// Accept every entry, issuing `realId = base + tempId`.
    AcceptAll { base: u64 },
    /// Accept everything except the listed tokens, which are rejected.
    Reject { ids: BTreeSet<LocalId>, reason: String, base: u64 },
    /// Fail the whole request at the transport level.
    Unreachable,
}

/// A submission client that answers according to a script and records
/// what it was sent.
#[derive(Debug)]
pub struct ScriptedClient {
    script: Mutex<Script>,
    calls: AtomicUsize,
    batches: Mutex<Vec<Vec<LocalId>>>,
}

impl ScriptedClient {
    pub fn new(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> Vec<Vec<LocalId>> {
        self.batches.lock().unwrap().clone()
    }
}

pub fn answer(script: &Script, batch: &[SubmissionEntry]) -> Result<SubmissionResult> {
    match script {
        Script::AcceptAll { base } => Ok(SubmissionResult {
            // Reverse order: reconciliation must not depend on position.
            accepted: batch
                .iter()
                .rev()
                .map(|e| Acknowledgement {
                    temp_id: e.temp_id,
                    remote_id: RemoteId::new(base + e.temp_id.get()),
                })
                .collect(),
            rejected: Vec::new(),
        }),
        Script::Reject { ids, reason, base } => {
            let (rejected, accepted): (Vec<_>, Vec<_>) =
                batch.iter().partition(|e| ids.contains(&e.temp_id));
            Ok(SubmissionResult {
                accepted: accepted
                    .into_iter()
                    .map(|e| Acknowledgement {
                        temp_id: e.temp_id,
                        remote_id: RemoteId::new(base + e.temp_id.get()),
                    })
                    .collect(),
                rejected: rejected
                    .into_iter()
                    .map(|e| Rejection {
                        temp_id: e.temp_id,
                        reason: reason.clone(),
                    })
                    .collect(),
            })
        }
        Script::Unreachable => Err(Error::Transport(TransportError::Connection {
            message: "connection refused".to_string(),
        })),
    }
}

#[async_trait]
impl SubmissionClient for ScriptedClient {
    async fn submit(&self, batch: &[SubmissionEntry]) -> Result<SubmissionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches
            .lock()
            .unwrap()
            .push(batch.iter().map(|e| e.temp_id).collect());
        let script = self.script.lock().unwrap().clone();
        answer(&script, batch)
    }
}

/// A client that blocks inside `submit` until released.
#[derive(Debug, Default)]
pub struct GatedClient {
    pub entered: Notify,
    pub release: Notify,
    calls: AtomicUsize,
}

impl GatedClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionClient for GatedClient {
    async fn submit(&self, batch: &[SubmissionEntry]) -> Result<SubmissionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        answer(&Script::AcceptAll { base: 500 }, batch)
    }
}

/// A client that never answers.
#[derive(Debug, Default)]
pub struct SilentClient;

#[async_trait]
impl SubmissionClient for SilentClient {
    async fn submit(&self, _batch: &[SubmissionEntry]) -> Result<SubmissionResult> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        Ok(SubmissionResult::default())
    }
}

/// A store whose writes of sync state fail.
#[derive(Debug)]
pub struct ReadOnlyStore(pub FileStore);

fn read_only() -> Error {
    Error::Storage(StorageError::Encode {
        message: "read-only store".to_string(),
    })
}

#[async_trait]
impl RecordStore for ReadOnlyStore {
    async fn append(&self, record: NewRecord) -> Result<StoredRecord> {
        self.0.append(record)
    }

    async fn all(&self) -> Result<Vec<StoredRecord>> {
        self.0.records()
    }

    async fn mark_synced(&self, _acks: &[Acknowledgement]) -> Result<usize> {
        Err(read_only())
    }

    async fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        self.0.last_sync()
    }

    async fn set_last_sync(&self, _at: DateTime<Utc>) -> Result<()> {
        Err(read_only())
    }
}

/// A store that persists records but cannot write the last sync time.
#[derive(Debug)]
pub struct ClocklessStore(pub FileStore);

#[async_trait]
impl RecordStore for ClocklessStore {
    async fn append(&self, record: NewRecord) -> Result<StoredRecord> {
        self.0.append(record)
    }

    async fn all(&self) -> Result<Vec<StoredRecord>> {
        self.0.records()
    }

    async fn mark_synced(&self, acks: &[Acknowledgement]) -> Result<usize> {
        self.0.acknowledge(acks)
    }

    async fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        self.0.last_sync()
    }

    async fn set_last_sync(&self, _at: DateTime<Utc>) -> Result<()> {
        Err(read_only())
    }

    async fn try_begin_pass(&self) -> Result<Option<PassLease>> {
        self.0.try_begin_pass()
    }
}
