//! Batch reconciliation of unsynced records.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use milkrun_core::Result;
use milkrun_core::error::{Error, TransportError};
use milkrun_core::record::StoredRecord;
use milkrun_core::submission::{SubmissionEntry, SubmissionResult};
use milkrun_core::traits::{RecordStore, SubmissionClient};

use crate::guard::FlightGuard;
use crate::report::{SyncAttempt, SyncReport, SyncStatus};

/// Reconciles the local store with the server.
#[derive(Debug)]
pub struct Synchronizer<S, C> {
    store: Arc<S>,
    client: C,
    submit_timeout: Option<Duration>,
    in_flight: AtomicBool,
}

impl<S, C> Synchronizer<S, C>
where
    S: RecordStore,
    C: SubmissionClient,
{
    /// Create a synchronizer over a shared store.
    pub fn new(store: Arc<S>, client: C) -> Self {
        Self {
            store,
            client,
            submit_timeout: None,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Bound the submission call. A call that runs longer is treated as a
    /// transport failure of the whole batch.
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = Some(timeout);
        self
    }

    /// The store this synchronizer drains.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The client batches are submitted through.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// True while a pass is in flight.
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one reconciliation pass.
    ///
    /// Returns [`SyncAttempt::AlreadyRunning`] without doing anything if a
    /// pass is in flight, here or on another handle to the same store. Transport and server failures are reported in the
    /// [`SyncReport`] and leave every record pending. Only a failure of the
    /// local store is returned as `Err`.
    #[instrument(skip(self))]
    pub async fn sync(&self) -> Result<SyncAttempt> {
        let Some(_guard) = FlightGuard::acquire(&self.in_flight) else {
            debug!("Sync already in flight, dropping trigger");
            return Ok(SyncAttempt::AlreadyRunning);
        };

        // Another handle or process may be reconciling the same store.
        let Some(_lease) = self.store.try_begin_pass().await? else {
            debug!("Store claimed by another pass, dropping trigger");
            return Ok(SyncAttempt::AlreadyRunning);
        };

        let pending = self.store.unsynced().await?;
        if pending.is_empty() {
            debug!("Nothing to sync");
            return Ok(SyncAttempt::Completed(SyncReport::nothing_pending()));
        }

        let batch: Vec<SubmissionEntry> = pending.iter().map(StoredRecord::to_submission).collect();
        debug!(records = batch.len(), "Submitting batch");

        let result = match self.submit(&batch).await {
            Ok(result) => result.reconcile(&batch),
            Err(e) => {
                warn!(error = %e, pending = batch.len(), "Sync failed, records stay pending");
                return Ok(SyncAttempt::Completed(SyncReport::failed(e.to_string())));
            }
        };

        let synced_count = self.store.mark_synced(&result.accepted).await?;

        // The acknowledgements are already committed; a missing timestamp
        // must not turn the pass into a failure.
        if let Err(e) = self.store.set_last_sync(Utc::now()).await {
            warn!(error = %e, "Failed to record last sync time");
        }

        for rejection in &result.rejected {
            warn!(temp_id = %rejection.temp_id, reason = %rejection.reason, "Record rejected by server");
        }

        info!(
            synced = synced_count,
            rejected = result.rejected.len(),
            "Sync pass complete"
        );

        Ok(SyncAttempt::Completed(SyncReport {
            success: true,
            synced_count,
            rejected: result.rejected,
            error: None,
        }))
    }

    /// Current pending count and last sync time.
    pub async fn status(&self, online: bool) -> Result<SyncStatus> {
        Ok(SyncStatus {
            online,
            pending: self.store.unsynced().await?.len(),
            last_sync: self.store.last_sync().await?,
        })
    }

    async fn submit(&self, batch: &[SubmissionEntry]) -> Result<SubmissionResult> {
        let Some(timeout) = self.submit_timeout else {
            return self.client.submit(batch).await;
        };

        match tokio::time::timeout(timeout, self.client.submit(batch)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Transport(TransportError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })),
        }
    }
}
