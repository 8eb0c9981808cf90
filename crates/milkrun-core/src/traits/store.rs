//! Local record store trait.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::record::{NewRecord, StoredRecord};
use crate::submission::Acknowledgement;

/// Exclusive claim on a store for one reconciliation pass.
///
/// Whatever the store put inside is released when the lease is dropped.
pub struct PassLease {
    _held: Box<dyn Send + Sync>,
}

impl PassLease {
    /// Wrap the resource that keeps other passes out, such as a lock file.
    pub fn new(held: impl Send + Sync + 'static) -> Self {
        Self {
            _held: Box::new(held),
        }
    }

    /// A lease that excludes nothing beyond the caller's own guard.
    pub fn unshared() -> Self {
        Self::new(())
    }
}

impl fmt::Debug for PassLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassLease").finish_non_exhaustive()
    }
}

/// Durable container of every record created on this device.
///
/// Each mutating call persists the whole updated collection before it
/// returns; a failure is surfaced to the caller and never retried here.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Assign a fresh local id, persist the record as unsynced, and return it.
    async fn append(&self, record: NewRecord) -> Result<StoredRecord>;

    /// All records in insertion order.
    async fn all(&self) -> Result<Vec<StoredRecord>>;

    /// Records not yet acknowledged by the server, in insertion order.
    async fn unsynced(&self) -> Result<Vec<StoredRecord>> {
        let records = self.all().await?;
        Ok(records.into_iter().filter(|r| !r.is_synced()).collect())
    }

    /// Mark acknowledged records as synced and store their remote ids.
    ///
    /// Unknown or already-synced ids are ignored. Returns how many records
    /// changed state.
    async fn mark_synced(&self, acks: &[Acknowledgement]) -> Result<usize>;

    /// When the last successful reconciliation finished, if ever.
    async fn last_sync(&self) -> Result<Option<DateTime<Utc>>>;

    /// Record the time of a successful reconciliation.
    async fn set_last_sync(&self, at: DateTime<Utc>) -> Result<()>;

    /// Claim the store for a reconciliation pass.
    ///
    /// Returns `None` while another pass holds it. Stores shared between
    /// processes must make the claim visible to all of them; the default
    /// suits a store only one process can reach.
    async fn try_begin_pass(&self) -> Result<Option<PassLease>> {
        Ok(Some(PassLease::unshared()))
    }
}
