//! Record collection persisted under the `records` key.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use milkrun_core::Result;
use milkrun_core::error::StorageError;
use milkrun_core::record::{NewRecord, StoredRecord};
use milkrun_core::submission::Acknowledgement;
use milkrun_core::traits::{PassLease, RecordStore};
use milkrun_core::types::LocalId;

use crate::store::{FileStore, RECORDS_KEY};

/// On-disk layout of the `records` key.
///
/// The id counter lives next to the records so both change in the same
/// atomic write; ids are never reused even if records were removed by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecordsFile {
    pub next_local_id: LocalId,
    pub records: Vec<StoredRecord>,
}

impl Default for RecordsFile {
    fn default() -> Self {
        Self {
            next_local_id: LocalId::new(1),
            records: Vec::new(),
        }
    }
}

impl FileStore {
    pub(crate) fn load_records(&self) -> Result<RecordsFile> {
        let mut file: RecordsFile = self.read_key(RECORDS_KEY)?.unwrap_or_default();

        // Guard against a counter that fell behind the stored ids.
        if let Some(max) = file.records.iter().map(StoredRecord::local_id).max()
            && max >= file.next_local_id
        {
            warn!(%max, next = %file.next_local_id, "Local id counter behind stored records");
            file.next_local_id = self.following(max)?;
        }

        Ok(file)
    }

    /// The id after `id`. Running out of ids means the file was edited by
    /// hand, so it is reported as corrupt rather than wrapping around.
    fn following(&self, id: LocalId) -> Result<LocalId> {
        id.next().ok_or_else(|| {
            StorageError::Corrupt {
                path: self.key_path(RECORDS_KEY),
                message: format!("local id {} leaves no room for another record", id),
            }
            .into()
        })
    }

    /// Append a record, assigning the next local id.
    #[instrument(skip(self, record), fields(farm = %record.farm(), quantity = record.quantity()))]
    pub fn append(&self, record: NewRecord) -> Result<StoredRecord> {
        let stored = self.exclusive(|| {
            let mut file = self.load_records()?;
            let local_id = file.next_local_id;
            let next_local_id = self.following(local_id)?;
            let stored = StoredRecord::create(local_id, record, Utc::now());

            file.records.push(stored.clone());
            file.next_local_id = next_local_id;
            self.write_key(RECORDS_KEY, &file)?;

            Ok(stored)
        })?;

        debug!(local_id = %stored.local_id(), "Appended record");
        Ok(stored)
    }

    /// All records in insertion order.
    pub fn records(&self) -> Result<Vec<StoredRecord>> {
        Ok(self.load_records()?.records)
    }

    /// Records still waiting for a server acknowledgement.
    pub fn pending(&self) -> Result<Vec<StoredRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| !r.is_synced())
            .collect())
    }

    /// Apply server acknowledgements. Unknown ids are ignored.
    ///
    /// Returns the number of records that changed state; nothing is written
    /// when that number is zero.
    #[instrument(skip(self, acks), fields(acks = acks.len()))]
    pub fn acknowledge(&self, acks: &[Acknowledgement]) -> Result<usize> {
        if acks.is_empty() {
            return Ok(0);
        }

        let changed = self.exclusive(|| {
            let mut file = self.load_records()?;
            let mut by_id: HashMap<LocalId, &Acknowledgement> = HashMap::with_capacity(acks.len());
            for ack in acks {
                by_id.entry(ack.temp_id).or_insert(ack);
            }

            let mut changed = 0;
            for record in &mut file.records {
                if let Some(ack) = by_id.remove(&record.local_id())
                    && record.acknowledge(ack.remote_id)
                {
                    changed += 1;
                }
            }

            for unknown in by_id.keys() {
                debug!(local_id = %unknown, "Acknowledgement for unknown record ignored");
            }

            if changed > 0 {
                self.write_key(RECORDS_KEY, &file)?;
            }
            Ok(changed)
        })?;

        debug!(changed, "Marked records synced");
        Ok(changed)
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn append(&self, record: NewRecord) -> Result<StoredRecord> {
        FileStore::append(self, record)
    }

    async fn all(&self) -> Result<Vec<StoredRecord>> {
        self.records()
    }

    async fn unsynced(&self) -> Result<Vec<StoredRecord>> {
        self.pending()
    }

    async fn mark_synced(&self, acks: &[Acknowledgement]) -> Result<usize> {
        self.acknowledge(acks)
    }

    async fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        FileStore::last_sync(self)
    }

    async fn set_last_sync(&self, at: DateTime<Utc>) -> Result<()> {
        FileStore::set_last_sync(self, at)
    }

    async fn try_begin_pass(&self) -> Result<Option<PassLease>> {
        FileStore::try_begin_pass(self)
    }
}
