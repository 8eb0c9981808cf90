//! Collection record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, InvalidInputError};
use crate::submission::SubmissionEntry;
use crate::types::{FarmId, LocalId, OperatorId, RemoteId};

/// A milk collection about to be appended to the local store.
///
/// Construction validates the amounts; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    farm: FarmId,
    operator: OperatorId,
    quantity: f64,
    balance: f64,
    timestamp: Option<DateTime<Utc>>,
}

impl NewRecord {
    /// Create a record for `quantity` liters collected at `farm`.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity` is not positive and finite, or if
    /// `balance` is not finite. A zero or negative balance is a debt and is
    /// accepted.
    pub fn new(
        farm: FarmId,
        operator: OperatorId,
        quantity: f64,
        balance: f64,
    ) -> Result<Self, Error> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(InvalidInputError::Quantity { value: quantity }.into());
        }
        if !balance.is_finite() {
            return Err(InvalidInputError::Balance { value: balance }.into());
        }

        Ok(Self {
            farm,
            operator,
            quantity,
            balance,
            timestamp: None,
        })
    }

    /// Set when the collection happened. Defaults to append time.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn farm(&self) -> FarmId {
        self.farm
    }

    pub fn operator(&self) -> OperatorId {
        self.operator
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

/// A record as held by the local store.
///
/// `synced` only ever moves from `false` to `true`, and `remote_id` is
/// written once alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    local_id: LocalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remote_id: Option<RemoteId>,
    farm: FarmId,
    operator: OperatorId,
    quantity: f64,
    balance: f64,
    timestamp: DateTime<Utc>,
    synced: bool,
}

impl StoredRecord {
    /// Materialize a new record under its assigned id. `now` fills in a
    /// missing timestamp.
    pub fn create(local_id: LocalId, record: NewRecord, now: DateTime<Utc>) -> Self {
        Self {
            local_id,
            remote_id: None,
            farm: record.farm,
            operator: record.operator,
            quantity: record.quantity,
            balance: record.balance,
            timestamp: record.timestamp.unwrap_or(now),
            synced: false,
        }
    }

    /// Record the server's acknowledgement.
    ///
    /// Returns `false` if the record was already synced, in which case
    /// nothing changes.
    pub fn acknowledge(&mut self, remote_id: RemoteId) -> bool {
        if self.synced {
            return false;
        }
        self.synced = true;
        self.remote_id = Some(remote_id);
        true
    }

    /// The submission payload for this record, keyed by its local id.
    pub fn to_submission(&self) -> SubmissionEntry {
        SubmissionEntry {
            temp_id: self.local_id,
            farm: self.farm,
            operator: self.operator,
            quantity: self.quantity,
            balance: self.balance,
            timestamp: self.timestamp,
        }
    }

    pub fn local_id(&self) -> LocalId {
        self.local_id
    }

    pub fn remote_id(&self) -> Option<RemoteId> {
        self.remote_id
    }

    pub fn farm(&self) -> FarmId {
        self.farm
    }

    pub fn operator(&self) -> OperatorId {
        self.operator
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }
}
