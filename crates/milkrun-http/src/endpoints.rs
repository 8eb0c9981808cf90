//! API paths and wire bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use milkrun_core::submission::{Acknowledgement, Rejection, SubmissionEntry};
use milkrun_core::types::{Farm, FarmId, LocalId, Operator, OperatorId, RemoteId};

pub const SYNC_RECORDS: &str = "records/sync";
pub const LOGIN: &str = "auth/login";
pub const FARMS: &str = "farms";
pub const HEALTH: &str = "health";

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// records/sync
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SyncRequest<'a> {
    pub records: Vec<SyncRecord<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecord<'a> {
    pub temp_id: LocalId,
    pub farm_ref: FarmId,
    pub operator_ref: OperatorId,
    pub quantity: f64,
    pub balance: f64,
    pub timestamp: &'a DateTime<Utc>,
}

impl<'a> From<&'a SubmissionEntry> for SyncRecord<'a> {
    fn from(entry: &'a SubmissionEntry) -> Self {
        Self {
            temp_id: entry.temp_id,
            farm_ref: entry.farm,
            operator_ref: entry.operator,
            quantity: entry.quantity,
            balance: entry.balance,
            timestamp: &entry.timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub synced_ids: Vec<SyncedId>,
    #[serde(default)]
    pub errors: Option<Vec<SyncErrorEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedId {
    pub temp_id: LocalId,
    pub real_id: RemoteId,
}

impl From<SyncedId> for Acknowledgement {
    fn from(id: SyncedId) -> Self {
        Acknowledgement {
            temp_id: id.temp_id,
            remote_id: id.real_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncErrorEntry {
    pub temp_id: LocalId,
    pub error: String,
}

impl From<SyncErrorEntry> for Rejection {
    fn from(entry: SyncErrorEntry) -> Self {
        Rejection {
            temp_id: entry.temp_id,
            reason: entry.error,
        }
    }
}

// ============================================================================
// auth/login
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<UserBody>,
}

#[derive(Debug, Deserialize)]
pub struct UserBody {
    pub id: OperatorId,
    pub username: String,
}

impl From<UserBody> for Operator {
    fn from(user: UserBody) -> Self {
        Operator {
            id: user.id,
            username: user.username,
        }
    }
}

// ============================================================================
// farms
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FarmsResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub farms: Vec<FarmBody>,
}

#[derive(Debug, Deserialize)]
pub struct FarmBody {
    pub id: FarmId,
    pub name: String,
}

impl From<FarmBody> for Farm {
    fn from(farm: FarmBody) -> Self {
        Farm {
            id: farm.id,
            name: farm.name,
        }
    }
}
