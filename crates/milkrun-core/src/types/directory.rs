//! Farm and operator entities cached from the server.

use serde::{Deserialize, Serialize};

use super::{FarmId, OperatorId};

/// A farm where milk is collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farm {
    pub id: FarmId,
    pub name: String,
}

/// The authenticated field agent recording collections.
///
/// Only the identity is kept; credentials never reach the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: OperatorId,
    pub username: String,
}
