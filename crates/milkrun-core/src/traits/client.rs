//! Remote submission client trait.

use async_trait::async_trait;

use crate::Result;
use crate::submission::{SubmissionEntry, SubmissionResult};

/// Sends batches of records to the server.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    /// Submit a batch in a single request.
    ///
    /// `Ok` means the server processed the batch; individual entries may
    /// still be rejected. Any `Err` is a total failure and none of the
    /// entries may be considered persisted.
    async fn submit(&self, batch: &[SubmissionEntry]) -> Result<SubmissionResult>;
}
