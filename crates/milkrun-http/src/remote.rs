//! Collection server client.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use milkrun_core::Result;
use milkrun_core::error::{Error, InvalidInputError, ProtocolError};
use milkrun_core::submission::{SubmissionEntry, SubmissionResult};
use milkrun_core::traits::SubmissionClient;
use milkrun_core::types::{Farm, Operator, ServerUrl};

use crate::client::{ApiClient, ClientConfig};
use crate::endpoints::*;

/// The collection server, reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: ApiClient,
}

impl HttpRemote {
    /// Create a client for the server described by `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
        })
    }

    /// Returns the server URL for this client.
    pub fn server(&self) -> &ServerUrl {
        self.client.server()
    }

    /// Authenticate an operator.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Operator> {
        if username.trim().is_empty() {
            return Err(InvalidInputError::Missing { field: "username" }.into());
        }
        if password.is_empty() {
            return Err(InvalidInputError::Missing { field: "password" }.into());
        }

        let request = LoginRequest { username, password };
        let response: LoginResponse = self.client.post(LOGIN, &request).await?;

        match response {
            LoginResponse {
                success: true,
                user: Some(user),
                ..
            } => {
                debug!(operator = %user.id, "Logged in");
                Ok(user.into())
            }
            LoginResponse { message, .. } => Err(Error::Protocol(ProtocolError::new(
                200,
                Some(message.unwrap_or_else(|| "login was not accepted".to_string())),
            ))),
        }
    }

    /// Fetch the current farm list.
    #[instrument(skip(self))]
    pub async fn farms(&self) -> Result<Vec<Farm>> {
        let response: FarmsResponse = self.client.get(FARMS).await?;

        if !response.success {
            return Err(Error::Protocol(ProtocolError::new(200, response.message)));
        }

        debug!(count = response.farms.len(), "Fetched farms");
        Ok(response.farms.into_iter().map(Farm::from).collect())
    }

    /// Check that the server is reachable and healthy.
    pub async fn health(&self) -> Result<()> {
        self.client.get_no_response(HEALTH).await
    }

    /// Connectivity probe: true if [`health`](Self::health) succeeds.
    pub async fn is_reachable(&self) -> bool {
        match self.health().await {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Server unreachable");
                false
            }
        }
    }
}

#[async_trait]
impl SubmissionClient for HttpRemote {
    #[instrument(skip(self, batch), fields(server = %self.client.server(), records = batch.len()))]
    async fn submit(&self, batch: &[SubmissionEntry]) -> Result<SubmissionResult> {
        let request = SyncRequest {
            records: batch.iter().map(SyncRecord::from).collect(),
        };

        let response: SyncResponse = self.client.post(SYNC_RECORDS, &request).await?;

        if !response.success {
            warn!(message = ?response.message, "Server refused batch");
            return Err(Error::Protocol(ProtocolError::new(200, response.message)));
        }

        let result = SubmissionResult {
            accepted: response.synced_ids.into_iter().map(Into::into).collect(),
            rejected: response
                .errors
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
        };

        debug!(
            accepted = result.accepted.len(),
            rejected = result.rejected.len(),
            "Batch processed"
        );

        Ok(result)
    }
}
