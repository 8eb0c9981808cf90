//! JSON-over-HTTP client for the collection server API.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use milkrun_core::error::{Error, ProtocolError, TransportError};
use milkrun_core::types::ServerUrl;

use crate::endpoints::ErrorResponse;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for the collection server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the server API.
    pub server: ServerUrl,
    /// Upper bound on a whole request, connect to last byte. A request that
    /// exceeds it fails as a transport timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl ClientConfig {
    /// Settings for `server` with the default timeout.
    pub fn new(server: ServerUrl) -> Self {
        Self {
            server,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("milkrun/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for API requests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    server: ServerUrl,
    timeout: Duration,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Http {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            server: config.server,
            timeout: config.timeout,
        })
    }

    /// Returns the server this client talks to.
    pub fn server(&self) -> &ServerUrl {
        &self.server
    }

    /// Returns the configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Make a GET request and decode the JSON response.
    #[instrument(skip(self), fields(server = %self.server))]
    pub async fn get<R>(&self, path: &str) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        let url = self.server.endpoint(path);
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        self.handle_response(response).await
    }

    /// Make a GET request, caring only about the status.
    #[instrument(skip(self), fields(server = %self.server))]
    pub async fn get_no_response(&self, path: &str) -> Result<(), Error> {
        let url = self.server.endpoint(path);
        debug!(%url, "GET (no response)");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::Protocol(Self::parse_error_response(response).await))
        }
    }

    /// Make a POST request with a JSON body and decode the JSON response.
    #[instrument(skip(self, body), fields(server = %self.server))]
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.server.endpoint(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        self.handle_response(response).await
    }

    /// Map a reqwest failure onto the transport taxonomy.
    fn transport(&self, err: reqwest::Error) -> Error {
        let err = if err.is_timeout() {
            TransportError::Timeout {
                duration_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        };
        Error::Transport(err)
    }

    /// Handle a response, decoding the body or the error.
    async fn handle_response<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R, Error> {
        let status = response.status();
        trace!(status = %status, "API response");

        if !status.is_success() {
            return Err(Error::Protocol(Self::parse_error_response(response).await));
        }

        let bytes = response.bytes().await.map_err(|e| self.transport(e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            Error::Protocol(ProtocolError::new(
                status.as_u16(),
                Some(format!("malformed response body: {}", e)),
            ))
        })
    }

    /// Parse an error response.
    async fn parse_error_response(response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => ProtocolError::new(status, body.message),
            Err(_) => ProtocolError::new(status, None),
        }
    }
}
