//! Client seam towards the database service, and its HTTP implementation.

use crate::error::SubmitError;
use crate::submit::Endpoint;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;
use vrepl_topology::ReplicateConfiguration;

/// REST path that accepts a replicate configuration.
pub const DEFAULT_APPLY_PATH: &str = "/v2/vectordb/replicate/update_configuration";

/// Opens one connection per endpoint.
#[async_trait]
pub trait ReplicateConnector: Send + Sync {
    /// Connect to `endpoint`, giving up after `timeout`.
    async fn connect(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<Box<dyn ReplicateSession>, SubmitError>;
}

/// A live connection to one endpoint. Owned by exactly one submission.
#[async_trait]
pub trait ReplicateSession: Send {
    /// Submit `config`. An endpoint rejection is [`SubmitError::Apply`].
    async fn apply(&mut self, config: &ReplicateConfiguration) -> Result<(), SubmitError>;

    /// Release the connection.
    async fn close(self: Box<Self>);
}

/// Response envelope of the service's REST API.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiResponse {
    /// `Ok` for code 0, otherwise the server's message.
    pub(crate) fn into_result(self) -> Result<(), String> {
        if self.code == 0 {
            Ok(())
        } else {
            Err(format!(
                "code {}: {}",
                self.code,
                self.message.unwrap_or_default()
            ))
        }
    }
}

/// Connects over HTTP and applies configurations with a JSON POST.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    apply_path: String,
    token: Option<String>,
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self {
            apply_path: DEFAULT_APPLY_PATH.to_string(),
            token: None,
        }
    }
}

impl HttpConnector {
    /// Connector posting to `apply_path`, with an optional bearer token.
    pub fn new(apply_path: impl Into<String>, token: Option<String>) -> Self {
        Self {
            apply_path: apply_path.into(),
            token,
        }
    }

    fn connection_error(endpoint: &Endpoint, reason: impl Into<String>) -> SubmitError {
        SubmitError::Connection {
            endpoint: endpoint.name.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ReplicateConnector for HttpConnector {
    async fn connect(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<Box<dyn ReplicateSession>, SubmitError> {
        let base = Url::parse(&endpoint.address).map_err(|e| {
            Self::connection_error(endpoint, format!("invalid address {}: {}", endpoint.address, e))
        })?;
        let host = base
            .host_str()
            .ok_or_else(|| Self::connection_error(endpoint, "address has no host"))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = base
            .port_or_known_default()
            .ok_or_else(|| Self::connection_error(endpoint, "address has no port"))?;

        // Probe reachability so that an unreachable endpoint is reported as a
        // connection failure rather than a rejected apply.
        match tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await {
            Ok(Ok(_probe)) => {}
            Ok(Err(e)) => return Err(Self::connection_error(endpoint, e.to_string())),
            Err(_) => {
                return Err(Self::connection_error(
                    endpoint,
                    format!("connect timed out after {}s", timeout.as_secs()),
                ))
            }
        }

        let url = base
            .join(&self.apply_path)
            .map_err(|e| Self::connection_error(endpoint, format!("invalid apply path: {}", e)))?;
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| Self::connection_error(endpoint, e.to_string()))?;

        debug!(endpoint = %endpoint.name, %url, "connected");
        Ok(Box::new(HttpSession {
            endpoint: endpoint.name.clone(),
            client,
            url,
            token: self.token.clone(),
        }))
    }
}

struct HttpSession {
    endpoint: String,
    client: Client,
    url: Url,
    token: Option<String>,
}

#[async_trait]
impl ReplicateSession for HttpSession {
    async fn apply(&mut self, config: &ReplicateConfiguration) -> Result<(), SubmitError> {
        let mut request = self.client.post(self.url.clone()).json(config);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| SubmitError::Connection {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Apply {
                endpoint: self.endpoint.clone(),
                message: format!("HTTP {}", status),
            });
        }

        let body: ApiResponse = response.json().await.map_err(|e| SubmitError::Apply {
            endpoint: self.endpoint.clone(),
            message: format!("invalid response: {}", e),
        })?;

        body.into_result().map_err(|message| SubmitError::Apply {
            endpoint: self.endpoint.clone(),
            message,
        })
    }

    async fn close(self: Box<Self>) {
        debug!(endpoint = %self.endpoint, "connection closed");
    }
}
