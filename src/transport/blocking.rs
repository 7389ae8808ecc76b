//! Blocking HTTP transport.

use crate::errors::TransportError;
use crate::transport::{ApiRequest, ApiResponse};

/// Blocking HTTP transport abstraction.
pub trait BlockingHttpTransport: Send + Sync {
    /// Sends a request and collects the full response.
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Reqwest-based blocking transport.
pub struct ReqwestBlockingTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestBlockingTransport {
    /// Wraps an existing blocking client.
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// Creates a transport with a default client.
    pub fn try_default() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| TransportError::Http(format!("failed to create client: {e}")))?;
        Ok(Self { client })
    }
}

impl BlockingHttpTransport for ReqwestBlockingTransport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut req = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let response = req.send()?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes()?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
