//! HTTP transport layer.
//!
//! A thin seam between the request executor and the wire, abstracted so tests
//! can spy on call counts and queue canned responses.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::errors::TransportError;

pub mod blocking;

/// An outgoing API request.
#[derive(Debug)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Fully resolved URL, query included.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// JSON body for create/update calls.
    pub body: Option<Value>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

/// A received API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body bytes.
    pub body: Bytes,
}

/// Async HTTP transport abstraction.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and collects the full response.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Reqwest-based async transport.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wraps an existing reqwest client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Creates a transport with a default client.
    pub fn try_default() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Http(format!("failed to create client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
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

        let response = req.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

/// Mock transport: queues canned responses and records every request.
///
/// The request log doubles as a call-count spy, which is how the read-only
/// gate's "zero HTTP requests" contract is verified.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<(Method, Url)>>,
}

impl MockTransport {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON response.
    pub fn push_json(&self, status: u16, body: Value) {
        let response = ApiResponse {
            status: StatusCode::from_u16(status).expect("valid status code"),
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        };
        self.responses.lock().unwrap().push_back(response);
    }

    /// Number of requests executed.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Methods and URLs of every executed request, in order.
    pub fn requests(&self) -> Vec<(Method, Url)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.method.clone(), request.url.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Http("no mock response queued".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn mock_transport_records_requests_in_order() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"collection": {"items": []}}));

        let request = ApiRequest {
            method: Method::GET,
            url: Url::parse("https://api.teamsnap.com/v3/teams/search").unwrap(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        };
        let response = mock.execute(request).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(mock.request_count(), 1);
        assert_eq!(mock.requests()[0].0, Method::GET);
    }

    #[tokio::test]
    async fn mock_transport_errors_when_queue_is_empty() {
        let mock = MockTransport::new();
        let request = ApiRequest {
            method: Method::GET,
            url: Url::parse("https://api.teamsnap.com/v3/me").unwrap(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        };
        assert!(mock.execute(request).await.is_err());
    }
}
