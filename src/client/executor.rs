//! Request executor: auth injection, error mapping, envelope decoding.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth::TokenProvider;
use crate::config::{Mode, TeamSnapConfig};
use crate::envelope::{parse_envelope, Envelope};
use crate::errors::{TeamSnapError, TeamSnapResult};
use crate::observability::ApiVersionMonitor;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};

/// Executes API requests for the async client.
///
/// Every call ensures a valid bearer token first, absorbs exactly one
/// server-side 401 with a refresh-and-retry, decodes the Collection+JSON
/// envelope, and feeds the result to the version/deprecation monitor.
pub struct RequestExecutor {
    config: TeamSnapConfig,
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn TokenProvider>,
    monitor: ApiVersionMonitor,
}

impl RequestExecutor {
    pub(crate) fn new(
        config: TeamSnapConfig,
        transport: Arc<dyn HttpTransport>,
        auth: Arc<dyn TokenProvider>,
    ) -> Self {
        let monitor = ApiVersionMonitor::new(config.monitor_deprecations);
        Self {
            config,
            transport,
            auth,
            monitor,
        }
    }

    /// The client configuration.
    pub fn config(&self) -> &TeamSnapConfig {
        &self.config
    }

    /// The read-only/write-enabled mode.
    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// The version/deprecation monitor.
    pub fn monitor(&self) -> &ApiVersionMonitor {
        &self.monitor
    }

    /// Rejects mutating calls in read-only mode before any token check or
    /// network activity.
    pub(crate) fn check_writable(&self) -> TeamSnapResult<()> {
        if self.config.mode.is_read_only() {
            return Err(TeamSnapError::WriteDisabled);
        }
        Ok(())
    }

    /// Resolves a path against the API root.
    pub(crate) fn build_url(&self, path: &str) -> TeamSnapResult<Url> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let raw = if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        };
        Url::parse(&raw).map_err(|e| TeamSnapError::Request(format!("invalid URL {raw:?}: {e}")))
    }

    fn build_url_with_query<Q>(&self, path: &str, query: Option<&Q>) -> TeamSnapResult<Url>
    where
        Q: Serialize + ?Sized,
    {
        let mut url = self.build_url(path)?;
        if let Some(query) = query {
            let encoded = serde_urlencoded::to_string(query)
                .map_err(|e| TeamSnapError::Request(format!("unserializable query: {e}")))?;
            if !encoded.is_empty() {
                url.set_query(Some(&encoded));
            }
        }
        Ok(url)
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: &Option<Value>,
        token: &str,
    ) -> TeamSnapResult<ApiResponse> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| TeamSnapError::Request(format!("invalid auth header: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent)
                .map_err(|e| TeamSnapError::Request(format!("invalid user agent: {e}")))?,
        );
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let request = ApiRequest {
            method,
            url,
            headers,
            body: body.clone(),
            timeout: Some(self.config.timeout),
        };
        self.transport.execute(request).await.map_err(Into::into)
    }

    /// Sends a request with bearer auth and the single 401 retry.
    async fn dispatch(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> TeamSnapResult<ApiResponse> {
        let token = self.auth.ensure_valid_token().await?;
        let response = self.send_once(method.clone(), url.clone(), &body, &token).await?;

        if response.status == StatusCode::UNAUTHORIZED {
            // The token may have expired between our own check and the
            // server's. One refresh-and-retry absorbs that window; a second
            // 401 surfaces as-is.
            tracing::debug!(url = %url, "401 from API, retrying once after token refresh");
            return match self.auth.refresh().await {
                Ok(fresh) => {
                    let retry = self.send_once(method, url, &body, &fresh).await?;
                    Self::success_or_api_error(retry)
                }
                Err(_) => Err(Self::api_error(&response)),
            };
        }

        Self::success_or_api_error(response)
    }

    fn success_or_api_error(response: ApiResponse) -> TeamSnapResult<ApiResponse> {
        if response.status.is_success() {
            Ok(response)
        } else {
            Err(Self::api_error(&response))
        }
    }

    fn api_error(response: &ApiResponse) -> TeamSnapError {
        let message = String::from_utf8_lossy(&response.body).trim().to_string();
        let message = if message.is_empty() {
            response
                .status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            message
        };
        TeamSnapError::api(response.status.as_u16(), message)
    }

    fn decode(&self, response: &ApiResponse) -> TeamSnapResult<Envelope> {
        let envelope = parse_envelope(&response.body)?;
        self.monitor.observe(&envelope.collection);
        Ok(envelope)
    }

    /// GET a path and decode the envelope.
    pub(crate) async fn get_envelope<Q>(
        &self,
        path: &str,
        query: Option<&Q>,
    ) -> TeamSnapResult<Envelope>
    where
        Q: Serialize + ?Sized,
    {
        let url = self.build_url_with_query(path, query)?;
        let response = self.dispatch(Method::GET, url, None).await?;
        self.decode(&response)
    }

    /// GET an absolute URL (pagination links) and decode the envelope.
    pub(crate) async fn get_envelope_at(&self, url: Url) -> TeamSnapResult<Envelope> {
        let response = self.dispatch(Method::GET, url, None).await?;
        self.decode(&response)
    }

    /// POST a write body. Gated by the mode.
    pub(crate) async fn post_envelope(&self, path: &str, body: Value) -> TeamSnapResult<Envelope> {
        self.check_writable()?;
        let url = self.build_url(path)?;
        let response = self.dispatch(Method::POST, url, Some(body)).await?;
        self.decode(&response)
    }

    /// PATCH a write body. Gated by the mode.
    pub(crate) async fn patch_envelope(&self, path: &str, body: Value) -> TeamSnapResult<Envelope> {
        self.check_writable()?;
        let url = self.build_url(path)?;
        let response = self.dispatch(Method::PATCH, url, Some(body)).await?;
        self.decode(&response)
    }

    /// DELETE an item. Gated by the mode; the response body is discarded.
    pub(crate) async fn delete(&self, path: &str) -> TeamSnapResult<()> {
        self.check_writable()?;
        let url = self.build_url(path)?;
        self.dispatch(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// Escape hatch for endpoints without a dedicated method. Mutating
    /// methods remain gated by the mode.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&Value>,
        body: Option<Value>,
    ) -> TeamSnapResult<Envelope> {
        if !matches!(method, Method::GET | Method::HEAD) {
            self.check_writable()?;
        }
        let url = self.build_url_with_query(path, query)?;
        let response = self.dispatch(method, url, body).await?;
        self.decode(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn executor_with(transport: Arc<MockTransport>, mode: Mode) -> RequestExecutor {
        let config = TeamSnapConfig::builder().mode(mode).build().unwrap();
        RequestExecutor::new(
            config,
            transport,
            Arc::new(StaticTokenProvider::new("test-token")),
        )
    }

    #[test]
    fn build_url_joins_paths_against_the_root() {
        let executor = executor_with(Arc::new(MockTransport::new()), Mode::ReadWrite);
        assert_eq!(
            executor.build_url("teams/search").unwrap().as_str(),
            "https://api.teamsnap.com/v3/teams/search"
        );
        assert_eq!(
            executor.build_url("/me").unwrap().as_str(),
            "https://api.teamsnap.com/v3/me"
        );
        assert_eq!(
            executor.build_url("").unwrap().as_str(),
            "https://api.teamsnap.com/v3"
        );
    }

    #[tokio::test]
    async fn get_executes_exactly_one_request() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"collection": {"items": []}}));
        let executor = executor_with(transport.clone(), Mode::ReadWrite);

        executor
            .get_envelope("me", None::<&()>)
            .await
            .unwrap();
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn read_only_mode_blocks_writes_without_any_request() {
        let transport = Arc::new(MockTransport::new());
        let executor = executor_with(transport.clone(), Mode::ReadOnly);

        let err = executor
            .post_envelope("events", json!({"template": {"data": []}}))
            .await
            .unwrap_err();
        assert!(matches!(err, TeamSnapError::WriteDisabled));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn non_2xx_maps_to_api_error() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(404, json!({"message": "not found"}));
        let executor = executor_with(transport.clone(), Mode::ReadWrite);

        let err = executor
            .get_envelope("teams/999", None::<&()>)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn double_401_surfaces_api_error() {
        // StaticTokenProvider cannot refresh, so the first 401 surfaces.
        let transport = Arc::new(MockTransport::new());
        transport.push_json(401, json!({"message": "unauthorized"}));
        let executor = executor_with(transport.clone(), Mode::ReadWrite);

        let err = executor
            .get_envelope("me", None::<&()>)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn escape_hatch_gates_mutating_methods() {
        let transport = Arc::new(MockTransport::new());
        let executor = executor_with(transport.clone(), Mode::ReadOnly);

        let err = executor
            .request(Method::POST, "events", None, Some(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, TeamSnapError::WriteDisabled));
        assert_eq!(transport.request_count(), 0);
    }
}
