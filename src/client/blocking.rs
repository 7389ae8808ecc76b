//! Blocking TeamSnap API client.
//!
//! The scriptable variant: one request in flight per call, no internal
//! threading, read operations plus the generic escape hatch. Writes are
//! modeled only on the async client.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth::blocking::{BlockingOobAuthorizer, BlockingTokenProvider, StaticBlockingTokenProvider};
use crate::auth::{FileTokenStore, TokenStore};
use crate::config::{TeamSnapConfig, TeamSnapConfigBuilder};
use crate::envelope::{decode_collection, extract_link, parse_envelope, Envelope, Record};
use crate::errors::{EnvelopeError, TeamSnapError, TeamSnapResult};
use crate::observability::{deprecated_links, ApiVersionMonitor, DeprecatedLink};
use crate::resources::EntityKind;
use crate::services::{
    AssignmentSearchParams, AvailabilitySearchParams, BroadcastEmailSearchParams,
    EventSearchParams, ForumPostSearchParams, ForumTopicSearchParams, LocationSearchParams,
    MemberSearchParams, MessageSearchParams, OpponentSearchParams, TeamSearchParams,
};
use crate::transport::blocking::{BlockingHttpTransport, ReqwestBlockingTransport};
use crate::transport::{ApiRequest, ApiResponse};

/// One page of blocking search results. Follow-up pages come from
/// [`BlockingTeamSnapClient::next_page`].
pub struct BlockingRecordPage {
    records: Vec<Record>,
    next: Option<Url>,
}

impl BlockingRecordPage {
    fn from_envelope(envelope: &Envelope) -> TeamSnapResult<Self> {
        let records = decode_collection(envelope)?;
        let next = match extract_link(&envelope.collection.links, "next") {
            Some(href) => Some(Url::parse(href).map_err(|_| EnvelopeError::InvalidLink {
                rel: "next".to_string(),
                href: href.to_string(),
            })?),
            None => None,
        };
        Ok(Self { records, next })
    }

    /// The records on this page, in response order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the page, returning its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Number of records on this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if this page has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if a further page exists.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Blocking TeamSnap API client.
pub struct BlockingTeamSnapClient {
    config: TeamSnapConfig,
    transport: Arc<dyn BlockingHttpTransport>,
    auth: Arc<dyn BlockingTokenProvider>,
    monitor: ApiVersionMonitor,
}

impl BlockingTeamSnapClient {
    /// Creates a client builder.
    pub fn builder() -> BlockingTeamSnapClientBuilder {
        BlockingTeamSnapClientBuilder::new()
    }

    fn build_url(&self, path: &str) -> TeamSnapResult<Url> {
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

    fn send_once(
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
        self.transport.execute(request).map_err(Into::into)
    }

    fn dispatch(&self, method: Method, url: Url, body: Option<Value>) -> TeamSnapResult<ApiResponse> {
        let token = self.auth.ensure_valid_token()?;
        let response = self.send_once(method.clone(), url.clone(), &body, &token)?;

        if response.status == StatusCode::UNAUTHORIZED {
            tracing::debug!(url = %url, "401 from API, retrying once after token refresh");
            return match self.auth.refresh() {
                Ok(fresh) => {
                    let retry = self.send_once(method, url, &body, &fresh)?;
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

    fn get_envelope<Q>(&self, path: &str, query: Option<&Q>) -> TeamSnapResult<Envelope>
    where
        Q: Serialize + ?Sized,
    {
        let url = self.build_url_with_query(path, query)?;
        let response = self.dispatch(Method::GET, url, None)?;
        self.decode(&response)
    }

    fn search<Q: Serialize>(&self, kind: EntityKind, params: &Q) -> TeamSnapResult<BlockingRecordPage> {
        let envelope = self.get_envelope(&kind.search_path(), Some(params))?;
        BlockingRecordPage::from_envelope(&envelope)
    }

    fn get_single(&self, kind: EntityKind, id: u64) -> TeamSnapResult<Record> {
        let envelope = self.get_envelope(&kind.item_path(id), None::<&()>)?;
        crate::services::single_record(&envelope)
    }

    /// Fetches the authenticated user.
    pub fn me(&self) -> TeamSnapResult<Record> {
        let envelope = self.get_envelope("me", None::<&()>)?;
        crate::services::single_record(&envelope)
    }

    /// Fetches one user by id.
    pub fn get_user(&self, user_id: u64) -> TeamSnapResult<Record> {
        self.get_single(EntityKind::User, user_id)
    }

    /// Searches for teams.
    pub fn search_teams(&self, params: TeamSearchParams) -> TeamSnapResult<BlockingRecordPage> {
        self.search(EntityKind::Team, &params)
    }

    /// Fetches one team by id.
    pub fn get_team(&self, team_id: u64) -> TeamSnapResult<Record> {
        self.get_single(EntityKind::Team, team_id)
    }

    /// Searches for members.
    pub fn search_members(&self, params: MemberSearchParams) -> TeamSnapResult<BlockingRecordPage> {
        self.search(EntityKind::Member, &params)
    }

    /// Fetches one member by id.
    pub fn get_member(&self, member_id: u64) -> TeamSnapResult<Record> {
        self.get_single(EntityKind::Member, member_id)
    }

    /// Searches for events.
    pub fn search_events(&self, params: EventSearchParams) -> TeamSnapResult<BlockingRecordPage> {
        self.search(EntityKind::Event, &params)
    }

    /// Fetches one event by id.
    pub fn get_event(&self, event_id: u64) -> TeamSnapResult<Record> {
        self.get_single(EntityKind::Event, event_id)
    }

    /// Searches for availability responses.
    pub fn search_availabilities(
        &self,
        params: AvailabilitySearchParams,
    ) -> TeamSnapResult<BlockingRecordPage> {
        self.search(EntityKind::Availability, &params)
    }

    /// Searches for assignments.
    pub fn search_assignments(
        &self,
        params: AssignmentSearchParams,
    ) -> TeamSnapResult<BlockingRecordPage> {
        self.search(EntityKind::Assignment, &params)
    }

    /// Searches for locations.
    pub fn search_locations(
        &self,
        params: LocationSearchParams,
    ) -> TeamSnapResult<BlockingRecordPage> {
        self.search(EntityKind::Location, &params)
    }

    /// Searches for opponents.
    pub fn search_opponents(
        &self,
        params: OpponentSearchParams,
    ) -> TeamSnapResult<BlockingRecordPage> {
        self.search(EntityKind::Opponent, &params)
    }

    /// Searches for message-board topics.
    pub fn search_forum_topics(
        &self,
        params: ForumTopicSearchParams,
    ) -> TeamSnapResult<BlockingRecordPage> {
        self.search(EntityKind::ForumTopic, &params)
    }

    /// Searches for message-board posts.
    pub fn search_forum_posts(
        &self,
        params: ForumPostSearchParams,
    ) -> TeamSnapResult<BlockingRecordPage> {
        self.search(EntityKind::ForumPost, &params)
    }

    /// Searches for broadcast emails.
    pub fn search_broadcast_emails(
        &self,
        params: BroadcastEmailSearchParams,
    ) -> TeamSnapResult<BlockingRecordPage> {
        self.search(EntityKind::BroadcastEmail, &params)
    }

    /// Searches for messages.
    pub fn search_messages(
        &self,
        params: MessageSearchParams,
    ) -> TeamSnapResult<BlockingRecordPage> {
        self.search(EntityKind::Message, &params)
    }

    /// Fetches the page a search result's `next` link points at. `Ok(None)`
    /// signals the end of pagination.
    pub fn next_page(&self, page: &BlockingRecordPage) -> TeamSnapResult<Option<BlockingRecordPage>> {
        match &page.next {
            None => Ok(None),
            Some(url) => {
                let response = self.dispatch(Method::GET, url.clone(), None)?;
                let envelope = self.decode(&response)?;
                Ok(Some(BlockingRecordPage::from_envelope(&envelope)?))
            }
        }
    }

    /// Fetches the API root and returns the version it reports.
    pub fn api_version(&self) -> TeamSnapResult<Option<String>> {
        let envelope = self.get_envelope("", None::<&()>)?;
        Ok(envelope.collection.version)
    }

    /// Scans an endpoint for links the server has flagged as deprecated.
    pub fn check_for_deprecations(&self, path: &str) -> TeamSnapResult<Vec<DeprecatedLink>> {
        let envelope = self.get_envelope(path, None::<&()>)?;
        Ok(deprecated_links(&envelope.collection))
    }

    /// Escape hatch for endpoints without a dedicated method.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<Value>,
        body: Option<Value>,
    ) -> TeamSnapResult<Vec<Record>> {
        let url = self.build_url_with_query(path, query.as_ref())?;
        let response = self.dispatch(method, url, body)?;
        let envelope = self.decode(&response)?;
        Ok(decode_collection(&envelope)?)
    }
}

/// Builder for [`BlockingTeamSnapClient`].
pub struct BlockingTeamSnapClientBuilder {
    config: TeamSnapConfigBuilder,
    auth: Option<Arc<dyn BlockingTokenProvider>>,
    token_file: Option<std::path::PathBuf>,
    transport: Option<Arc<dyn BlockingHttpTransport>>,
}

impl BlockingTeamSnapClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: TeamSnapConfig::builder(),
            auth: None,
            token_file: None,
            transport: None,
        }
    }

    /// Sets the API root URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.base_url(url);
        self
    }

    /// Sets the OAuth endpoints.
    pub fn auth_endpoints(mut self, endpoints: crate::auth::AuthEndpoints) -> Self {
        self.config = self.config.auth_endpoints(endpoints);
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Authenticates with a fixed access token (no refresh).
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(Arc::new(StaticBlockingTokenProvider::new(token.into())));
        self
    }

    /// Supplies an explicit token provider.
    pub fn token_provider(mut self, provider: Arc<dyn BlockingTokenProvider>) -> Self {
        self.auth = Some(provider);
        self
    }

    /// Authenticates via the OOB flow backed by a token file.
    pub fn token_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Overrides the HTTP transport (tests).
    pub fn transport(mut self, transport: Arc<dyn BlockingHttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> TeamSnapResult<BlockingTeamSnapClient> {
        let config = self.config.build()?;

        let auth: Arc<dyn BlockingTokenProvider> = match (self.auth, self.token_file) {
            (Some(auth), _) => auth,
            (None, Some(path)) => {
                let store = FileTokenStore::new(path);
                let credentials = store.credentials()?;
                let store: Arc<dyn TokenStore> = Arc::new(store);
                Arc::new(
                    BlockingOobAuthorizer::new(credentials, store)
                        .with_endpoints(config.auth_endpoints.clone())
                        .with_scope(config.scope.clone()),
                )
            }
            (None, None) => {
                return Err(TeamSnapError::Configuration(
                    "no authentication configured; supply an access token, token provider, or \
                     token file"
                        .to_string(),
                ))
            }
        };

        let transport: Arc<dyn BlockingHttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestBlockingTransport::try_default()?),
        };

        let monitor = ApiVersionMonitor::new(config.monitor_deprecations);
        Ok(BlockingTeamSnapClient {
            config,
            transport,
            auth,
            monitor,
        })
    }
}

impl Default for BlockingTeamSnapClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
