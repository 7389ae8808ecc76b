//! TeamSnap API clients.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use crate::auth::{
    FileTokenStore, OobAuthorizer, StaticTokenProvider, TokenProvider, TokenStore,
};
use crate::config::{EnvConfig, Mode, TeamSnapConfig, TeamSnapConfigBuilder};
use crate::envelope::{decode_collection, Record};
use crate::errors::{TeamSnapError, TeamSnapResult};
use crate::observability::{deprecated_links, DeprecatedLink};
use crate::services::*;
use crate::transport::{HttpTransport, ReqwestTransport};

pub mod blocking;
pub(crate) mod executor;

pub use blocking::{BlockingRecordPage, BlockingTeamSnapClient};
pub use executor::RequestExecutor;

/// Async TeamSnap API client.
///
/// The entry point for the assistant-facing integration: resource services
/// per entity, a read-only mode gate on every mutating call, and advisory
/// version/deprecation monitoring on every decoded response.
pub struct TeamSnapClient {
    executor: Arc<RequestExecutor>,
}

impl TeamSnapClient {
    /// Creates a client from a configuration and token provider.
    pub fn new(config: TeamSnapConfig, auth: Arc<dyn TokenProvider>) -> TeamSnapResult<Self> {
        config.validate()?;
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::try_default()?);
        Ok(Self {
            executor: Arc::new(RequestExecutor::new(config, transport, auth)),
        })
    }

    /// Creates a client builder.
    pub fn builder() -> TeamSnapClientBuilder {
        TeamSnapClientBuilder::new()
    }

    /// Creates a client from the process environment: a fixed
    /// `TEAMSNAP_ACCESS_TOKEN` and the `TEAMSNAP_READONLY` flag (read-only by
    /// default).
    pub fn from_env() -> TeamSnapResult<Self> {
        let env = EnvConfig::load();
        let token = env.access_token.ok_or_else(|| {
            TeamSnapError::Configuration(format!(
                "no access token provided; set {} or authorize interactively",
                crate::config::ENV_ACCESS_TOKEN
            ))
        })?;
        Self::builder().access_token(token).mode(env.mode).build()
    }

    /// The read-only/write-enabled mode, fixed at construction.
    pub fn mode(&self) -> Mode {
        self.executor.mode()
    }

    /// Access the team service.
    pub fn teams(&self) -> TeamsService {
        TeamsService::new(self.executor.clone())
    }

    /// Access the user service.
    pub fn users(&self) -> UsersService {
        UsersService::new(self.executor.clone())
    }

    /// Access the member service.
    pub fn members(&self) -> MembersService {
        MembersService::new(self.executor.clone())
    }

    /// Access the event service.
    pub fn events(&self) -> EventsService {
        EventsService::new(self.executor.clone())
    }

    /// Access the availability service.
    pub fn availabilities(&self) -> AvailabilitiesService {
        AvailabilitiesService::new(self.executor.clone())
    }

    /// Access the assignment service.
    pub fn assignments(&self) -> AssignmentsService {
        AssignmentsService::new(self.executor.clone())
    }

    /// Access the location service.
    pub fn locations(&self) -> LocationsService {
        LocationsService::new(self.executor.clone())
    }

    /// Access the opponent service.
    pub fn opponents(&self) -> OpponentsService {
        OpponentsService::new(self.executor.clone())
    }

    /// Access the messaging service (forum topics/posts, broadcast emails,
    /// messages).
    pub fn messaging(&self) -> MessagingService {
        MessagingService::new(self.executor.clone())
    }

    /// Fetches the API root and returns the version it reports.
    ///
    /// The version is also tracked across calls; a change emits an advisory
    /// warning.
    pub async fn api_version(&self) -> TeamSnapResult<Option<String>> {
        let envelope = self.executor.get_envelope("", None::<&()>).await?;
        Ok(envelope.collection.version)
    }

    /// Scans an endpoint for links the server has flagged as deprecated.
    pub async fn check_for_deprecations(&self, path: &str) -> TeamSnapResult<Vec<DeprecatedLink>> {
        let envelope = self.executor.get_envelope(path, None::<&()>).await?;
        Ok(deprecated_links(&envelope.collection))
    }

    /// Escape hatch for endpoints without a dedicated method.
    ///
    /// Mutating methods remain gated by the mode. Returns the decoded records
    /// of the response collection.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<Value>,
        body: Option<Value>,
    ) -> TeamSnapResult<Vec<Record>> {
        let envelope = self
            .executor
            .request(method, path, query.as_ref(), body)
            .await?;
        Ok(decode_collection(&envelope)?)
    }
}

/// Builder for [`TeamSnapClient`].
pub struct TeamSnapClientBuilder {
    config: TeamSnapConfigBuilder,
    auth: Option<Arc<dyn TokenProvider>>,
    token_file: Option<std::path::PathBuf>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl TeamSnapClientBuilder {
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

    /// Sets the read-only/write-enabled mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config = self.config.mode(mode);
        self
    }

    /// Enables or disables deprecation advisories.
    pub fn monitor_deprecations(mut self, enabled: bool) -> Self {
        self.config = self.config.monitor_deprecations(enabled);
        self
    }

    /// Authenticates with a fixed access token (no refresh).
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(Arc::new(StaticTokenProvider::new(token.into())));
        self
    }

    /// Supplies an explicit token provider.
    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.auth = Some(provider);
        self
    }

    /// Authenticates via the OOB flow backed by a token file. The file's
    /// credentials are read at build time; tokens are persisted back after
    /// every exchange.
    pub fn token_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Overrides the HTTP transport (tests).
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> TeamSnapResult<TeamSnapClient> {
        let config = self.config.build()?;

        let auth: Arc<dyn TokenProvider> = match (self.auth, self.token_file) {
            (Some(auth), _) => auth,
            (None, Some(path)) => {
                let store = FileTokenStore::new(path);
                let credentials = store.credentials()?;
                let store: Arc<dyn TokenStore> = Arc::new(store);
                Arc::new(
                    OobAuthorizer::new(credentials, store)
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

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::try_default()?),
        };

        Ok(TeamSnapClient {
            executor: Arc::new(RequestExecutor::new(config, transport, auth)),
        })
    }
}

impl Default for TeamSnapClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_authentication() {
        let err = TeamSnapClient::builder().build();
        assert!(matches!(err, Err(TeamSnapError::Configuration(_))));
    }

    #[test]
    fn builder_with_access_token_builds() {
        let client = TeamSnapClient::builder()
            .access_token("tok")
            .mode(Mode::ReadOnly)
            .build()
            .unwrap();
        assert_eq!(client.mode(), Mode::ReadOnly);
    }
}
