//! OAuth2 out-of-band authentication.
//!
//! TeamSnap's OOB flow has no callback server: the authorization code is
//! displayed in the user's browser and handed over manually. The
//! [`OobAuthorizer`] models that hand-off as an explicit, resumable state
//! machine (`Unauthenticated` → `AuthorizationPending` → `Authenticated`)
//! instead of blocking inside a single call, and persists every successful
//! exchange through a [`TokenStore`].

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::errors::{AuthorizationError, TeamSnapError, TeamSnapResult};

pub mod blocking;
pub mod store;

pub use store::{FileTokenStore, InMemoryTokenStore, TokenRecord, TokenStore};

/// TeamSnap authorization endpoint.
pub const AUTHORIZE_ENDPOINT: &str = "https://auth.teamsnap.com/oauth/authorize";

/// TeamSnap token endpoint.
pub const TOKEN_ENDPOINT: &str = "https://auth.teamsnap.com/oauth/token";

/// Fixed OOB redirect sentinel: the server renders the code for manual copy
/// instead of redirecting.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Default OAuth scope requested during authorization.
pub const DEFAULT_SCOPE: &str = "read write";

/// Expiry assumed when the token endpoint omits `expires_in` (two hours).
const DEFAULT_EXPIRES_IN_SECS: i64 = 7200;

/// OAuth client credentials. Immutable once configured.
#[derive(Clone)]
pub struct Credentials {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: SecretString,
    /// Redirect URI; defaults to the OOB sentinel.
    pub redirect_uri: String,
}

impl Credentials {
    /// Creates credentials with the fixed OOB redirect URI.
    pub fn new(client_id: impl Into<String>, client_secret: SecretString) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri: OOB_REDIRECT_URI.to_string(),
        }
    }

    /// Overrides the redirect URI.
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// OAuth endpoint pair, overridable for tests.
#[derive(Clone, Debug)]
pub struct AuthEndpoints {
    /// Authorization URL the user visits.
    pub authorize_url: Url,
    /// Token exchange URL.
    pub token_url: Url,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: Url::parse(AUTHORIZE_ENDPOINT).expect("valid authorize endpoint"),
            token_url: Url::parse(TOKEN_ENDPOINT).expect("valid token endpoint"),
        }
    }
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type, usually "Bearer".
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Refresh token; refresh responses may omit it.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenRecord {
    /// Builds a record from a token endpoint response, stamping the absolute
    /// expiry from `expires_in` (default two hours when omitted).
    pub fn from_response(response: &TokenResponse) -> Self {
        let expires_in = response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        TokenRecord {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
            expires_at: Some(Utc::now() + Duration::seconds(expires_in)),
        }
    }
}

/// Authorization state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthState {
    /// No usable token record.
    Unauthenticated,
    /// Authorization URL generated; waiting for the user-supplied code.
    AuthorizationPending,
    /// A token record is held (it may still be expired and refreshable).
    Authenticated,
}

/// Supplies bearer tokens to the API client.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a currently valid access token, refreshing if necessary.
    async fn ensure_valid_token(&self) -> TeamSnapResult<String>;

    /// Forces a refresh exchange and returns the new access token. Used for
    /// the single retry after a server-side 401.
    async fn refresh(&self) -> TeamSnapResult<String>;
}

/// Builds the authorization URL the user must visit.
pub(crate) fn build_authorization_url(
    endpoints: &AuthEndpoints,
    credentials: &Credentials,
    scope: &str,
) -> Url {
    let mut url = endpoints.authorize_url.clone();
    url.query_pairs_mut()
        .append_pair("client_id", &credentials.client_id)
        .append_pair("redirect_uri", &credentials.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", scope);
    url
}

/// Form parameters for the authorization-code exchange.
pub(crate) fn code_exchange_form(credentials: &Credentials, code: &str) -> Vec<(&'static str, String)> {
    vec![
        ("grant_type", "authorization_code".to_string()),
        ("code", code.to_string()),
        ("client_id", credentials.client_id.clone()),
        ("client_secret", credentials.client_secret.expose_secret().to_string()),
        ("redirect_uri", credentials.redirect_uri.clone()),
    ]
}

/// Form parameters for the refresh-token exchange.
pub(crate) fn refresh_form(credentials: &Credentials, refresh_token: &str) -> Vec<(&'static str, String)> {
    vec![
        ("grant_type", "refresh_token".to_string()),
        ("refresh_token", refresh_token.to_string()),
        ("client_id", credentials.client_id.clone()),
        ("client_secret", credentials.client_secret.expose_secret().to_string()),
    ]
}

pub(crate) struct AuthInner {
    pub(crate) state: AuthState,
    pub(crate) token: Option<TokenRecord>,
}

impl AuthInner {
    pub(crate) fn from_store(store: &dyn TokenStore) -> Self {
        // An unreadable store is treated as absent for load; save failures
        // will still surface later.
        let token = match store.load() {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %err, "token store unreadable, starting unauthenticated");
                None
            }
        };
        let state = if token.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        };
        Self { state, token }
    }

    /// Fast-path check. Returns the access token when valid, the refresh
    /// token when an exchange is needed, or the terminal auth error.
    pub(crate) fn classify(&mut self) -> TokenCheck {
        match &self.token {
            Some(record) if !record.is_expired() => TokenCheck::Valid(record.access_token.clone()),
            Some(record) => match &record.refresh_token {
                Some(refresh) => TokenCheck::NeedsRefresh(refresh.clone()),
                None => {
                    self.state = AuthState::Unauthenticated;
                    self.token = None;
                    TokenCheck::Expired
                }
            },
            None => TokenCheck::Missing,
        }
    }
}

pub(crate) enum TokenCheck {
    Valid(String),
    NeedsRefresh(String),
    Expired,
    Missing,
}

/// Drives the OOB authorization-code and refresh-token exchanges.
///
/// Shared across concurrent async callers; token refresh is deliberately not
/// serialized. Two tasks observing an expired token may both run the refresh
/// exchange; the server treats redundant valid refreshes as benign and the
/// persisted record is last-write-wins.
pub struct OobAuthorizer {
    credentials: Credentials,
    endpoints: AuthEndpoints,
    scope: String,
    store: Arc<dyn TokenStore>,
    http: reqwest::Client,
    inner: Mutex<AuthInner>,
}

impl OobAuthorizer {
    /// Creates an authorizer, seeding its state from the store.
    pub fn new(credentials: Credentials, store: Arc<dyn TokenStore>) -> Self {
        let inner = AuthInner::from_store(store.as_ref());
        Self {
            credentials,
            endpoints: AuthEndpoints::default(),
            scope: DEFAULT_SCOPE.to_string(),
            store,
            http: reqwest::Client::new(),
            inner: Mutex::new(inner),
        }
    }

    /// Overrides the OAuth endpoints.
    pub fn with_endpoints(mut self, endpoints: AuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Overrides the requested scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Overrides the HTTP client used for token exchanges.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Current authorization state.
    pub fn state(&self) -> AuthState {
        self.inner.lock().unwrap().state
    }

    /// Builds the authorization URL and marks the flow as pending.
    ///
    /// Idempotent; may be called repeatedly while waiting for the user to
    /// paste the code. An already-authenticated authorizer keeps its state.
    pub fn begin_authorization(&self) -> Url {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != AuthState::Authenticated {
            inner.state = AuthState::AuthorizationPending;
        }
        build_authorization_url(&self.endpoints, &self.credentials, &self.scope)
    }

    /// Exchanges the user-supplied code for a token pair, persists it, and
    /// transitions to `Authenticated`.
    ///
    /// On failure the state remains `AuthorizationPending` so the user can
    /// retry with a fresh code.
    pub async fn complete_authorization(&self, code: &str) -> TeamSnapResult<TokenRecord> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthorizationError::EmptyCode.into());
        }

        let response = self
            .http
            .post(self.endpoints.token_url.clone())
            .form(&code_exchange_form(&self.credentials, code))
            .send()
            .await
            .map_err(|e| AuthorizationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthorizationError::ExchangeFailed {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthorizationError::InvalidResponse(e.to_string()))?;

        let record = TokenRecord::from_response(&token_response);
        self.store.save(&record)?;

        let mut inner = self.inner.lock().unwrap();
        inner.token = Some(record.clone());
        inner.state = AuthState::Authenticated;
        tracing::info!("authorization complete, token persisted");
        Ok(record)
    }

    /// Runs the refresh-token exchange and persists the result.
    async fn refresh_exchange(&self) -> TeamSnapResult<TokenRecord> {
        let refresh_token = {
            let mut inner = self.inner.lock().unwrap();
            match inner.classify() {
                TokenCheck::Valid(_) | TokenCheck::NeedsRefresh(_) => {
                    match inner.token.as_ref().and_then(|t| t.refresh_token.clone()) {
                        Some(refresh) => refresh,
                        None => return Err(TeamSnapError::AuthenticationExpired),
                    }
                }
                TokenCheck::Expired => return Err(TeamSnapError::AuthenticationExpired),
                TokenCheck::Missing => return Err(TeamSnapError::AuthenticationRequired),
            }
        };

        let outcome = async {
            let response = self
                .http
                .post(self.endpoints.token_url.clone())
                .form(&refresh_form(&self.credentials, &refresh_token))
                .send()
                .await
                .ok()?;
            if !response.status().is_success() {
                return None;
            }
            response.json::<TokenResponse>().await.ok()
        }
        .await;

        let token_response = match outcome {
            Some(response) => response,
            None => {
                // Refresh failed: drop back to unauthenticated so the caller
                // re-runs the interactive flow.
                let mut inner = self.inner.lock().unwrap();
                inner.state = AuthState::Unauthenticated;
                inner.token = None;
                tracing::warn!("token refresh failed, re-authorization required");
                return Err(TeamSnapError::AuthenticationExpired);
            }
        };

        let mut record = TokenRecord::from_response(&token_response);
        if record.refresh_token.is_none() {
            // Refresh responses may omit the refresh token; carry it forward.
            record.refresh_token = Some(refresh_token);
        }

        {
            let mut inner = self.inner.lock().unwrap();
            inner.token = Some(record.clone());
            inner.state = AuthState::Authenticated;
        }
        self.store.save(&record)?;
        tracing::debug!("access token refreshed");
        Ok(record)
    }
}

#[async_trait]
impl TokenProvider for OobAuthorizer {
    async fn ensure_valid_token(&self) -> TeamSnapResult<String> {
        let check = self.inner.lock().unwrap().classify();
        match check {
            TokenCheck::Valid(token) => Ok(token),
            TokenCheck::NeedsRefresh(_) => {
                let record = self.refresh_exchange().await?;
                Ok(record.access_token)
            }
            TokenCheck::Expired => Err(TeamSnapError::AuthenticationExpired),
            TokenCheck::Missing => Err(TeamSnapError::AuthenticationRequired),
        }
    }

    async fn refresh(&self) -> TeamSnapResult<String> {
        let record = self.refresh_exchange().await?;
        Ok(record.access_token)
    }
}

/// Fixed-token provider for environments that supply an access token
/// directly (`TEAMSNAP_ACCESS_TOKEN`). Cannot refresh.
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    /// Wraps a fixed access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn ensure_valid_token(&self) -> TeamSnapResult<String> {
        Ok(self.token.expose_secret().to_string())
    }

    async fn refresh(&self) -> TeamSnapResult<String> {
        Err(TeamSnapError::AuthenticationExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> Credentials {
        Credentials::new("client-123", SecretString::new("secret-456".to_string()))
    }

    #[test]
    fn authorization_url_carries_oob_parameters() {
        let url = build_authorization_url(&AuthEndpoints::default(), &test_credentials(), DEFAULT_SCOPE);

        assert_eq!(url.host_str(), Some("auth.teamsnap.com"));
        assert_eq!(url.path(), "/oauth/authorize");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("client_id".into(), "client-123".into())));
        assert!(pairs.contains(&("redirect_uri".into(), OOB_REDIRECT_URI.into())));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("scope".into(), "read write".into())));
    }

    #[test]
    fn begin_authorization_is_idempotent() {
        let store = Arc::new(InMemoryTokenStore::new());
        let authorizer = OobAuthorizer::new(test_credentials(), store);

        assert_eq!(authorizer.state(), AuthState::Unauthenticated);
        let first = authorizer.begin_authorization();
        assert_eq!(authorizer.state(), AuthState::AuthorizationPending);
        let second = authorizer.begin_authorization();
        assert_eq!(first, second);
        assert_eq!(authorizer.state(), AuthState::AuthorizationPending);
    }

    #[test]
    fn seeded_store_starts_authenticated() {
        let record = TokenRecord {
            access_token: "tok".into(),
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::hours(1)),
        };
        let store = Arc::new(InMemoryTokenStore::with_record(record));
        let authorizer = OobAuthorizer::new(test_credentials(), store);
        assert_eq!(authorizer.state(), AuthState::Authenticated);
    }

    #[tokio::test]
    async fn valid_token_fast_path_makes_no_network_call() {
        let record = TokenRecord {
            access_token: "fresh-token".into(),
            refresh_token: Some("refresh".into()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        };
        let store = Arc::new(InMemoryTokenStore::with_record(record));
        // Endpoints point at an unroutable host: any network attempt fails,
        // so success proves the fast path never left the process.
        let authorizer = OobAuthorizer::new(test_credentials(), store.clone()).with_endpoints(
            AuthEndpoints {
                authorize_url: Url::parse("http://127.0.0.1:1/authorize").unwrap(),
                token_url: Url::parse("http://127.0.0.1:1/token").unwrap(),
            },
        );

        let token = authorizer.ensure_valid_token().await.unwrap();
        assert_eq!(token, "fresh-token");
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn missing_token_requires_authentication() {
        let store = Arc::new(InMemoryTokenStore::new());
        let authorizer = OobAuthorizer::new(test_credentials(), store);

        let err = authorizer.ensure_valid_token().await.unwrap_err();
        assert!(matches!(err, TeamSnapError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn expired_token_without_refresh_expires_the_session() {
        let record = TokenRecord {
            access_token: "stale".into(),
            refresh_token: None,
            expires_at: Some(Utc::now() - Duration::minutes(5)),
        };
        let store = Arc::new(InMemoryTokenStore::with_record(record));
        let authorizer = OobAuthorizer::new(test_credentials(), store);

        let err = authorizer.ensure_valid_token().await.unwrap_err();
        assert!(matches!(err, TeamSnapError::AuthenticationExpired));
        assert_eq!(authorizer.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn empty_code_is_rejected_before_any_request() {
        let store = Arc::new(InMemoryTokenStore::new());
        let authorizer = OobAuthorizer::new(test_credentials(), store);
        authorizer.begin_authorization();

        let err = authorizer.complete_authorization("   ").await.unwrap_err();
        assert!(matches!(
            err,
            TeamSnapError::Authorization(AuthorizationError::EmptyCode)
        ));
        assert_eq!(authorizer.state(), AuthState::AuthorizationPending);
    }

    #[tokio::test]
    async fn static_provider_returns_token_and_cannot_refresh() {
        let provider = StaticTokenProvider::new("env-token");
        assert_eq!(provider.ensure_valid_token().await.unwrap(), "env-token");
        assert!(matches!(
            provider.refresh().await,
            Err(TeamSnapError::AuthenticationExpired)
        ));
    }

    #[test]
    fn token_record_from_response_defaults_expiry() {
        let response = TokenResponse {
            access_token: "tok".into(),
            token_type: "Bearer".into(),
            expires_in: None,
            refresh_token: None,
            scope: None,
        };
        let record = TokenRecord::from_response(&response);
        let expires_at = record.expires_at.unwrap();
        let lifetime = expires_at - Utc::now();
        assert!(lifetime > Duration::seconds(7000) && lifetime <= Duration::seconds(7200));
    }
}
