//! Blocking variants of the token provider and OOB authorizer.
//!
//! The scriptable client is fully synchronous; it shares the URL and form
//! construction with the async authorizer and differs only in transport.

use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::auth::{
    build_authorization_url, code_exchange_form, refresh_form, AuthEndpoints, AuthInner,
    AuthState, Credentials, TokenCheck, TokenRecord, TokenResponse, TokenStore, DEFAULT_SCOPE,
};
use crate::errors::{AuthorizationError, TeamSnapError, TeamSnapResult};

/// Supplies bearer tokens to the blocking client.
pub trait BlockingTokenProvider: Send + Sync {
    /// Returns a currently valid access token, refreshing if necessary.
    fn ensure_valid_token(&self) -> TeamSnapResult<String>;

    /// Forces a refresh exchange and returns the new access token.
    fn refresh(&self) -> TeamSnapResult<String>;
}

/// Blocking OOB authorizer. Same state machine as the async
/// [`OobAuthorizer`](crate::auth::OobAuthorizer).
pub struct BlockingOobAuthorizer {
    credentials: Credentials,
    endpoints: AuthEndpoints,
    scope: String,
    store: Arc<dyn TokenStore>,
    http: reqwest::blocking::Client,
    inner: Mutex<AuthInner>,
}

impl BlockingOobAuthorizer {
    /// Creates an authorizer, seeding its state from the store.
    pub fn new(credentials: Credentials, store: Arc<dyn TokenStore>) -> Self {
        let inner = AuthInner::from_store(store.as_ref());
        Self {
            credentials,
            endpoints: AuthEndpoints::default(),
            scope: DEFAULT_SCOPE.to_string(),
            store,
            http: reqwest::blocking::Client::new(),
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

    /// Current authorization state.
    pub fn state(&self) -> AuthState {
        self.inner.lock().unwrap().state
    }

    /// Builds the authorization URL and marks the flow as pending.
    pub fn begin_authorization(&self) -> Url {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != AuthState::Authenticated {
            inner.state = AuthState::AuthorizationPending;
        }
        build_authorization_url(&self.endpoints, &self.credentials, &self.scope)
    }

    /// Exchanges the user-supplied code for a token pair and persists it.
    pub fn complete_authorization(&self, code: &str) -> TeamSnapResult<TokenRecord> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthorizationError::EmptyCode.into());
        }

        let response = self
            .http
            .post(self.endpoints.token_url.clone())
            .form(&code_exchange_form(&self.credentials, code))
            .send()
            .map_err(|e| AuthorizationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AuthorizationError::ExchangeFailed {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthorizationError::InvalidResponse(e.to_string()))?;

        let record = TokenRecord::from_response(&token_response);
        self.store.save(&record)?;

        let mut inner = self.inner.lock().unwrap();
        inner.token = Some(record.clone());
        inner.state = AuthState::Authenticated;
        tracing::info!("authorization complete, token persisted");
        Ok(record)
    }

    fn refresh_exchange(&self) -> TeamSnapResult<TokenRecord> {
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

        let token_response = self
            .http
            .post(self.endpoints.token_url.clone())
            .form(&refresh_form(&self.credentials, &refresh_token))
            .send()
            .ok()
            .filter(|response| response.status().is_success())
            .and_then(|response| response.json::<TokenResponse>().ok());

        let token_response = match token_response {
            Some(response) => response,
            None => {
                let mut inner = self.inner.lock().unwrap();
                inner.state = AuthState::Unauthenticated;
                inner.token = None;
                tracing::warn!("token refresh failed, re-authorization required");
                return Err(TeamSnapError::AuthenticationExpired);
            }
        };

        let mut record = TokenRecord::from_response(&token_response);
        if record.refresh_token.is_none() {
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

impl BlockingTokenProvider for BlockingOobAuthorizer {
    fn ensure_valid_token(&self) -> TeamSnapResult<String> {
        let check = self.inner.lock().unwrap().classify();
        match check {
            TokenCheck::Valid(token) => Ok(token),
            TokenCheck::NeedsRefresh(_) => Ok(self.refresh_exchange()?.access_token),
            TokenCheck::Expired => Err(TeamSnapError::AuthenticationExpired),
            TokenCheck::Missing => Err(TeamSnapError::AuthenticationRequired),
        }
    }

    fn refresh(&self) -> TeamSnapResult<String> {
        Ok(self.refresh_exchange()?.access_token)
    }
}

/// Fixed-token provider, blocking variant.
pub struct StaticBlockingTokenProvider {
    token: SecretString,
}

impl StaticBlockingTokenProvider {
    /// Wraps a fixed access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
        }
    }
}

impl BlockingTokenProvider for StaticBlockingTokenProvider {
    fn ensure_valid_token(&self) -> TeamSnapResult<String> {
        Ok(self.token.expose_secret().to_string())
    }

    fn refresh(&self) -> TeamSnapResult<String> {
        Err(TeamSnapError::AuthenticationExpired)
    }
}
