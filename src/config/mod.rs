//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::auth::AuthEndpoints;
use crate::errors::{TeamSnapError, TeamSnapResult};

/// TeamSnap API v3 root.
pub const API_BASE_URL: &str = "https://api.teamsnap.com/v3";

/// Environment variable carrying a fixed access token.
pub const ENV_ACCESS_TOKEN: &str = "TEAMSNAP_ACCESS_TOKEN";

/// Environment variable toggling read-only mode.
pub const ENV_READONLY: &str = "TEAMSNAP_READONLY";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn default_user_agent() -> String {
    format!("integrations-teamsnap/{}", env!("CARGO_PKG_VERSION"))
}

/// Read-only/write-enabled switch, fixed at client construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Mutating calls fail fast without issuing any HTTP request.
    ReadOnly,
    /// Mutating calls are allowed.
    ReadWrite,
}

impl Mode {
    /// Returns true in read-only mode.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Mode::ReadOnly)
    }

    /// Parses the truthy forms accepted in the environment flag.
    fn from_flag(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Mode::ReadOnly,
            _ => Mode::ReadWrite,
        }
    }
}

/// Configuration for the TeamSnap clients.
#[derive(Clone, Debug)]
pub struct TeamSnapConfig {
    /// API root URL.
    pub base_url: Url,
    /// OAuth endpoints used by the authorizer.
    pub auth_endpoints: AuthEndpoints,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Read-only/write-enabled mode.
    pub mode: Mode,
    /// Emit version-change and deprecation advisories.
    pub monitor_deprecations: bool,
    /// OAuth scope requested during authorization.
    pub scope: String,
}

impl TeamSnapConfig {
    /// Creates a configuration builder.
    pub fn builder() -> TeamSnapConfigBuilder {
        TeamSnapConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> TeamSnapResult<()> {
        if self.base_url.cannot_be_a_base() {
            return Err(TeamSnapError::Configuration(format!(
                "base URL {} cannot carry paths",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(TeamSnapError::Configuration(
                "timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TeamSnapConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(API_BASE_URL).expect("valid base URL"),
            auth_endpoints: AuthEndpoints::default(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            mode: Mode::ReadWrite,
            monitor_deprecations: true,
            scope: crate::auth::DEFAULT_SCOPE.to_string(),
        }
    }
}

/// Builder for [`TeamSnapConfig`].
#[derive(Default)]
pub struct TeamSnapConfigBuilder {
    base_url: Option<String>,
    auth_endpoints: Option<AuthEndpoints>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    mode: Option<Mode>,
    monitor_deprecations: Option<bool>,
    scope: Option<String>,
}

impl TeamSnapConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API root URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the OAuth endpoints.
    pub fn auth_endpoints(mut self, endpoints: AuthEndpoints) -> Self {
        self.auth_endpoints = Some(endpoints);
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the read-only/write-enabled mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Enables or disables deprecation advisories.
    pub fn monitor_deprecations(mut self, enabled: bool) -> Self {
        self.monitor_deprecations = Some(enabled);
        self
    }

    /// Sets the OAuth scope requested during authorization.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> TeamSnapResult<TeamSnapConfig> {
        let defaults = TeamSnapConfig::default();
        let base_url = match self.base_url {
            Some(raw) => Url::parse(&raw)
                .map_err(|e| TeamSnapError::Configuration(format!("invalid base URL {raw:?}: {e}")))?,
            None => defaults.base_url,
        };
        let config = TeamSnapConfig {
            base_url,
            auth_endpoints: self.auth_endpoints.unwrap_or(defaults.auth_endpoints),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            mode: self.mode.unwrap_or(defaults.mode),
            monitor_deprecations: self
                .monitor_deprecations
                .unwrap_or(defaults.monitor_deprecations),
            scope: self.scope.unwrap_or(defaults.scope),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Assistant-facing environment configuration, consumed once at startup.
///
/// `TEAMSNAP_ACCESS_TOKEN` supplies a fixed token; `TEAMSNAP_READONLY`
/// defaults to read-only, so writes are opt-in.
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// Fixed access token, if supplied.
    pub access_token: Option<String>,
    /// Mode derived from the read-only flag.
    pub mode: Mode,
}

impl EnvConfig {
    /// Reads the environment, loading a `.env` file first if present.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    /// Reads the process environment directly.
    pub fn from_env() -> Self {
        let access_token = std::env::var(ENV_ACCESS_TOKEN)
            .ok()
            .filter(|token| !token.trim().is_empty());
        let mode = match std::env::var(ENV_READONLY) {
            Ok(flag) => Mode::from_flag(&flag),
            // Writes stay disabled unless explicitly enabled.
            Err(_) => Mode::ReadOnly,
        };
        Self { access_token, mode }
    }
}
