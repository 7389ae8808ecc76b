//! Token persistence.
//!
//! The token file is the unit of truth for the OAuth session across process
//! restarts: a TOML document with a fixed `[teamsnap]` table carrying the
//! client credentials alongside the current token set. It is read at client
//! construction and rewritten after every successful authorization or
//! refresh.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::auth::Credentials;
use crate::errors::PersistenceError;

/// A persisted token set.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// Opaque access token.
    pub access_token: String,
    /// Opaque refresh token, if the server issued one.
    pub refresh_token: Option<String>,
    /// Absolute expiry. Absent means "no expiry information, assume valid".
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    /// Returns true if the record carries an expiry in the past.
    ///
    /// A record without expiry information is treated as still valid, which
    /// is what the server's own 401 check will correct if it is wrong.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| exp <= Utc::now()).unwrap_or(false)
    }

    /// Returns true if a refresh exchange is possible.
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }
}

impl std::fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token storage interface.
///
/// No concurrency control is assumed; a single local process owns the store.
pub trait TokenStore: Send + Sync {
    /// Loads the persisted record. `Ok(None)` means no token has been saved
    /// yet; an unreadable store is an error that callers may choose to treat
    /// as absent.
    fn load(&self) -> Result<Option<TokenRecord>, PersistenceError>;

    /// Persists the record. Failures always surface.
    fn save(&self, record: &TokenRecord) -> Result<(), PersistenceError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenFile {
    teamsnap: TokenFileSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenFileSection {
    client_id: String,
    client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_expires_at: Option<DateTime<Utc>>,
}

/// File-backed token store.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store over an existing token file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the client credentials from the file.
    pub fn credentials(&self) -> Result<Credentials, PersistenceError> {
        let file = self.read_file()?;
        let section = file.teamsnap;
        if section.client_id.is_empty() {
            return Err(PersistenceError::MissingField {
                path: self.path_string(),
                field: "client_id",
            });
        }
        if section.client_secret.is_empty() {
            return Err(PersistenceError::MissingField {
                path: self.path_string(),
                field: "client_secret",
            });
        }
        let mut credentials = Credentials::new(section.client_id, SecretString::new(section.client_secret));
        if let Some(redirect_uri) = section.redirect_uri {
            credentials = credentials.with_redirect_uri(redirect_uri);
        }
        Ok(credentials)
    }

    fn path_string(&self) -> String {
        self.path.display().to_string()
    }

    fn read_file(&self) -> Result<TokenFile, PersistenceError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| PersistenceError::Unreadable {
            path: self.path_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| PersistenceError::Malformed {
            path: self.path_string(),
            reason: e.to_string(),
        })
    }

    fn write_file(&self, file: &TokenFile) -> Result<(), PersistenceError> {
        let rendered = toml::to_string_pretty(file).map_err(|e| PersistenceError::Unwritable {
            path: self.path_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(&self.path, rendered).map_err(|e| PersistenceError::Unwritable {
            path: self.path_string(),
            reason: e.to_string(),
        })
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<TokenRecord>, PersistenceError> {
        let file = self.read_file()?;
        let section = file.teamsnap;
        match section.access_token {
            Some(token) if !token.is_empty() => Ok(Some(TokenRecord {
                access_token: token,
                refresh_token: section.refresh_token.filter(|t| !t.is_empty()),
                expires_at: section.token_expires_at,
            })),
            _ => Ok(None),
        }
    }

    fn save(&self, record: &TokenRecord) -> Result<(), PersistenceError> {
        // Read-modify-write so the credential fields survive every rewrite.
        let mut file = self.read_file()?;
        file.teamsnap.access_token = Some(record.access_token.clone());
        file.teamsnap.refresh_token = record.refresh_token.clone();
        file.teamsnap.token_expires_at = record.expires_at;
        self.write_file(&file)
    }
}

/// In-memory token store for tests and ephemeral sessions.
#[derive(Default)]
pub struct InMemoryTokenStore {
    record: Mutex<Option<TokenRecord>>,
    save_count: Mutex<u32>,
}

impl InMemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a record.
    pub fn with_record(record: TokenRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
            save_count: Mutex::new(0),
        }
    }

    /// Number of times `save` was called.
    pub fn save_count(&self) -> u32 {
        *self.save_count.lock().unwrap()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<TokenRecord>, PersistenceError> {
        Ok(self.record.lock().unwrap().clone())
    }

    fn save(&self, record: &TokenRecord) -> Result<(), PersistenceError> {
        *self.record.lock().unwrap() = Some(record.clone());
        *self.save_count.lock().unwrap() += 1;
        Ok(())
    }
}
