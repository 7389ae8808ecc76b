//! Error types for the TeamSnap integration.

use thiserror::Error;

/// Result type for TeamSnap operations.
pub type TeamSnapResult<T> = Result<T, TeamSnapError>;

/// Top-level error type for the TeamSnap integration.
#[derive(Debug, Error)]
pub enum TeamSnapError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid request construction (bad URL, unserializable parameters).
    #[error("invalid request: {0}")]
    Request(String),

    /// Token file could not be read or written.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The authorization-code exchange failed; the interactive flow must be
    /// restarted with a fresh code.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// No usable access token exists.
    #[error("authentication required: no usable access token")]
    AuthenticationRequired,

    /// The access token expired and could not be refreshed.
    #[error("authentication expired: token refresh failed")]
    AuthenticationExpired,

    /// The response envelope did not match the Collection+JSON contract.
    #[error("malformed envelope: {0}")]
    Envelope(#[from] EnvelopeError),

    /// Non-2xx API response.
    #[error("API error ({status_code}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status_code: u16,
        /// Response body or status text.
        message: String,
    },

    /// A mutating call was attempted while the client is in read-only mode.
    #[error("write operation blocked: client is in read-only mode")]
    WriteDisabled,

    /// The transport-level request timed out. Caller-retryable.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),
}

impl TeamSnapError {
    /// Creates an API error from a status code and response body.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        TeamSnapError::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for API errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TeamSnapError::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns true if retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TeamSnapError::Timeout(_)
                | TeamSnapError::Network(_)
                | TeamSnapError::Api {
                    status_code: 500..=599,
                    ..
                }
        )
    }

    /// Renders the error as a short human-readable message with a remediation
    /// hint, for the assistant-facing layer. Never a raw trace.
    pub fn user_message(&self) -> String {
        match self {
            TeamSnapError::Configuration(msg) => {
                format!("The TeamSnap client is misconfigured: {msg}.")
            }
            TeamSnapError::Request(msg) => {
                format!("The request could not be built: {msg}.")
            }
            TeamSnapError::Persistence(_) => {
                "The token file could not be read or written. Check the file path and its \
                 permissions, then try again."
                    .to_string()
            }
            TeamSnapError::Authorization(_) => {
                "TeamSnap rejected the authorization code. Restart the authorization flow and \
                 paste a fresh code."
                    .to_string()
            }
            TeamSnapError::AuthenticationRequired => {
                "Not authenticated with TeamSnap. Run the interactive authorization flow to \
                 obtain an access token."
                    .to_string()
            }
            TeamSnapError::AuthenticationExpired => {
                "Your TeamSnap session has expired and could not be refreshed. Re-run the \
                 interactive authorization flow."
                    .to_string()
            }
            TeamSnapError::Envelope(_) => {
                "TeamSnap returned a response in an unexpected format. The API contract may \
                 have changed; try again or update the integration."
                    .to_string()
            }
            TeamSnapError::Api {
                status_code: 404, ..
            } => "The requested TeamSnap resource was not found. Check the ID and try again."
                .to_string(),
            TeamSnapError::Api {
                status_code,
                message,
            } => {
                format!("TeamSnap returned HTTP {status_code}: {message}")
            }
            TeamSnapError::WriteDisabled => {
                "Write operation blocked: the client is running in read-only mode. Set \
                 TEAMSNAP_READONLY=false and restart to enable writes."
                    .to_string()
            }
            TeamSnapError::Timeout(_) => {
                "The request to TeamSnap timed out. Check your connection and try again."
                    .to_string()
            }
            TeamSnapError::Network(_) => {
                "Could not reach TeamSnap. Check your network connection and try again."
                    .to_string()
            }
        }
    }
}

/// Token persistence errors. Fatal to the calling operation, not retried.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Token file could not be read.
    #[error("token file unreadable at {path}: {reason}")]
    Unreadable {
        /// Path to the token file.
        path: String,
        /// Underlying reason.
        reason: String,
    },

    /// Token file could not be written.
    #[error("token file unwritable at {path}: {reason}")]
    Unwritable {
        /// Path to the token file.
        path: String,
        /// Underlying reason.
        reason: String,
    },

    /// Token file exists but does not parse.
    #[error("token file malformed at {path}: {reason}")]
    Malformed {
        /// Path to the token file.
        path: String,
        /// Underlying reason.
        reason: String,
    },

    /// Required credential fields are missing from the token file.
    #[error("token file at {path} is missing {field}")]
    MissingField {
        /// Path to the token file.
        path: String,
        /// The missing field name.
        field: &'static str,
    },
}

/// Authorization-code exchange errors. The user must restart the interactive
/// flow; the authorizer stays in the pending state.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// No authorization code was supplied.
    #[error("no authorization code provided")]
    EmptyCode,

    /// The token endpoint rejected the exchange.
    #[error("token exchange failed with status {status}: {body}")]
    ExchangeFailed {
        /// HTTP status returned by the token endpoint.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The token endpoint response did not parse.
    #[error("token endpoint returned an invalid response: {0}")]
    InvalidResponse(String),

    /// The token endpoint could not be reached.
    #[error("token endpoint unreachable: {0}")]
    Network(String),
}

/// Envelope decoding errors. Indicate upstream contract drift; not retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Response body was not valid JSON in the expected envelope shape.
    #[error("response is not a Collection+JSON envelope: {0}")]
    Json(String),

    /// An item carried the same field name more than once.
    #[error("duplicate field name {0:?} in item")]
    DuplicateField(String),

    /// A single-record endpoint returned an empty item list.
    #[error("expected one item in collection, found none")]
    MissingItem,

    /// A write body was built from a non-object value.
    #[error("template fields must serialize to a JSON object")]
    TemplateNotAnObject,

    /// A pagination link was present but not a valid URL.
    #[error("invalid link href for rel {rel:?}: {href}")]
    InvalidLink {
        /// Link relation name.
        rel: String,
        /// The offending href value.
        href: String,
    },
}

/// Transport-level errors, mapped onto the top-level taxonomy at the client
/// boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request exceeded its timeout.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Network(String),

    /// Any other HTTP-level failure.
    #[error("http error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Network(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl From<TransportError> for TeamSnapError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(msg) => TeamSnapError::Timeout(msg),
            TransportError::Network(msg) => TeamSnapError::Network(msg),
            TransportError::Http(msg) => TeamSnapError::Network(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_carries_status() {
        let err = TeamSnapError::api(404, "not found");
        assert_eq!(err.status_code(), Some(404));
        assert!(!err.is_retryable());

        let err = TeamSnapError::api(503, "unavailable");
        assert!(err.is_retryable());
    }

    #[test]
    fn user_message_names_remediation() {
        let msg = TeamSnapError::WriteDisabled.user_message();
        assert!(msg.contains("TEAMSNAP_READONLY=false"));

        let msg = TeamSnapError::AuthenticationExpired.user_message();
        assert!(msg.contains("authorization flow"));
    }

    #[test]
    fn transport_errors_map_to_taxonomy() {
        let err: TeamSnapError = TransportError::Timeout("30s elapsed".into()).into();
        assert!(matches!(err, TeamSnapError::Timeout(_)));

        let err: TeamSnapError = TransportError::Network("refused".into()).into();
        assert!(matches!(err, TeamSnapError::Network(_)));
    }
}
