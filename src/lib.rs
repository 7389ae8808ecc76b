//! TeamSnap Integration Module
//!
//! Client library for the TeamSnap sports-team-management API (v3), covering
//! the OAuth2 out-of-band authorization flow with a persisted token
//! lifecycle, the Collection+JSON envelope codec, and dual sync/async API
//! clients with typed per-entity operations, link-driven pagination, and a
//! read-only mode gate for the assistant-facing tool layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use integrations_teamsnap::{Mode, TeamSnapClient, TeamSearchParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Interactive OOB authorization backed by a token file:
//!     let client = TeamSnapClient::builder()
//!         .token_file("teamsnap.toml")
//!         .mode(Mode::ReadWrite)
//!         .build()?;
//!
//!     let teams = client.teams().search(TeamSearchParams::default()).await?;
//!     for team in teams.records() {
//!         println!("{} (ID: {})",
//!             team.get_str("name").unwrap_or("?"),
//!             team.get_i64("id").unwrap_or(0));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `auth`: OOB authorizer state machine, token providers, token store
//! - `envelope`: Collection+JSON codec (items ↔ flat records, links)
//! - `errors`: typed error taxonomy with user-facing rendering
//! - `config`: builder configuration and environment-driven startup config
//! - `transport`: HTTP seam with reqwest and mock implementations
//! - `client`: async client (services, executor) and blocking client
//! - `pagination`: lazy `next`-link traversal
//! - `resources`: the closed set of entity kinds and their paths
//! - `services`: typed per-entity operations
//! - `observability`: API version and deprecation advisories
//! - `tools`: assistant-facing tool registry

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod observability;
pub mod pagination;
pub mod resources;
pub mod services;
pub mod tools;
pub mod transport;

// Re-export the clients
pub use client::{BlockingRecordPage, BlockingTeamSnapClient, TeamSnapClient, TeamSnapClientBuilder};

// Re-export auth
pub use auth::{
    AuthEndpoints, AuthState, Credentials, FileTokenStore, InMemoryTokenStore, OobAuthorizer,
    StaticTokenProvider, TokenProvider, TokenRecord, TokenResponse, TokenStore,
    DEFAULT_SCOPE, OOB_REDIRECT_URI,
};
pub use auth::blocking::{BlockingOobAuthorizer, BlockingTokenProvider, StaticBlockingTokenProvider};

// Re-export configuration
pub use config::{EnvConfig, Mode, TeamSnapConfig, TeamSnapConfigBuilder, API_BASE_URL};

// Re-export envelope types
pub use envelope::{
    decode_collection, decode_item, encode_template, extract_link, Collection, Envelope,
    FieldPair, Item, Link, Record,
};

// Re-export errors
pub use errors::{
    AuthorizationError, EnvelopeError, PersistenceError, TeamSnapError, TeamSnapResult,
    TransportError,
};

// Re-export pagination
pub use pagination::RecordPage;

// Re-export resources
pub use resources::EntityKind;

// Re-export services
pub use services::{
    AssignmentSearchParams, AssignmentsService, AvailabilitiesService, AvailabilitySearchParams,
    AvailabilityStatus, BroadcastEmailSearchParams, CreateAssignmentRequest, CreateEventRequest,
    CreateLocationRequest, CreateMemberRequest, EventSearchParams, EventsService,
    ForumPostSearchParams, ForumTopicSearchParams, LocationSearchParams, LocationsService,
    MemberSearchParams, MembersService, MessageSearchParams, MessagingService,
    OpponentSearchParams, OpponentsService, TeamSearchParams, TeamsService, UpdateAssignmentRequest,
    UpdateEventRequest, UpdateLocationRequest, UpdateMemberRequest, UsersService,
};

// Re-export observability
pub use observability::{deprecated_links, ApiVersionMonitor, DeprecatedLink};

// Re-export the tool registry
pub use tools::{ToolDef, ToolRegistry};

// Re-export transport
pub use transport::blocking::{BlockingHttpTransport, ReqwestBlockingTransport};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, MockTransport, ReqwestTransport};
