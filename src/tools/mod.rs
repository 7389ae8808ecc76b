//! Assistant-facing tool registry.
//!
//! An explicit registry built once at startup: tool name → input schema +
//! async handler. The host runtime lists [`ToolDef`]s and dispatches calls
//! through [`ToolRegistry::invoke`]; handlers call the async client and
//! render every outcome, including every error, as short human-readable
//! text, never a raw trace. Write tools rely on the client's mode gate, so a
//! read-only client answers them with the remediation message without
//! touching the network.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::TeamSnapClient;
use crate::services::{
    AssignmentSearchParams, AvailabilitySearchParams, AvailabilityStatus, CreateAssignmentRequest,
    CreateEventRequest, CreateLocationRequest, CreateMemberRequest, EventSearchParams,
    LocationSearchParams, MemberSearchParams, TeamSearchParams, UpdateEventRequest,
    UpdateMemberRequest,
};

mod render;

/// A tool made available to the host runtime.
pub struct ToolDef {
    /// Tool name.
    pub name: &'static str,
    /// One-line description shown to the model.
    pub description: &'static str,
    /// JSON Schema for the tool's arguments.
    pub input_schema: Value,
}

type ToolHandler = Box<dyn Fn(Arc<TeamSnapClient>, Value) -> BoxFuture<'static, String> + Send + Sync>;

struct RegisteredTool {
    def: ToolDef,
    handler: ToolHandler,
}

/// Tool name → definition + handler, built once at startup.
pub struct ToolRegistry {
    client: Arc<TeamSnapClient>,
    tools: Vec<RegisteredTool>,
    index: HashMap<&'static str, usize>,
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, String> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args)
        .map_err(|e| format!("Invalid arguments: {e}. Check the tool's input schema."))
}

impl ToolRegistry {
    /// Builds the registry with every built-in tool registered.
    pub fn new(client: Arc<TeamSnapClient>) -> Self {
        let mut registry = Self {
            client,
            tools: Vec::new(),
            index: HashMap::new(),
        };
        registry.register_read_tools();
        registry.register_write_tools();
        registry
    }

    fn register(&mut self, def: ToolDef, handler: ToolHandler) {
        debug_assert!(!self.index.contains_key(def.name), "duplicate tool name");
        self.index.insert(def.name, self.tools.len());
        self.tools.push(RegisteredTool { def, handler });
    }

    /// The registered tool definitions, in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ToolDef> {
        self.tools.iter().map(|tool| &tool.def)
    }

    /// Returns true if a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatches one tool call and returns its rendered text.
    pub async fn invoke(&self, name: &str, args: Value) -> String {
        match self.index.get(name) {
            Some(&i) => (self.tools[i].handler)(self.client.clone(), args).await,
            None => {
                let known: Vec<_> = self.tools.iter().map(|t| t.def.name).collect();
                format!("Unknown tool {name:?}. Available tools: {}", known.join(", "))
            }
        }
    }

    fn register_read_tools(&mut self) {
        self.register(
            ToolDef {
                name: "list_teams",
                description: "List teams accessible to the authenticated user",
                input_schema: object_schema(
                    json!({"user_id": {"type": "integer", "description": "Optional user ID filter"}}),
                    &[],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Default, Deserialize)]
                    struct Args {
                        user_id: Option<u64>,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    match client
                        .teams()
                        .search(TeamSearchParams {
                            user_id: args.user_id,
                        })
                        .await
                    {
                        Ok(page) if page.is_empty() => "No teams found.".to_string(),
                        Ok(page) => render::team_list(page.records()),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "get_team_details",
                description: "Get detailed information about a team",
                input_schema: object_schema(
                    json!({"team_id": {"type": "integer", "description": "The team ID"}}),
                    &["team_id"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        team_id: u64,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    match client.teams().get(args.team_id).await {
                        Ok(record) => render::team_details(&record),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "list_members",
                description: "List the members of a team",
                input_schema: object_schema(
                    json!({"team_id": {"type": "integer", "description": "The team ID"}}),
                    &["team_id"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        team_id: u64,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    match client
                        .members()
                        .search(MemberSearchParams {
                            team_id: Some(args.team_id),
                        })
                        .await
                    {
                        Ok(page) if page.is_empty() => {
                            format!("No members found for team {}.", args.team_id)
                        }
                        Ok(page) => render::member_list(args.team_id, page.records()),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "list_events",
                description: "List the events scheduled for a team",
                input_schema: object_schema(
                    json!({"team_id": {"type": "integer", "description": "The team ID"}}),
                    &["team_id"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        team_id: u64,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    match client
                        .events()
                        .search(EventSearchParams {
                            team_id: Some(args.team_id),
                        })
                        .await
                    {
                        Ok(page) if page.is_empty() => {
                            format!("No events found for team {}.", args.team_id)
                        }
                        Ok(page) => render::event_list(args.team_id, page.records()),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "get_event_details",
                description: "Get detailed information about an event",
                input_schema: object_schema(
                    json!({"event_id": {"type": "integer", "description": "The event ID"}}),
                    &["event_id"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        event_id: u64,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    match client.events().get(args.event_id).await {
                        Ok(record) => render::event_details(&record),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "get_event_availability",
                description: "Get member availability responses for an event",
                input_schema: object_schema(
                    json!({"event_id": {"type": "integer", "description": "The event ID"}}),
                    &["event_id"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        event_id: u64,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    match client
                        .availabilities()
                        .search(AvailabilitySearchParams {
                            event_id: Some(args.event_id),
                            member_id: None,
                        })
                        .await
                    {
                        Ok(page) if page.is_empty() => {
                            format!("No availability responses for event {}.", args.event_id)
                        }
                        Ok(page) => render::availability_summary(args.event_id, page.records()),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "list_assignments",
                description: "List assignments (tasks) for an event",
                input_schema: object_schema(
                    json!({"event_id": {"type": "integer", "description": "The event ID"}}),
                    &["event_id"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        event_id: u64,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    match client
                        .assignments()
                        .search(AssignmentSearchParams {
                            team_id: None,
                            event_id: Some(args.event_id),
                        })
                        .await
                    {
                        Ok(page) if page.is_empty() => {
                            format!("No assignments found for event {}.", args.event_id)
                        }
                        Ok(page) => render::assignment_list(args.event_id, page.records()),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "list_locations",
                description: "List the locations (venues) saved for a team",
                input_schema: object_schema(
                    json!({"team_id": {"type": "integer", "description": "The team ID"}}),
                    &["team_id"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        team_id: u64,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    match client
                        .locations()
                        .search(LocationSearchParams {
                            team_id: Some(args.team_id),
                        })
                        .await
                    {
                        Ok(page) if page.is_empty() => {
                            format!("No locations found for team {}.", args.team_id)
                        }
                        Ok(page) => render::location_list(args.team_id, page.records()),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );
    }

    fn register_write_tools(&mut self) {
        self.register(
            ToolDef {
                name: "create_event",
                description: "Create a new event (game or practice) for a team",
                input_schema: object_schema(
                    json!({
                        "team_id": {"type": "integer", "description": "The team ID"},
                        "name": {"type": "string", "description": "Event name"},
                        "start_date": {"type": "string", "description": "ISO-8601 start time, e.g. 2026-01-15T14:00:00Z"},
                        "is_game": {"type": "boolean", "description": "True for games, false for practices"},
                        "location_id": {"type": "integer", "description": "Optional location ID"},
                        "opponent_id": {"type": "integer", "description": "Optional opponent ID (games)"},
                        "notes": {"type": "string", "description": "Optional notes"},
                    }),
                    &["team_id", "name", "start_date"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        team_id: u64,
                        name: String,
                        start_date: String,
                        #[serde(default)]
                        is_game: bool,
                        location_id: Option<u64>,
                        opponent_id: Option<u64>,
                        notes: Option<String>,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    let request = CreateEventRequest {
                        team_id: args.team_id,
                        name: args.name,
                        start_date: args.start_date,
                        is_game: args.is_game,
                        location_id: args.location_id,
                        opponent_id: args.opponent_id,
                        notes: args.notes,
                    };
                    match client.events().create(request).await {
                        Ok(record) => render::created("event", &record),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "update_event",
                description: "Update fields of an existing event",
                input_schema: object_schema(
                    json!({
                        "event_id": {"type": "integer", "description": "The event ID"},
                        "name": {"type": "string"},
                        "start_date": {"type": "string"},
                        "is_game": {"type": "boolean"},
                        "location_id": {"type": "integer"},
                        "opponent_id": {"type": "integer"},
                        "notes": {"type": "string"},
                    }),
                    &["event_id"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        event_id: u64,
                        name: Option<String>,
                        start_date: Option<String>,
                        is_game: Option<bool>,
                        location_id: Option<u64>,
                        opponent_id: Option<u64>,
                        notes: Option<String>,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    let request = UpdateEventRequest {
                        name: args.name,
                        start_date: args.start_date,
                        is_game: args.is_game,
                        location_id: args.location_id,
                        opponent_id: args.opponent_id,
                        notes: args.notes,
                    };
                    if serde_json::to_value(&request)
                        .map(|v| v.as_object().map(|o| o.is_empty()).unwrap_or(true))
                        .unwrap_or(true)
                    {
                        return "No fields provided to update.".to_string();
                    }
                    match client.events().update(args.event_id, request).await {
                        Ok(record) => render::updated("event", &record),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "delete_event",
                description: "Delete an event",
                input_schema: object_schema(
                    json!({"event_id": {"type": "integer", "description": "The event ID"}}),
                    &["event_id"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        event_id: u64,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    match client.events().delete(args.event_id).await {
                        Ok(()) => format!("Deleted event {}.", args.event_id),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "create_member",
                description: "Add a member to a team's roster",
                input_schema: object_schema(
                    json!({
                        "team_id": {"type": "integer", "description": "The team ID"},
                        "first_name": {"type": "string"},
                        "last_name": {"type": "string"},
                        "email": {"type": "string"},
                        "phone": {"type": "string"},
                    }),
                    &["team_id", "first_name", "last_name"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        team_id: u64,
                        first_name: String,
                        last_name: String,
                        email: Option<String>,
                        phone: Option<String>,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    let request = CreateMemberRequest {
                        team_id: args.team_id,
                        first_name: args.first_name,
                        last_name: args.last_name,
                        email: args.email,
                        phone: args.phone,
                    };
                    match client.members().create(request).await {
                        Ok(record) => render::created("member", &record),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "update_member",
                description: "Update fields of a team member",
                input_schema: object_schema(
                    json!({
                        "member_id": {"type": "integer", "description": "The member ID"},
                        "first_name": {"type": "string"},
                        "last_name": {"type": "string"},
                        "email": {"type": "string"},
                        "phone": {"type": "string"},
                    }),
                    &["member_id"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        member_id: u64,
                        first_name: Option<String>,
                        last_name: Option<String>,
                        email: Option<String>,
                        phone: Option<String>,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    let request = UpdateMemberRequest {
                        first_name: args.first_name,
                        last_name: args.last_name,
                        email: args.email,
                        phone: args.phone,
                    };
                    if serde_json::to_value(&request)
                        .map(|v| v.as_object().map(|o| o.is_empty()).unwrap_or(true))
                        .unwrap_or(true)
                    {
                        return "No fields provided to update.".to_string();
                    }
                    match client.members().update(args.member_id, request).await {
                        Ok(record) => render::updated("member", &record),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "delete_member",
                description: "Remove a member from a team's roster",
                input_schema: object_schema(
                    json!({"member_id": {"type": "integer", "description": "The member ID"}}),
                    &["member_id"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        member_id: u64,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    match client.members().delete(args.member_id).await {
                        Ok(()) => format!("Removed member {}.", args.member_id),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "update_availability",
                description: "Set a member's availability for an event",
                input_schema: object_schema(
                    json!({
                        "availability_id": {"type": "integer", "description": "The availability ID"},
                        "status": {"type": "string", "enum": ["yes", "no", "maybe", "unknown"]},
                    }),
                    &["availability_id", "status"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        availability_id: u64,
                        status: String,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    let status: AvailabilityStatus = match args.status.parse() {
                        Ok(status) => status,
                        Err(_) => {
                            return format!(
                                "Invalid status {:?}. Must be one of: {}.",
                                args.status,
                                AvailabilityStatus::VALID.join(", ")
                            )
                        }
                    };
                    match client
                        .availabilities()
                        .update(args.availability_id, status)
                        .await
                    {
                        Ok(_) => format!(
                            "Set availability {} to {}.",
                            args.availability_id, status
                        ),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "create_assignment",
                description: "Create an assignment (task) for an event",
                input_schema: object_schema(
                    json!({
                        "event_id": {"type": "integer", "description": "The event ID"},
                        "member_id": {"type": "integer", "description": "The member to assign"},
                        "description": {"type": "string", "description": "Task description"},
                    }),
                    &["event_id", "member_id", "description"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        event_id: u64,
                        member_id: u64,
                        description: String,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    let request = CreateAssignmentRequest {
                        event_id: args.event_id,
                        member_id: args.member_id,
                        description: args.description,
                    };
                    match client.assignments().create(request).await {
                        Ok(record) => render::created("assignment", &record),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "delete_assignment",
                description: "Delete an assignment",
                input_schema: object_schema(
                    json!({"assignment_id": {"type": "integer", "description": "The assignment ID"}}),
                    &["assignment_id"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        assignment_id: u64,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    match client.assignments().delete(args.assignment_id).await {
                        Ok(()) => format!("Deleted assignment {}.", args.assignment_id),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );

        self.register(
            ToolDef {
                name: "create_location",
                description: "Save a new location (venue) for a team",
                input_schema: object_schema(
                    json!({
                        "team_id": {"type": "integer", "description": "The team ID"},
                        "name": {"type": "string", "description": "Venue name"},
                        "address": {"type": "string", "description": "Optional street address"},
                    }),
                    &["team_id", "name"],
                ),
            },
            Box::new(|client, args| {
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct Args {
                        team_id: u64,
                        name: String,
                        address: Option<String>,
                    }
                    let args: Args = match parse_args(args) {
                        Ok(args) => args,
                        Err(msg) => return msg,
                    };
                    let request = CreateLocationRequest {
                        team_id: args.team_id,
                        name: args.name,
                        address: args.address,
                    };
                    match client.locations().create(request).await {
                        Ok(record) => render::created("location", &record),
                        Err(err) => err.user_message(),
                    }
                })
            }),
        );
    }
}
