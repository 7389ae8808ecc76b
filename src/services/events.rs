//! Event (game/practice) operations.

use std::sync::Arc;

use serde::Serialize;

use crate::client::executor::RequestExecutor;
use crate::envelope::{encode_template, Record};
use crate::errors::TeamSnapResult;
use crate::pagination::RecordPage;
use crate::resources::EntityKind;
use crate::services::single_record;

/// Service for event operations.
pub struct EventsService {
    executor: Arc<RequestExecutor>,
}

/// Filters for an event search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventSearchParams {
    /// Restrict to one team's schedule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
}

/// Fields for creating an event.
#[derive(Debug, Clone, Serialize)]
pub struct CreateEventRequest {
    /// Team the event belongs to.
    pub team_id: u64,
    /// Event name.
    pub name: String,
    /// ISO-8601 start time (e.g. "2026-01-15T14:00:00Z").
    pub start_date: String,
    /// Whether this is a game (vs practice/other).
    pub is_game: bool,
    /// Venue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<u64>,
    /// Opposing team, for games.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_id: Option<u64>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Fields for updating an event. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateEventRequest {
    /// Event name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// ISO-8601 start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Whether this is a game.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_game: Option<bool>,
    /// Venue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<u64>,
    /// Opposing team.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_id: Option<u64>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl EventsService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Searches for events.
    pub async fn search(&self, params: EventSearchParams) -> TeamSnapResult<RecordPage> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::Event.search_path(), Some(&params))
            .await?;
        RecordPage::from_envelope(&envelope, self.executor.clone())
    }

    /// Fetches one event by id.
    pub async fn get(&self, event_id: u64) -> TeamSnapResult<Record> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::Event.item_path(event_id), None::<&()>)
            .await?;
        single_record(&envelope)
    }

    /// Creates an event.
    pub async fn create(&self, request: CreateEventRequest) -> TeamSnapResult<Record> {
        let body = encode_template(&request)?;
        let envelope = self
            .executor
            .post_envelope(EntityKind::Event.collection(), body)
            .await?;
        single_record(&envelope)
    }

    /// Updates an event.
    pub async fn update(&self, event_id: u64, request: UpdateEventRequest) -> TeamSnapResult<Record> {
        let body = encode_template(&request)?;
        let envelope = self
            .executor
            .patch_envelope(&EntityKind::Event.item_path(event_id), body)
            .await?;
        single_record(&envelope)
    }

    /// Deletes an event.
    pub async fn delete(&self, event_id: u64) -> TeamSnapResult<()> {
        self.executor
            .delete(&EntityKind::Event.item_path(event_id))
            .await
    }
}
