//! Location (venue) operations.

use std::sync::Arc;

use serde::Serialize;

use crate::client::executor::RequestExecutor;
use crate::envelope::{encode_template, Record};
use crate::errors::TeamSnapResult;
use crate::pagination::RecordPage;
use crate::resources::EntityKind;
use crate::services::single_record;

/// Service for location operations.
pub struct LocationsService {
    executor: Arc<RequestExecutor>,
}

/// Filters for a location search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocationSearchParams {
    /// Restrict to one team.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
}

/// Fields for creating a location.
#[derive(Debug, Clone, Serialize)]
pub struct CreateLocationRequest {
    /// Team the venue belongs to.
    pub team_id: u64,
    /// Venue name.
    pub name: String,
    /// Street address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Fields for updating a location. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateLocationRequest {
    /// Venue name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Street address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl LocationsService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Searches for locations.
    pub async fn search(&self, params: LocationSearchParams) -> TeamSnapResult<RecordPage> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::Location.search_path(), Some(&params))
            .await?;
        RecordPage::from_envelope(&envelope, self.executor.clone())
    }

    /// Creates a location.
    pub async fn create(&self, request: CreateLocationRequest) -> TeamSnapResult<Record> {
        let body = encode_template(&request)?;
        let envelope = self
            .executor
            .post_envelope(EntityKind::Location.collection(), body)
            .await?;
        single_record(&envelope)
    }

    /// Updates a location.
    pub async fn update(
        &self,
        location_id: u64,
        request: UpdateLocationRequest,
    ) -> TeamSnapResult<Record> {
        let body = encode_template(&request)?;
        let envelope = self
            .executor
            .patch_envelope(&EntityKind::Location.item_path(location_id), body)
            .await?;
        single_record(&envelope)
    }

    /// Deletes a location.
    pub async fn delete(&self, location_id: u64) -> TeamSnapResult<()> {
        self.executor
            .delete(&EntityKind::Location.item_path(location_id))
            .await
    }
}
