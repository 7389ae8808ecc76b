//! Assignment (event task) operations.

use std::sync::Arc;

use serde::Serialize;

use crate::client::executor::RequestExecutor;
use crate::envelope::{encode_template, Record};
use crate::errors::TeamSnapResult;
use crate::pagination::RecordPage;
use crate::resources::EntityKind;
use crate::services::single_record;

/// Service for assignment operations.
pub struct AssignmentsService {
    executor: Arc<RequestExecutor>,
}

/// Filters for an assignment search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssignmentSearchParams {
    /// Restrict to one team.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
    /// Restrict to one event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<u64>,
}

/// Fields for creating an assignment.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAssignmentRequest {
    /// Event the task belongs to.
    pub event_id: u64,
    /// Member the task is assigned to.
    pub member_id: u64,
    /// Task description.
    pub description: String,
}

/// Fields for updating an assignment. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateAssignmentRequest {
    /// Task description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reassign to another member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<u64>,
}

impl AssignmentsService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Searches for assignments.
    pub async fn search(&self, params: AssignmentSearchParams) -> TeamSnapResult<RecordPage> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::Assignment.search_path(), Some(&params))
            .await?;
        RecordPage::from_envelope(&envelope, self.executor.clone())
    }

    /// Creates an assignment.
    pub async fn create(&self, request: CreateAssignmentRequest) -> TeamSnapResult<Record> {
        let body = encode_template(&request)?;
        let envelope = self
            .executor
            .post_envelope(EntityKind::Assignment.collection(), body)
            .await?;
        single_record(&envelope)
    }

    /// Updates an assignment.
    pub async fn update(
        &self,
        assignment_id: u64,
        request: UpdateAssignmentRequest,
    ) -> TeamSnapResult<Record> {
        let body = encode_template(&request)?;
        let envelope = self
            .executor
            .patch_envelope(&EntityKind::Assignment.item_path(assignment_id), body)
            .await?;
        single_record(&envelope)
    }

    /// Deletes an assignment.
    pub async fn delete(&self, assignment_id: u64) -> TeamSnapResult<()> {
        self.executor
            .delete(&EntityKind::Assignment.item_path(assignment_id))
            .await
    }
}
