//! Member (roster) operations.

use std::sync::Arc;

use serde::Serialize;

use crate::client::executor::RequestExecutor;
use crate::envelope::{encode_template, Record};
use crate::errors::TeamSnapResult;
use crate::pagination::RecordPage;
use crate::resources::EntityKind;
use crate::services::single_record;

/// Service for member operations.
pub struct MembersService {
    executor: Arc<RequestExecutor>,
}

/// Filters for a member search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemberSearchParams {
    /// Restrict to one team's roster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
}

/// Fields for creating a member.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMemberRequest {
    /// Team the member joins.
    pub team_id: u64,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Fields for updating a member. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateMemberRequest {
    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl MembersService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Searches for members.
    pub async fn search(&self, params: MemberSearchParams) -> TeamSnapResult<RecordPage> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::Member.search_path(), Some(&params))
            .await?;
        RecordPage::from_envelope(&envelope, self.executor.clone())
    }

    /// Fetches one member by id.
    pub async fn get(&self, member_id: u64) -> TeamSnapResult<Record> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::Member.item_path(member_id), None::<&()>)
            .await?;
        single_record(&envelope)
    }

    /// Creates a member.
    pub async fn create(&self, request: CreateMemberRequest) -> TeamSnapResult<Record> {
        let body = encode_template(&request)?;
        let envelope = self
            .executor
            .post_envelope(EntityKind::Member.collection(), body)
            .await?;
        single_record(&envelope)
    }

    /// Updates a member.
    pub async fn update(
        &self,
        member_id: u64,
        request: UpdateMemberRequest,
    ) -> TeamSnapResult<Record> {
        let body = encode_template(&request)?;
        let envelope = self
            .executor
            .patch_envelope(&EntityKind::Member.item_path(member_id), body)
            .await?;
        single_record(&envelope)
    }

    /// Removes a member from the roster.
    pub async fn delete(&self, member_id: u64) -> TeamSnapResult<()> {
        self.executor
            .delete(&EntityKind::Member.item_path(member_id))
            .await
    }
}
