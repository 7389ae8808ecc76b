//! Team operations.

use std::sync::Arc;

use serde::Serialize;

use crate::client::executor::RequestExecutor;
use crate::envelope::Record;
use crate::errors::TeamSnapResult;
use crate::pagination::RecordPage;
use crate::resources::EntityKind;
use crate::services::single_record;

/// Service for team operations.
pub struct TeamsService {
    executor: Arc<RequestExecutor>,
}

/// Filters for a team search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeamSearchParams {
    /// Restrict to teams the given user belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

impl TeamsService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Searches for teams.
    pub async fn search(&self, params: TeamSearchParams) -> TeamSnapResult<RecordPage> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::Team.search_path(), Some(&params))
            .await?;
        RecordPage::from_envelope(&envelope, self.executor.clone())
    }

    /// Fetches one team by id.
    pub async fn get(&self, team_id: u64) -> TeamSnapResult<Record> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::Team.item_path(team_id), None::<&()>)
            .await?;
        single_record(&envelope)
    }
}
