//! Opponent operations.

use std::sync::Arc;

use serde::Serialize;

use crate::client::executor::RequestExecutor;
use crate::errors::TeamSnapResult;
use crate::pagination::RecordPage;
use crate::resources::EntityKind;

/// Service for opponent operations.
pub struct OpponentsService {
    executor: Arc<RequestExecutor>,
}

/// Filters for an opponent search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OpponentSearchParams {
    /// Restrict to one team.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
}

impl OpponentsService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Searches for opponents.
    pub async fn search(&self, params: OpponentSearchParams) -> TeamSnapResult<RecordPage> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::Opponent.search_path(), Some(&params))
            .await?;
        RecordPage::from_envelope(&envelope, self.executor.clone())
    }
}
