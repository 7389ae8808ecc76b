//! User operations.

use std::sync::Arc;

use crate::client::executor::RequestExecutor;
use crate::envelope::Record;
use crate::errors::TeamSnapResult;
use crate::resources::EntityKind;
use crate::services::single_record;

/// Service for user operations.
pub struct UsersService {
    executor: Arc<RequestExecutor>,
}

impl UsersService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Fetches the authenticated user.
    pub async fn me(&self) -> TeamSnapResult<Record> {
        let envelope = self.executor.get_envelope("me", None::<&()>).await?;
        single_record(&envelope)
    }

    /// Fetches one user by id.
    pub async fn get(&self, user_id: u64) -> TeamSnapResult<Record> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::User.item_path(user_id), None::<&()>)
            .await?;
        single_record(&envelope)
    }
}
