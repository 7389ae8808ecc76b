//! Message-board and broadcast operations.

use std::sync::Arc;

use serde::Serialize;

use crate::client::executor::RequestExecutor;
use crate::errors::TeamSnapResult;
use crate::pagination::RecordPage;
use crate::resources::EntityKind;

/// Service for forum topics, forum posts, broadcast emails, and messages.
pub struct MessagingService {
    executor: Arc<RequestExecutor>,
}

/// Filters for a forum-topic search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ForumTopicSearchParams {
    /// Restrict to one team.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
}

/// Filters for a forum-post search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ForumPostSearchParams {
    /// Restrict to one team.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
    /// Restrict to one topic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forum_topic_id: Option<u64>,
}

/// Filters for a broadcast-email search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BroadcastEmailSearchParams {
    /// Restrict to one team.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
}

/// Filters for a message search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageSearchParams {
    /// Restrict to one team.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
}

impl MessagingService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Searches for message-board topics.
    pub async fn search_forum_topics(
        &self,
        params: ForumTopicSearchParams,
    ) -> TeamSnapResult<RecordPage> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::ForumTopic.search_path(), Some(&params))
            .await?;
        RecordPage::from_envelope(&envelope, self.executor.clone())
    }

    /// Searches for message-board posts.
    pub async fn search_forum_posts(
        &self,
        params: ForumPostSearchParams,
    ) -> TeamSnapResult<RecordPage> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::ForumPost.search_path(), Some(&params))
            .await?;
        RecordPage::from_envelope(&envelope, self.executor.clone())
    }

    /// Searches for broadcast emails.
    pub async fn search_broadcast_emails(
        &self,
        params: BroadcastEmailSearchParams,
    ) -> TeamSnapResult<RecordPage> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::BroadcastEmail.search_path(), Some(&params))
            .await?;
        RecordPage::from_envelope(&envelope, self.executor.clone())
    }

    /// Searches for messages.
    pub async fn search_messages(&self, params: MessageSearchParams) -> TeamSnapResult<RecordPage> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::Message.search_path(), Some(&params))
            .await?;
        RecordPage::from_envelope(&envelope, self.executor.clone())
    }
}
