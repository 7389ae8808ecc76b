//! Availability operations.

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::client::executor::RequestExecutor;
use crate::envelope::{encode_template, Record};
use crate::errors::{TeamSnapError, TeamSnapResult};
use crate::pagination::RecordPage;
use crate::resources::EntityKind;
use crate::services::single_record;

/// Service for availability operations.
pub struct AvailabilitiesService {
    executor: Arc<RequestExecutor>,
}

/// Filters for an availability search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AvailabilitySearchParams {
    /// Restrict to one event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<u64>,
    /// Restrict to one member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<u64>,
}

/// A member's availability response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AvailabilityStatus {
    /// Attending.
    Yes,
    /// Not attending.
    No,
    /// Undecided.
    Maybe,
    /// No response yet.
    Unknown,
}

impl AvailabilityStatus {
    /// The wire form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Yes => "yes",
            AvailabilityStatus::No => "no",
            AvailabilityStatus::Maybe => "maybe",
            AvailabilityStatus::Unknown => "unknown",
        }
    }

    /// All accepted wire forms.
    pub const VALID: [&'static str; 4] = ["yes", "no", "maybe", "unknown"];
}

impl FromStr for AvailabilityStatus {
    type Err = TeamSnapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(AvailabilityStatus::Yes),
            "no" => Ok(AvailabilityStatus::No),
            "maybe" => Ok(AvailabilityStatus::Maybe),
            "unknown" => Ok(AvailabilityStatus::Unknown),
            other => Err(TeamSnapError::Request(format!(
                "invalid availability status {other:?}, expected one of: {}",
                AvailabilityStatus::VALID.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AvailabilitiesService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Searches for availability responses.
    pub async fn search(&self, params: AvailabilitySearchParams) -> TeamSnapResult<RecordPage> {
        let envelope = self
            .executor
            .get_envelope(&EntityKind::Availability.search_path(), Some(&params))
            .await?;
        RecordPage::from_envelope(&envelope, self.executor.clone())
    }

    /// Sets a member's availability for an event.
    pub async fn update(
        &self,
        availability_id: u64,
        status: AvailabilityStatus,
    ) -> TeamSnapResult<Record> {
        let body = encode_template(&json!({ "status": status.as_str() }))?;
        let envelope = self
            .executor
            .patch_envelope(&EntityKind::Availability.item_path(availability_id), body)
            .await?;
        single_record(&envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_forms() {
        assert_eq!(
            "yes".parse::<AvailabilityStatus>().unwrap(),
            AvailabilityStatus::Yes
        );
        assert_eq!(
            " Maybe ".parse::<AvailabilityStatus>().unwrap(),
            AvailabilityStatus::Maybe
        );
        assert!("attending".parse::<AvailabilityStatus>().is_err());
    }
}
