//! The read-only mode gate: every mutating call fails fast with zero HTTP
//! requests issued, verified through a call-count spy on the transport.

use std::sync::Arc;

use serde_json::json;

use integrations_teamsnap::services::{
    CreateAssignmentRequest, CreateEventRequest, CreateLocationRequest, CreateMemberRequest,
    UpdateEventRequest, UpdateMemberRequest,
};
use integrations_teamsnap::{
    AvailabilityStatus, MemberSearchParams, MockTransport, Mode, TeamSnapClient, TeamSnapError,
};

fn read_only_client(transport: Arc<MockTransport>) -> TeamSnapClient {
    TeamSnapClient::builder()
        .access_token("test-token")
        .mode(Mode::ReadOnly)
        .transport(transport)
        .build()
        .unwrap()
}

fn sample_event() -> CreateEventRequest {
    CreateEventRequest {
        team_id: 1,
        name: "Practice".into(),
        start_date: "2026-04-01T18:00:00Z".into(),
        is_game: false,
        location_id: None,
        opponent_id: None,
        notes: None,
    }
}

#[tokio::test]
async fn every_mutating_call_is_rejected_without_any_request() {
    let transport = Arc::new(MockTransport::new());
    let client = read_only_client(transport.clone());

    let failures: Vec<TeamSnapError> = vec![
        client.events().create(sample_event()).await.unwrap_err(),
        client
            .events()
            .update(1, UpdateEventRequest::default())
            .await
            .unwrap_err(),
        client.events().delete(1).await.unwrap_err(),
        client
            .members()
            .create(CreateMemberRequest {
                team_id: 1,
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: None,
                phone: None,
            })
            .await
            .unwrap_err(),
        client
            .members()
            .update(1, UpdateMemberRequest::default())
            .await
            .unwrap_err(),
        client.members().delete(1).await.unwrap_err(),
        client
            .availabilities()
            .update(1, AvailabilityStatus::Yes)
            .await
            .unwrap_err(),
        client
            .assignments()
            .create(CreateAssignmentRequest {
                event_id: 1,
                member_id: 1,
                description: "Bring snacks".into(),
            })
            .await
            .unwrap_err(),
        client.assignments().delete(1).await.unwrap_err(),
        client
            .locations()
            .create(CreateLocationRequest {
                team_id: 1,
                name: "Main Field".into(),
                address: None,
            })
            .await
            .unwrap_err(),
        client
            .request(reqwest::Method::POST, "/events", None, Some(json!({})))
            .await
            .unwrap_err(),
    ];

    for err in failures {
        assert!(matches!(err, TeamSnapError::WriteDisabled), "got {err:?}");
    }
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn read_calls_still_pass_in_read_only_mode() {
    let transport = Arc::new(MockTransport::new());
    transport.push_json(
        200,
        json!({
            "collection": {
                "items": [{"data": [{"name": "id", "value": 7}]}]
            }
        }),
    );
    let client = read_only_client(transport.clone());

    let page = client
        .members()
        .search(MemberSearchParams { team_id: Some(7) })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn write_enabled_mode_issues_the_request() {
    let transport = Arc::new(MockTransport::new());
    transport.push_json(
        201,
        json!({
            "collection": {
                "items": [{"data": [{"name": "id", "value": 55}]}]
            }
        }),
    );
    let client = TeamSnapClient::builder()
        .access_token("test-token")
        .mode(Mode::ReadWrite)
        .transport(transport.clone())
        .build()
        .unwrap();

    let record = client.events().create(sample_event()).await.unwrap();
    assert_eq!(record.get_i64("id"), Some(55));
    assert_eq!(transport.request_count(), 1);
    assert_eq!(transport.requests()[0].0, reqwest::Method::POST);
}
