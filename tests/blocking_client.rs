//! Tests for the blocking client variant.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::{json, Value};

use integrations_teamsnap::transport::blocking::BlockingHttpTransport;
use integrations_teamsnap::transport::{ApiRequest, ApiResponse};
use integrations_teamsnap::{
    BlockingTeamSnapClient, MemberSearchParams, TeamSnapError, TransportError,
};

/// Queue-backed blocking transport with a request log.
#[derive(Default)]
struct QueueTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<String>>,
}

impl QueueTransport {
    fn push_json(&self, status: u16, body: Value) {
        self.responses.lock().unwrap().push_back(ApiResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        });
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl BlockingHttpTransport for QueueTransport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Http("no response queued".to_string()))
    }
}

fn client_with(transport: Arc<QueueTransport>) -> BlockingTeamSnapClient {
    BlockingTeamSnapClient::builder()
        .access_token("test-token")
        .transport(transport)
        .build()
        .unwrap()
}

#[test]
fn member_search_decodes_records() {
    let transport = Arc::new(QueueTransport::default());
    transport.push_json(
        200,
        json!({
            "collection": {
                "items": [
                    {"data": [
                        {"name": "id", "value": 1},
                        {"name": "first_name", "value": "Ada"},
                        {"name": "last_name", "value": "Lovelace"},
                    ]},
                ]
            }
        }),
    );
    let client = client_with(transport.clone());

    let page = client
        .search_members(MemberSearchParams { team_id: Some(456) })
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page.records()[0].get_str("first_name"), Some("Ada"));
    assert!(!page.has_next());

    let url = &transport.requests.lock().unwrap()[0];
    assert!(url.contains("/members/search"));
    assert!(url.contains("team_id=456"));
}

#[test]
fn next_page_follows_the_link_until_exhausted() {
    let transport = Arc::new(QueueTransport::default());
    transport.push_json(
        200,
        json!({
            "collection": {
                "links": [{"rel": "next", "href": "https://api.teamsnap.com/v3/members/search?page=2"}],
                "items": [{"data": [{"name": "id", "value": 1}]}],
            }
        }),
    );
    transport.push_json(
        200,
        json!({
            "collection": {
                "items": [{"data": [{"name": "id", "value": 2}]}],
            }
        }),
    );
    let client = client_with(transport.clone());

    let first = client.search_members(MemberSearchParams::default()).unwrap();
    assert!(first.has_next());

    let second = client.next_page(&first).unwrap().unwrap();
    assert_eq!(second.records()[0].get_i64("id"), Some(2));
    assert!(client.next_page(&second).unwrap().is_none());
    assert_eq!(transport.request_count(), 2);
}

#[test]
fn non_2xx_surfaces_status_and_body() {
    let transport = Arc::new(QueueTransport::default());
    transport.push_json(404, json!({"message": "no such team"}));
    let client = client_with(transport);

    let err = client.get_team(999).unwrap_err();
    match err {
        TeamSnapError::Api {
            status_code,
            message,
        } => {
            assert_eq!(status_code, 404);
            assert!(message.contains("no such team"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn api_version_comes_from_the_root_envelope() {
    let transport = Arc::new(QueueTransport::default());
    transport.push_json(
        200,
        json!({"collection": {"version": "3.901.2", "items": []}}),
    );
    let client = client_with(transport);

    assert_eq!(client.api_version().unwrap().as_deref(), Some("3.901.2"));
}

#[test]
fn escape_hatch_decodes_arbitrary_collections() {
    let transport = Arc::new(QueueTransport::default());
    transport.push_json(
        200,
        json!({
            "collection": {"items": [{"data": [{"name": "name", "value": "Soccer"}]}]}
        }),
    );
    let client = client_with(transport);

    let records = client
        .request(reqwest::Method::GET, "/sports", None, None)
        .unwrap();
    assert_eq!(records[0].get_str("name"), Some("Soccer"));
}
