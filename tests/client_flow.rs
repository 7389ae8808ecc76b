//! Integration tests for the async client against a mock API.

use std::sync::Arc;

use chrono::{Duration, Utc};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use integrations_teamsnap::{
    AuthEndpoints, Credentials, EventSearchParams, InMemoryTokenStore, MemberSearchParams,
    Mode, OobAuthorizer, TeamSnapClient, TeamSnapError, TokenRecord,
};
use integrations_teamsnap::services::CreateEventRequest;

fn member_item(id: u64, first: &str, last: &str) -> serde_json::Value {
    json!({
        "data": [
            {"name": "id", "value": id},
            {"name": "first_name", "value": first},
            {"name": "last_name", "value": last},
        ]
    })
}

fn client_for(server: &MockServer) -> TeamSnapClient {
    TeamSnapClient::builder()
        .base_url(server.uri())
        .access_token("test-token")
        .mode(Mode::ReadWrite)
        .build()
        .unwrap()
}

#[tokio::test]
async fn member_search_decodes_records_with_expected_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/members/search"))
        .and(query_param("team_id", "456"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": {
                "version": "3.867.0",
                "items": [
                    member_item(1, "Ada", "Lovelace"),
                    member_item(2, "Grace", "Hopper"),
                ],
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = client
        .members()
        .search(MemberSearchParams { team_id: Some(456) })
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    for record in page.records() {
        assert!(record.contains("id"));
        assert!(record.contains("first_name"));
        assert!(record.contains("last_name"));
    }
    assert_eq!(page.records()[0].get_str("first_name"), Some("Ada"));
    assert!(!page.has_next());
}

#[tokio::test]
async fn empty_collection_decodes_to_an_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/members/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": {"items": []}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = client
        .members()
        .search(MemberSearchParams::default())
        .await
        .unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn search_follows_the_next_link_lazily() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events/search"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": {
                "links": [
                    {"rel": "next", "href": format!("{}/events/search?page=2", server.uri())},
                ],
                "items": [
                    {"data": [{"name": "id", "value": 1}]},
                ],
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/events/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": {
                "items": [
                    {"data": [{"name": "id", "value": 2}]},
                ],
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client
        .events()
        .search(EventSearchParams::default())
        .await
        .unwrap();
    assert!(first.has_next());
    assert_eq!(first.records()[0].get_i64("id"), Some(1));

    let second = first.next().await.unwrap().unwrap();
    assert_eq!(second.records()[0].get_i64("id"), Some(2));
    assert!(!second.has_next());

    // No further page: the absent link is the terminal signal.
    assert!(second.next().await.unwrap().is_none());
}

#[tokio::test]
async fn expired_server_side_token_is_absorbed_by_one_refresh_retry() {
    let server = MockServer::start().await;

    // First attempt carries the stale token and gets a 401; the retry with
    // the refreshed token succeeds.
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer stale-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer refreshed-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": {"items": [{"data": [{"name": "id", "value": 99}]}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "refreshed-token",
            "token_type": "Bearer",
            "expires_in": 7200,
            "refresh_token": "refresh-2",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryTokenStore::with_record(TokenRecord {
        access_token: "stale-token".into(),
        refresh_token: Some("refresh-1".into()),
        // Locally the token still looks valid; only the server knows better.
        expires_at: Some(Utc::now() + Duration::hours(1)),
    }));
    let authorizer = OobAuthorizer::new(
        Credentials::new("client-123", SecretString::new("secret-456".to_string())),
        store,
    )
    .with_endpoints(AuthEndpoints {
        authorize_url: format!("{}/oauth/authorize", server.uri()).parse().unwrap(),
        token_url: format!("{}/oauth/token", server.uri()).parse().unwrap(),
    });

    let client = TeamSnapClient::builder()
        .base_url(server.uri())
        .token_provider(Arc::new(authorizer))
        .build()
        .unwrap();

    let me = client.users().me().await.unwrap();
    assert_eq!(me.get_i64("id"), Some(99));
}

#[tokio::test]
async fn persistent_401_surfaces_as_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "still-rejected",
            "token_type": "Bearer",
            "expires_in": 7200,
        })))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryTokenStore::with_record(TokenRecord {
        access_token: "stale-token".into(),
        refresh_token: Some("refresh-1".into()),
        expires_at: Some(Utc::now() + Duration::hours(1)),
    }));
    let authorizer = OobAuthorizer::new(
        Credentials::new("client-123", SecretString::new("secret-456".to_string())),
        store,
    )
    .with_endpoints(AuthEndpoints {
        authorize_url: format!("{}/oauth/authorize", server.uri()).parse().unwrap(),
        token_url: format!("{}/oauth/token", server.uri()).parse().unwrap(),
    });

    let client = TeamSnapClient::builder()
        .base_url(server.uri())
        .token_provider(Arc::new(authorizer))
        .build()
        .unwrap();

    let err = client.users().me().await.unwrap_err();
    assert!(matches!(
        err,
        TeamSnapError::Api {
            status_code: 401,
            ..
        }
    ));
}

#[tokio::test]
async fn malformed_envelope_surfaces_as_contract_drift() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"id": 1}})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.users().me().await.unwrap_err();
    assert!(matches!(err, TeamSnapError::Envelope(_)));
}

#[tokio::test]
async fn create_event_sends_the_template_body_and_decodes_the_echo() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/events"))
        .and(body_partial_json(json!({
            "template": {
                "data": [
                    {"name": "is_game", "value": false},
                    {"name": "name", "value": "Practice"},
                    {"name": "start_date", "value": "2026-04-01T18:00:00Z"},
                    {"name": "team_id", "value": 456},
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "collection": {
                "items": [{
                    "data": [
                        {"name": "id", "value": 321},
                        {"name": "name", "value": "Practice"},
                    ]
                }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let record = client
        .events()
        .create(CreateEventRequest {
            team_id: 456,
            name: "Practice".into(),
            start_date: "2026-04-01T18:00:00Z".into(),
            is_game: false,
            location_id: None,
            opponent_id: None,
            notes: None,
        })
        .await
        .unwrap();

    assert_eq!(record.get_i64("id"), Some(321));
}

#[tokio::test]
async fn deprecation_markers_are_advisory_and_queryable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": {
                "version": "3.867.0",
                "links": [
                    {"rel": "teams", "href": format!("{}/teams", server.uri())},
                    {
                        "rel": "old_rosters",
                        "href": format!("{}/old_rosters", server.uri()),
                        "prompt": "Use members instead",
                        "deprecated": true,
                    },
                ],
                "items": [],
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    // The advisory never blocks the call.
    let version = client.api_version().await.unwrap();
    assert_eq!(version.as_deref(), Some("3.867.0"));

    let deprecated = client.check_for_deprecations("/").await.unwrap();
    assert_eq!(deprecated.len(), 1);
    assert_eq!(deprecated[0].rel, "old_rosters");
    assert_eq!(deprecated[0].prompt.as_deref(), Some("Use members instead"));
}

#[tokio::test]
async fn escape_hatch_decodes_uncovered_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sports"))
        .and(query_param("id", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": {"items": [{"data": [{"name": "name", "value": "Soccer"}]}]}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let records = client
        .request(reqwest::Method::GET, "/sports", Some(json!({"id": 5})), None)
        .await
        .unwrap();
    assert_eq!(records[0].get_str("name"), Some("Soccer"));
}
