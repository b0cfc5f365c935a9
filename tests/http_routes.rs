mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use community_events::config::AppConfig;
use community_events::middleware::issue_token;
use community_events::store::EventStore;
use community_events::{app, listen, AppState};

use common::{form, seeded_store, test_config, ORGANISER, OTHER_USER};

async fn router() -> (Router, std::sync::Arc<community_events::store::InMemoryEventStore>) {
    let store = seeded_store().await;
    let state = AppState::with_store(test_config(), store.clone());
    (app(state), store)
}

fn bearer(user_id: &str) -> String {
    let token = issue_token(user_id, &test_config().jwt).unwrap();
    format!("Bearer {token}")
}

fn get(uri: &str, user_id: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, bearer(user_id))
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, user_id: &str, body: String) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, bearer(user_id))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_redirects_to_list(response: &axum::response::Response) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/api/events");
}

#[tokio::test]
async fn health_needs_no_token() {
    let (app, _) = router().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let (app, _) = router().await;
    let response = app
        .oneshot(Request::get("/api/events").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn me_echoes_token_subject() {
    let (app, _) = router().await;
    let response = app.oneshot(get("/api/me", OTHER_USER)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["user_id"], OTHER_USER);
}

#[tokio::test]
async fn list_returns_short_views() {
    let (app, _) = router().await;
    let response = app.oneshot(get("/api/events", OTHER_USER)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["name"], "Event 1");
    assert_eq!(events[0]["type"], "Type 1");
    assert_eq!(events[0]["participant_count"], 0);
}

#[tokio::test]
async fn add_form_returns_types() {
    let (app, _) = router().await;
    let response = app.oneshot(get("/api/events/add", ORGANISER)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["types"][0]["name"], "Type 1");
    assert!(body["form"].is_null());
}

#[tokio::test]
async fn posting_valid_form_redirects_and_persists() {
    let (app, store) = router().await;
    let body = serde_urlencoded::to_string(form("New Event", 1)).unwrap();

    let response = app
        .oneshot(post_form("/api/events/add", ORGANISER, body))
        .await
        .unwrap();

    assert_redirects_to_list(&response);
    assert_eq!(store.count_events().await, 3);
}

#[tokio::test]
async fn posting_invalid_type_returns_form_with_errors() {
    let (app, store) = router().await;
    let body = serde_urlencoded::to_string(form("New Event", 99)).unwrap();

    let response = app
        .oneshot(post_form("/api/events/add", ORGANISER, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["form"]["name"], "New Event");
    assert!(body["errors"]["type_id"].is_array());
    assert_eq!(store.count_events().await, 2);
}

#[tokio::test]
async fn join_then_leave_round_trip() {
    let (app, store) = router().await;

    let joined = app
        .clone()
        .oneshot(post_form("/api/events/1/join", OTHER_USER, String::new()))
        .await
        .unwrap();
    assert_redirects_to_list(&joined);
    assert!(store.find_participant(1, OTHER_USER).await.is_some());

    let left = app
        .oneshot(post_form("/api/events/1/leave", OTHER_USER, String::new()))
        .await
        .unwrap();
    assert_redirects_to_list(&left);
    assert!(store.find_participant(1, OTHER_USER).await.is_none());
}

#[tokio::test]
async fn join_missing_event_is_bad_request() {
    let (app, _) = router().await;
    let response = app
        .oneshot(post_form("/api/events/42/join", OTHER_USER, String::new()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn edit_by_organiser_updates_event() {
    let (app, store) = router().await;
    let body = serde_urlencoded::to_string(form("Renamed", 1)).unwrap();

    let response = app
        .oneshot(post_form("/api/events/2/edit", ORGANISER, body))
        .await
        .unwrap();

    assert_redirects_to_list(&response);
    assert_eq!(store.find_event(2).await.unwrap().unwrap().name, "Renamed");
}

#[tokio::test]
async fn edit_by_someone_else_is_forbidden() {
    let (app, store) = router().await;
    let body = serde_urlencoded::to_string(form("Renamed", 1)).unwrap();

    let response = app
        .oneshot(post_form("/api/events/2/edit", OTHER_USER, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.find_event(2).await.unwrap().unwrap().name, "Event 2");
}

#[tokio::test]
async fn edit_form_of_missing_event_is_not_found() {
    let (app, _) = router().await;
    let response = app.oneshot(get("/api/events/77/edit", ORGANISER)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unparseable_form_gets_json_bad_request() {
    let (app, store) = router().await;
    let body = "name=New+Event&start=2026-11-07T18%3A00%3A00Z&end=2026-11-07T21%3A00%3A00Z&type_id=abc";

    let response = app
        .oneshot(post_form("/api/events/add", ORGANISER, body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(store.count_events().await, 2);
}

#[tokio::test]
async fn unparseable_edit_form_gets_json_bad_request() {
    let (app, store) = router().await;

    let response = app
        .oneshot(post_form("/api/events/1/edit", ORGANISER, "name=Renamed".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "BAD_REQUEST");
    assert_eq!(store.find_event(1).await.unwrap().unwrap().name, "Event 1");
}

#[tokio::test]
async fn non_numeric_event_id_gets_json_bad_request() {
    let (app, _) = router().await;

    let response = app
        .oneshot(post_form("/api/events/abc/join", OTHER_USER, String::new()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn listener_accepts_host_names() {
    let config = AppConfig {
        host: "localhost".to_string(),
        port: 0,
        environment: "test".to_string(),
        rust_log: String::new(),
    };

    let listener = listen(&config).await.unwrap();
    assert!(listener.local_addr().unwrap().ip().is_loopback());
}
