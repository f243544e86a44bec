//! REST API tests driven in-process through the router

use std::sync::Arc;

use assignment_core::{CaseAssigner, DatabaseConfig, SqliteCaseStore};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use desk_api::create_router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> (Router, Arc<CaseAssigner>) {
    let store = SqliteCaseStore::new("sqlite::memory:").await.unwrap();
    let assigner = Arc::new(CaseAssigner::new(Arc::new(store), &DatabaseConfig::in_memory()));
    (create_router(assigner.clone()), assigner)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn case_body() -> Value {
    json!({
        "customer_id": 12,
        "title": "Charged twice",
        "category": "billing",
        "content": "Two identical charges on my card",
        "order_id": 4410
    })
}

#[tokio::test]
async fn test_create_case_assigns_least_loaded_agent() {
    let (app, _) = test_app().await;

    let (status, alice) = send(&app, "POST", "/agents", Some(json!({"name": "Alice", "online": true}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, bob) = send(&app, "POST", "/agents", Some(json!({"name": "Bob", "online": true}))).await;

    let (status, first) = send(&app, "POST", "/cases", Some(case_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["agent_id"], alice["agent_id"]);
    assert_eq!(first["status"], "waiting");
    assert_eq!(first["closed_at"], Value::Null);

    let (_, second) = send(&app, "POST", "/cases", Some(case_body())).await;
    assert_eq!(second["agent_id"], bob["agent_id"]);

    let uri = format!("/cases/{}", first["case_id"]);
    let (status, fetched) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, first);
}

#[tokio::test]
async fn test_missing_title_is_bad_request() {
    let (app, assigner) = test_app().await;
    send(&app, "POST", "/agents", Some(json!({"name": "Alice", "online": true}))).await;

    let mut body = case_body();
    body.as_object_mut().unwrap().remove("title");

    let (status, error) = send(&app, "POST", "/cases", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "validation");
    assert!(error["message"].as_str().unwrap().contains("title"));
    assert_eq!(assigner.store().count_cases().await.unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _) = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/cases")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_no_online_agent_is_service_unavailable() {
    let (app, assigner) = test_app().await;
    send(&app, "POST", "/agents", Some(json!({"name": "Away", "online": false}))).await;

    let (status, error) = send(&app, "POST", "/cases", Some(case_body())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error["error"], "no_capacity");
    assert_eq!(assigner.store().count_cases().await.unwrap(), 0);
}

#[tokio::test]
async fn test_agent_availability_and_load_report() {
    let (app, _) = test_app().await;
    let (_, alice) = send(&app, "POST", "/agents", Some(json!({"name": "Alice", "online": false}))).await;
    let alice_id = alice["agent_id"].as_i64().unwrap();

    let uri = format!("/agents/{}/online", alice_id);
    let (status, updated) = send(&app, "PUT", &uri, Some(json!({"online": true}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["online"], true);

    send(&app, "POST", "/cases", Some(case_body())).await;

    let (status, loads) = send(&app, "GET", "/agents/load", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loads, json!([{"agent_id": alice_id, "online": true, "active_cases": 1}]));

    let (status, agents) = send(&app, "GET", "/agents", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(agents.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_agent_toggle_is_not_found() {
    let (app, _) = test_app().await;
    let (status, error) = send(&app, "PUT", "/agents/99/online", Some(json!({"online": true}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn test_close_case_through_status_endpoint() {
    let (app, _) = test_app().await;
    send(&app, "POST", "/agents", Some(json!({"name": "Alice", "online": true}))).await;
    let (_, case) = send(&app, "POST", "/cases", Some(case_body())).await;
    let uri = format!("/cases/{}/status", case["case_id"]);

    let (status, closed) = send(&app, "PUT", &uri, Some(json!({"status": "closed"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "closed");
    assert!(closed["closed_at"].is_string());
    assert_eq!(closed["agent_id"], case["agent_id"]);

    let (status, error) = send(&app, "PUT", &uri, Some(json!({"status": "escalated"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "validation");

    let (status, _) = send(&app, "PUT", "/cases/999/status", Some(json!({"status": "closed"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_case_is_not_found() {
    let (app, _) = test_app().await;
    let (status, _) = send(&app, "GET", "/cases/41", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_json_bad_request() {
    let (app, _) = test_app().await;

    let (status, error) = send(&app, "GET", "/cases/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "validation");
    assert!(error["message"].is_string());

    let (status, error) = send(&app, "PUT", "/agents/seven/online", Some(json!({"online": true}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "validation");
}
