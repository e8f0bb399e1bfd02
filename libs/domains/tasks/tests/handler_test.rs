//! Handler tests for Tasks domain
//!
//! The router is wired to the in-memory store and cache, so these run without
//! Docker. They cover status codes, payload handling and the cache-aside
//! behaviour as seen from HTTP.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use domain_tasks::cache::entry_key;
use domain_tasks::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn setup() -> (Router, InMemoryTaskStore, InMemoryTaskCache) {
    let store = InMemoryTaskStore::new();
    let cache = InMemoryTaskCache::new();
    let repository = CachedTaskRepository::new(store.clone(), cache.clone());
    let app = handlers::router(TaskService::new(repository));
    (app, store, cache)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn report(status: &str) -> Value {
    json!({
        "name": "Write report",
        "description": "Q3 report",
        "status": status
    })
}

#[tokio::test]
async fn test_create_task_returns_201() {
    let (app, _, _) = setup();

    let response = send(&app, json_request("POST", "/", report("not started"))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let task: Task = json_body(response.into_body()).await;
    assert!(!task.id.is_nil());
    assert_eq!(task.name, "Write report");
    assert_eq!(task.status, TaskStatus::NotStarted);
    assert_eq!(task.created_at, task.updated_at);
}

#[tokio::test]
async fn test_response_uses_wire_field_names() {
    let (app, _, _) = setup();

    let response = send(&app, json_request("POST", "/", report("in progress"))).await;
    let body: Value = json_body(response.into_body()).await;

    for field in ["id", "name", "description", "status", "created_at", "updated_at"] {
        assert!(body.get(field).is_some(), "missing {field}");
    }
    assert_eq!(body["status"], "in progress");
}

#[tokio::test]
async fn test_update_task_advances_updated_at() {
    let (app, _, _) = setup();
    let created: Task =
        json_body(send(&app, json_request("POST", "/", report("not started"))).await.into_body())
            .await;

    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let response = send(
        &app,
        json_request("PUT", &format!("/{}", created.id), report("completed")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Task = json_body(response.into_body()).await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_delete_then_get_returns_404() {
    let (app, _, _) = setup();
    let created: Task =
        json_body(send(&app, json_request("POST", "/", report("not started"))).await.into_body())
            .await;
    let uri = format!("/{}", created.id);

    let response = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, json_request("POST", "/", report("not started"))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_concurrent_duplicate_names() {
    let (app, store, _) = setup();
    let body = json!({"name": "Dup", "description": "x", "status": "completed"});

    let (a, b) = tokio::join!(
        send(&app, json_request("POST", "/", body.clone())),
        send(&app, json_request("POST", "/", body.clone())),
    );

    let mut statuses = [a.status(), b.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_rename_frees_old_name() {
    let (app, _, _) = setup();
    let created: Task =
        json_body(send(&app, json_request("POST", "/", report("not started"))).await.into_body())
            .await;

    let renamed = json!({"name": "Final report", "description": "Q3", "status": "in progress"});
    let response = send(&app, json_request("PUT", &format!("/{}", created.id), renamed)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, empty_request("GET", &format!("/{}", created.id))).await;
    let fetched: Task = json_body(response.into_body()).await;
    assert_eq!(fetched.name, "Final report");

    let response = send(&app, json_request("POST", "/", report("not started"))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_update_to_taken_name_conflicts() {
    let (app, _, _) = setup();
    send(&app, json_request("POST", "/", report("not started"))).await;
    let other: Task = json_body(
        send(
            &app,
            json_request(
                "POST",
                "/",
                json!({"name": "Other", "description": "x", "status": "completed"}),
            ),
        )
        .await
        .into_body(),
    )
    .await;

    let response = send(&app, json_request("PUT", &format!("/{}", other.id), report("completed"))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: ErrorBody = json_body(response.into_body()).await;
    assert_eq!(body.message, "task with name Write report already exists");
}

#[tokio::test]
async fn test_update_unknown_id_returns_404() {
    let (app, _, _) = setup();
    let uri = format!("/{}", uuid::Uuid::now_v7());

    let response = send(&app, json_request("PUT", &uri, report("completed"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

#[tokio::test]
async fn test_invalid_id_returns_400() {
    let (app, _, _) = setup();

    for request in [
        empty_request("GET", "/not-a-uuid"),
        empty_request("DELETE", "/not-a-uuid"),
        json_request("PUT", "/not-a-uuid", report("completed")),
    ] {
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = json_body(response.into_body()).await;
        assert_eq!(body.error, "INVALID_UUID");
        assert_eq!(body.message, "Invalid task ID");
    }
}

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let (app, _, _) = setup();
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = json_body(response.into_body()).await;
    assert_eq!(body.message, "Invalid request payload");
}

#[tokio::test]
async fn test_missing_fields_are_listed() {
    let (app, _, _) = setup();

    let response = send(&app, json_request("POST", "/", json!({"description": "x"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = json_body(response.into_body()).await;
    assert_eq!(body.message, "missing required fields: name, status");
}

#[tokio::test]
async fn test_field_validation_messages() {
    let (app, store, _) = setup();

    let cases = [
        (
            json!({"name": "ab", "description": "x", "status": "completed"}),
            "name must be at least 3 characters long",
        ),
        (
            json!({"name": "a".repeat(33), "description": "x", "status": "completed"}),
            "name must have a maximum of 32 characters",
        ),
        (
            json!({"name": "abc", "description": "d".repeat(256), "status": "completed"}),
            "description must have a maximum of 255 characters",
        ),
        (
            json!({"name": "abc", "description": "x", "status": "blocked"}),
            "invalid status value",
        ),
    ];

    for (payload, expected) in cases {
        let response = send(&app, json_request("POST", "/", payload)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = json_body(response.into_body()).await;
        assert_eq!(body.message, expected);
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_legacy_situation_key_is_accepted() {
    let (app, _, _) = setup();
    let payload = json!({"name": "Write report", "description": "Q3", "situation": "completed"});

    let response = send(&app, json_request("POST", "/", payload)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let task: Task = json_body(response.into_body()).await;
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_list_returns_all_in_creation_order() {
    let (app, _, _) = setup();
    for name in ["First", "Second", "Third"] {
        send(
            &app,
            json_request("POST", "/", json!({"name": name, "description": "x", "status": "completed"})),
        )
        .await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let response = send(&app, empty_request("GET", "/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let tasks: Vec<Task> = json_body(response.into_body()).await;
    let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["First", "Second", "Third"]);
}

#[tokio::test]
async fn test_cached_read_matches_store_bytes() {
    let (app, store, cache) = setup();
    let created: Task =
        json_body(send(&app, json_request("POST", "/", report("not started"))).await.into_body())
            .await;

    let cached = cache.peek(&entry_key(created.id)).await.unwrap();
    let from_store = store.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(cached, serde_json::to_string(&from_store).unwrap());

    let response = send(&app, empty_request("GET", &format!("/{}", created.id))).await;
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), cached.as_bytes());
}

#[tokio::test]
async fn test_cache_outage_does_not_fail_requests() {
    let (app, store, cache) = setup();
    cache.fail_reads(true);
    cache.fail_writes(true);
    cache.fail_evictions(true);

    let response = send(&app, json_request("POST", "/", report("not started"))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Task = json_body(response.into_body()).await;
    assert_eq!(store.len().await, 1);

    let uri = format!("/{}", created.id);
    let response = send(&app, json_request("PUT", &uri, report("completed"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.len().await, 1);

    let response = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Task = json_body(response.into_body()).await;
    assert_eq!(fetched.status, TaskStatus::Completed);

    let response = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.is_empty().await);

    let response = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_read_after_failed_cache_refresh_comes_from_store() {
    let (app, _, cache) = setup();
    let created: Task =
        json_body(send(&app, json_request("POST", "/", report("not started"))).await.into_body())
            .await;
    cache.fail_writes(true);

    let uri = format!("/{}", created.id);
    let response = send(&app, json_request("PUT", &uri, report("completed"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, empty_request("GET", &uri)).await;
    let fetched: Task = json_body(response.into_body()).await;
    assert_eq!(fetched.status, TaskStatus::Completed);
}
