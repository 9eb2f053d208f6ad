//! API integration tests against the in-memory store

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use circulation_server::{
    api,
    config::AppConfig,
    models::{Holder, Item},
    repository::{
        memory::{MemoryStore, Seed},
        HolderAccessor, InventoryAccessor, Repository,
    },
    services::Services,
    AppState,
};

/// Router over a store holding items B1 (2 copies) and B2 (1 copy) and holders H1, H2
async fn app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.save_item(&Item::new(1, "B1", 2)).await.unwrap();
    store.save_item(&Item::new(2, "B2", 1)).await.unwrap();
    store
        .save_holder(&Holder::new(1, "H1", "h1@example.org"))
        .await
        .unwrap();
    store
        .save_holder(&Holder::new(2, "H2", "h2@example.org"))
        .await
        .unwrap();

    (router(store.clone()), store)
}

fn router(store: Arc<MemoryStore>) -> Router {
    let config = AppConfig::default();
    let services = Services::new(Repository::in_memory(store), &config.loans);
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };
    api::create_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(format!("/api/v1{}", uri))
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    let (app, _store) = app().await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_borrow_and_return_flow() {
    let (app, store) = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/holders/1/borrow",
        Some(json!({ "items": [{ "id": 1, "copies": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["holder"]["loans"], json!([1]));

    let (status, body) = send(&app, Method::GET, "/items/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["on_loan_count"], 1);
    assert_eq!(body["available_copies"], 1);

    let (status, body) = send(
        &app,
        Method::POST,
        "/holders/1/borrow",
        Some(json!({ "items": [{ "id": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyBorrowed");

    let (status, body) = send(
        &app,
        Method::POST,
        "/holders/1/return",
        Some(json!({ "items": [{ "id": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["holder"]["loans"], json!([]));

    let item = store.get_item(1).await.unwrap().unwrap();
    assert_eq!(item.on_loan_count, 0);
}

#[tokio::test]
async fn test_more_than_one_copy_is_rejected() {
    let (app, store) = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/holders/1/borrow",
        Some(json!({ "items": [{ "id": 1, "copies": 2 }] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert_eq!(store.get_item(1).await.unwrap().unwrap().on_loan_count, 0);
}

#[tokio::test]
async fn test_empty_borrow_is_rejected() {
    let (app, _store) = app().await;

    let (status, _body) = send(
        &app,
        Method::POST,
        "/holders/1/borrow",
        Some(json!({ "items": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unavailable_item_leaves_batch_unapplied() {
    let (app, store) = app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/holders/2/borrow",
        Some(json!({ "items": [{ "id": 2 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/holders/1/borrow",
        Some(json!({ "items": [{ "id": 1 }, { "id": 2 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ItemNotAvailable");

    assert_eq!(store.get_item(1).await.unwrap().unwrap().on_loan_count, 0);
    assert!(store.get_holder(1).await.unwrap().unwrap().loans.is_empty());
}

#[tokio::test]
async fn test_not_found_errors() {
    let (app, _store) = app().await;

    let (status, body) = send(&app, Method::GET, "/holders/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchHolder");

    let (status, body) = send(&app, Method::GET, "/items/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchItem");

    let (status, body) = send(
        &app,
        Method::POST,
        "/holders/1/borrow",
        Some(json!({ "items": [{ "id": 99 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchItem");
}

#[tokio::test]
async fn test_return_of_item_not_held() {
    let (app, _store) = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/holders/1/return",
        Some(json!({ "items": [{ "id": 2 }] })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "NotBorrowed");
}

#[tokio::test]
async fn test_delete_holder_with_pending_loans() {
    let (app, _store) = app().await;

    send(
        &app,
        Method::POST,
        "/holders/2/borrow",
        Some(json!({ "items": [{ "id": 1 }] })),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, "/holders/2", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "HolderHasLoans");

    let (status, body) = send(&app, Method::DELETE, "/holders/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);

    let (status, _) = send(&app, Method::GET, "/holders/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_seeded_store_serves_borrows() {
    let raw = std::fs::read_to_string("config/seed.json").expect("Failed to read seed file");
    let seed: Seed = serde_json::from_str(&raw).expect("Invalid seed file");
    let store = Arc::new(MemoryStore::new());
    store.load_seed(seed).await.unwrap();
    let app = router(store);

    let (status, body) = send(&app, Method::GET, "/holders/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loans"], json!([]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/holders/1/borrow",
        Some(json!({ "items": [{ "id": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["holder"]["loans"], json!([1]));
}
