//! JSON-RPC endpoint behavior through the router.

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chat_sync_server::{AppState, create_router};
use chat_sync_store::{ChatStorage, NameGenerator};
use serde_json::{Value, json};
use tokio_test::assert_ok;
use tower::ServiceExt;

fn state() -> AppState {
    AppState::new(Arc::new(ChatStorage::new()), NameGenerator::default())
}

async fn post_rpc(state: &AppState, body: impl Into<Body>) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri("/rpc")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = assert_ok!(create_router(state.clone()).oneshot(request).await);
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn call(state: &AppState, id: u64, method: &str, params: Value) -> Value {
    let body = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
    post_rpc(state, body.to_string()).await
}

#[tokio::test]
async fn test_submit_then_list() {
    let state = state();

    let submitted = call(
        &state,
        1,
        "submit_message",
        json!({"message": {"author": "owen", "text": "hello"}}),
    )
    .await;
    assert_eq!(submitted["result"], true);
    assert_eq!(submitted["id"], 1);

    let listed = call(&state, 2, "list_messages", Value::Null).await;
    let log = listed["result"].as_array().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["msg"]["author"], "owen");
    assert_eq!(log[0]["msg"]["text"], "hello");
    assert!(log[0]["timestamp"].is_string());
}

#[tokio::test]
async fn test_empty_text_accepted() {
    let state = state();
    let response = call(
        &state,
        1,
        "submit_message",
        json!({"message": {"author": "owen", "text": ""}}),
    )
    .await;
    assert_eq!(response["result"], true);
    assert_eq!(state.storage.len(), 1);
}

#[tokio::test]
async fn test_empty_author_rejected() {
    let state = state();
    let response = call(
        &state,
        1,
        "submit_message",
        json!({"message": {"author": " ", "text": "hi"}}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32602);
    assert!(state.storage.is_empty());
}

#[tokio::test]
async fn test_bad_params() {
    let state = state();
    let response = call(&state, 4, "submit_message", json!({"text": "no message"})).await;

    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(response["id"], 4);
    assert!(response.get("result").is_none());
}

#[tokio::test]
async fn test_unknown_method() {
    let state = state();
    let response = call(&state, 5, "delete_everything", Value::Null).await;
    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn test_parse_error() {
    let state = state();
    let response = post_rpc(&state, "{not json").await;
    assert_eq!(response["error"]["code"], -32700);
    assert_eq!(response["id"], Value::Null);
}

#[tokio::test]
async fn test_invalid_request() {
    let state = state();
    let response = post_rpc(&state, r#"{"jsonrpc": "2.0", "id": 1}"#).await;
    assert_eq!(response["error"]["code"], -32600);

    let response = post_rpc(
        &state,
        r#"{"jsonrpc": "1.0", "id": 1, "method": "list_messages"}"#,
    )
    .await;
    assert_eq!(response["error"]["code"], -32600);
}

#[tokio::test]
async fn test_get_username_announces_login() {
    let state = state();
    let response = call(&state, 1, "get_username", Value::Null).await;
    let name = response["result"].as_str().unwrap().to_string();
    assert!(name.contains(' '));

    let log = state.storage.all_messages();
    assert_eq!(log.len(), 1);
    assert!(log[0].msg.is_system());
    assert_eq!(log[0].msg.text, format!("`{name}` has logged on."));
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = assert_ok!(create_router(state()).oneshot(request).await);
    assert_eq!(response.status(), StatusCode::OK);
}
