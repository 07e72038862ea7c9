// ABOUTME: Integration tests for the chat route handlers
// ABOUTME: Tests pair-unique threads, message ordering, and participant scoping

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{client_token, create_test_resources, specialist_token};
use helpers::axum_test::AxumTestRequest;
use nutrio_server::routes::chat::{
    MessageListResponse, MessageResponse, ThreadListResponse, ThreadResponse,
};
use nutrio_server::routes::router;

use axum::http::StatusCode;
use serde_json::json;

/// Link a client to a specialist and open their thread
async fn setup_thread(
    app: &axum::Router,
    specialist_auth: &str,
    client_id: &uuid::Uuid,
) -> ThreadResponse {
    AxumTestRequest::put(&format!("/api/clients/{client_id}"))
        .header("authorization", specialist_auth)
        .json(&json!({"display_name": "Jamie"}))
        .send(app.clone())
        .await;

    AxumTestRequest::post("/api/chat/threads")
        .header("authorization", specialist_auth)
        .json(&json!({"client_id": client_id.to_string()}))
        .send(app.clone())
        .await
        .json()
}

#[tokio::test]
async fn test_thread_is_unique_per_pair() {
    let resources = create_test_resources().await.unwrap();
    let (_sid, specialist_auth) = specialist_token(&resources);
    let (client_id, client_auth) = client_token(&resources);
    let app = router(resources);

    let first = setup_thread(&app, &specialist_auth, &client_id).await;

    // Opening again from either side returns the same thread
    let second: ThreadResponse = AxumTestRequest::post("/api/chat/threads")
        .header("authorization", &specialist_auth)
        .json(&json!({"client_id": client_id.to_string()}))
        .send(app.clone())
        .await
        .json();
    assert_eq!(first.id, second.id);

    let from_client: ThreadResponse = AxumTestRequest::post("/api/chat/threads")
        .header("authorization", &client_auth)
        .json(&json!({}))
        .send(app)
        .await
        .json();
    assert_eq!(first.id, from_client.id);
}

#[tokio::test]
async fn test_specialist_cannot_open_thread_with_foreign_client() {
    let resources = create_test_resources().await.unwrap();
    let (_sid, specialist_auth) = specialist_token(&resources);
    let (client_id, _client_auth) = client_token(&resources);
    let app = router(resources);

    // No coaching link exists
    let response = AxumTestRequest::post("/api/chat/threads")
        .header("authorization", &specialist_auth)
        .json(&json!({"client_id": client_id.to_string()}))
        .send(app)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_messages_ordered_and_visible_to_both_parties() {
    let resources = create_test_resources().await.unwrap();
    let (_sid, specialist_auth) = specialist_token(&resources);
    let (client_id, client_auth) = client_token(&resources);
    let app = router(resources);

    let thread = setup_thread(&app, &specialist_auth, &client_id).await;

    let sent: MessageResponse =
        AxumTestRequest::post(&format!("/api/chat/threads/{}/messages", thread.id))
            .header("authorization", &specialist_auth)
            .json(&json!({"content": "How was the first week?"}))
            .send(app.clone())
            .await
            .json();
    assert_eq!(sent.sender_role, "specialist");

    AxumTestRequest::post(&format!("/api/chat/threads/{}/messages", thread.id))
        .header("authorization", &client_auth)
        .json(&json!({"content": "Went well, energy is up."}))
        .send(app.clone())
        .await;

    let list: MessageListResponse =
        AxumTestRequest::get(&format!("/api/chat/threads/{}/messages", thread.id))
            .header("authorization", &client_auth)
            .send(app.clone())
            .await
            .json();

    assert_eq!(list.total, 2);
    assert_eq!(list.messages[0].content, "How was the first week?");
    assert_eq!(list.messages[1].sender_role, "client");

    // The thread shows up in both listings
    let threads: ThreadListResponse = AxumTestRequest::get("/api/chat/threads")
        .header("authorization", &specialist_auth)
        .send(app)
        .await
        .json();
    assert_eq!(threads.total, 1);
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let resources = create_test_resources().await.unwrap();
    let (_sid, specialist_auth) = specialist_token(&resources);
    let (client_id, _client_auth) = client_token(&resources);
    let app = router(resources);

    let thread = setup_thread(&app, &specialist_auth, &client_id).await;

    let response =
        AxumTestRequest::post(&format!("/api/chat/threads/{}/messages", thread.id))
            .header("authorization", &specialist_auth)
            .json(&json!({"content": "   "}))
            .send(app)
            .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_outsider_cannot_read_thread() {
    let resources = create_test_resources().await.unwrap();
    let (_sid, specialist_auth) = specialist_token(&resources);
    let (client_id, _client_auth) = client_token(&resources);
    let (_outsider_id, outsider_auth) = client_token(&resources);
    let app = router(resources);

    let thread = setup_thread(&app, &specialist_auth, &client_id).await;

    let response =
        AxumTestRequest::get(&format!("/api/chat/threads/{}/messages", thread.id))
            .header("authorization", &outsider_auth)
            .send(app.clone())
            .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response =
        AxumTestRequest::post(&format!("/api/chat/threads/{}/messages", thread.id))
            .header("authorization", &outsider_auth)
            .json(&json!({"content": "let me in"}))
            .send(app)
            .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
