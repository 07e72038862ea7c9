// ABOUTME: Integration tests for the menu route handlers
// ABOUTME: Tests menu CRUD, slot assignment rules, and client visibility

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{client_token, create_test_resources, specialist_token};
use helpers::axum_test::AxumTestRequest;
use nutrio_server::routes::dishes::DishResponse;
use nutrio_server::routes::menus::{MenuListResponse, MenuResponse};
use nutrio_server::routes::router;

use axum::http::StatusCode;
use serde_json::json;

async fn create_dish(router: &axum::Router, auth: &str, title: &str) -> DishResponse {
    AxumTestRequest::post("/api/dishes")
        .header("authorization", auth)
        .json(&json!({"title": title}))
        .send(router.clone())
        .await
        .json()
}

#[tokio::test]
async fn test_create_menu_and_expand_days() {
    let resources = create_test_resources().await.unwrap();
    let (_id, auth) = specialist_token(&resources);
    let app = router(resources);

    let response = AxumTestRequest::post("/api/menus")
        .header("authorization", &auth)
        .json(&json!({"title": "Cut week", "day_count": 3}))
        .send(app)
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let menu: MenuResponse = response.json();
    assert_eq!(menu.title, "Cut week");
    assert_eq!(menu.day_count, 3);
    // Days are always expanded, empty or not
    assert_eq!(menu.days.len(), 3);
    assert!(menu.days.iter().all(|d| d.slots.is_empty()));
}

#[tokio::test]
async fn test_day_count_out_of_range() {
    let resources = create_test_resources().await.unwrap();
    let (_id, auth) = specialist_token(&resources);
    let app = router(resources);

    let response = AxumTestRequest::post("/api/menus")
        .header("authorization", &auth)
        .json(&json!({"title": "Year plan", "day_count": 365}))
        .send(app)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("VALUE_OUT_OF_RANGE"));
}

#[tokio::test]
async fn test_set_and_clear_slot() {
    let resources = create_test_resources().await.unwrap();
    let (_id, auth) = specialist_token(&resources);
    let app = router(resources);

    let dish = create_dish(&app, &auth, "Oats").await;
    let menu: MenuResponse = AxumTestRequest::post("/api/menus")
        .header("authorization", &auth)
        .json(&json!({"title": "Plan", "day_count": 2}))
        .send(app.clone())
        .await
        .json();

    let response = AxumTestRequest::put(&format!("/api/menus/{}/slots", menu.id))
        .header("authorization", &auth)
        .json(&json!({"day_index": 1, "slot": "breakfast", "dish_id": dish.id}))
        .send(app.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let fetched: MenuResponse = AxumTestRequest::get(&format!("/api/menus/{}", menu.id))
        .header("authorization", &auth)
        .send(app.clone())
        .await
        .json();
    assert_eq!(fetched.days[1].slots.len(), 1);
    assert_eq!(fetched.days[1].slots[0].dish_title, "Oats");
    assert!(fetched.days[0].slots.is_empty());

    let response = AxumTestRequest::delete(&format!("/api/menus/{}/slots", menu.id))
        .header("authorization", &auth)
        .json(&json!({"day_index": 1, "slot": "breakfast"}))
        .send(app.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let fetched: MenuResponse = AxumTestRequest::get(&format!("/api/menus/{}", menu.id))
        .header("authorization", &auth)
        .send(app)
        .await
        .json();
    assert!(fetched.days[1].slots.is_empty());
}

#[tokio::test]
async fn test_slot_rejects_day_outside_plan() {
    let resources = create_test_resources().await.unwrap();
    let (_id, auth) = specialist_token(&resources);
    let app = router(resources);

    let dish = create_dish(&app, &auth, "Oats").await;
    let menu: MenuResponse = AxumTestRequest::post("/api/menus")
        .header("authorization", &auth)
        .json(&json!({"title": "Plan", "day_count": 2}))
        .send(app.clone())
        .await
        .json();

    let response = AxumTestRequest::put(&format!("/api/menus/{}/slots", menu.id))
        .header("authorization", &auth)
        .json(&json!({"day_index": 5, "slot": "lunch", "dish_id": dish.id}))
        .send(app)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_slot_rejects_foreign_dish() {
    let resources = create_test_resources().await.unwrap();
    let (_a, auth_a) = specialist_token(&resources);
    let (_b, auth_b) = specialist_token(&resources);
    let app = router(resources);

    // Dish belongs to specialist B, menu to specialist A
    let foreign_dish = create_dish(&app, &auth_b, "Foreign").await;
    let menu: MenuResponse = AxumTestRequest::post("/api/menus")
        .header("authorization", &auth_a)
        .json(&json!({"title": "Plan", "day_count": 1}))
        .send(app.clone())
        .await
        .json();

    let response = AxumTestRequest::put(&format!("/api/menus/{}/slots", menu.id))
        .header("authorization", &auth_a)
        .json(&json!({"day_index": 0, "slot": "dinner", "dish_id": foreign_dish.id}))
        .send(app)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_sees_assigned_menu_and_its_dishes() {
    let resources = create_test_resources().await.unwrap();
    let (_sid, specialist_auth) = specialist_token(&resources);
    let (client_id, client_auth) = client_token(&resources);
    let app = router(resources);

    let dish = create_dish(&app, &specialist_auth, "Salmon salad").await;
    let menu: MenuResponse = AxumTestRequest::post("/api/menus")
        .header("authorization", &specialist_auth)
        .json(&json!({
            "title": "Client plan",
            "day_count": 1,
            "client_id": client_id.to_string()
        }))
        .send(app.clone())
        .await
        .json();

    AxumTestRequest::put(&format!("/api/menus/{}/slots", menu.id))
        .header("authorization", &specialist_auth)
        .json(&json!({"day_index": 0, "slot": "dinner", "dish_id": dish.id}))
        .send(app.clone())
        .await;

    // Client lists and reads the assigned menu
    let list: MenuListResponse = AxumTestRequest::get("/api/menus")
        .header("authorization", &client_auth)
        .send(app.clone())
        .await
        .json();
    assert_eq!(list.total, 1);

    let fetched = AxumTestRequest::get(&format!("/api/menus/{}", menu.id))
        .header("authorization", &client_auth)
        .send(app.clone())
        .await;
    assert_eq!(fetched.status_code(), StatusCode::OK);

    // Menu reference grants the client read access to the dish
    let dish_read = AxumTestRequest::get(&format!("/api/dishes/{}", dish.id))
        .header("authorization", &client_auth)
        .send(app.clone())
        .await;
    assert_eq!(dish_read.status_code(), StatusCode::OK);

    // A different client sees none of it
    let (_other, other_auth) = other_client_pair();
    let response = AxumTestRequest::get(&format!("/api/menus/{}", menu.id))
        .header("authorization", &other_auth)
        .send(app)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// Tokens are validated against the shared secret only, so any manager
// holding the test secret can mint them.
fn other_client_pair() -> (uuid::Uuid, String) {
    let manager = nutrio_server::auth::AuthManager::new(common::TEST_AUTH_SECRET, 24);
    let id = uuid::Uuid::new_v4();
    let token = manager
        .generate_token(id, nutrio_server::models::Role::Client)
        .unwrap();
    (id, format!("Bearer {token}"))
}
