// ABOUTME: Integration tests for the dish route handlers
// ABOUTME: Tests CRUD, validation, ownership scoping, and client read access

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{create_test_resources, specialist_token};
use helpers::axum_test::AxumTestRequest;
use nutrio_server::routes::dishes::{DishListResponse, DishResponse, DishRoutes};

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_create_dish() {
    let resources = create_test_resources().await.unwrap();
    let (_id, auth) = specialist_token(&resources);
    let router = DishRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/dishes")
        .header("authorization", &auth)
        .json(&json!({
            "title": "Chickpea curry",
            "description": "Weeknight curry",
            "ingredients": [
                {"name": "chickpeas", "quantity": 400.0, "unit": "g"}
            ],
            "macros": {"kcal": 610.0, "protein_g": 22.0},
            "tags": ["vegan", "budget"]
        }))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);

    let dish: DishResponse = response.json();
    assert_eq!(dish.title, "Chickpea curry");
    assert_eq!(dish.ingredients.len(), 1);
    assert_eq!(dish.macros.kcal, Some(610.0));
    assert_eq!(dish.tags, vec!["vegan", "budget"]);
}

#[tokio::test]
async fn test_create_dish_requires_title() {
    let resources = create_test_resources().await.unwrap();
    let (_id, auth) = specialist_token(&resources);
    let router = DishRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/dishes")
        .header("authorization", &auth)
        .json(&json!({"title": "   "}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("MISSING_REQUIRED_FIELD"));
}

#[tokio::test]
async fn test_create_dish_requires_auth() {
    let resources = create_test_resources().await.unwrap();
    let router = DishRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/dishes")
        .json(&json!({"title": "Soup"}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_client_cannot_create_dish() {
    let resources = create_test_resources().await.unwrap();
    let (_id, auth) = common::client_token(&resources);
    let router = DishRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/dishes")
        .header("authorization", &auth)
        .json(&json!({"title": "Soup"}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_and_get_dish() {
    let resources = create_test_resources().await.unwrap();
    let (_id, auth) = specialist_token(&resources);
    let router = DishRoutes::routes(resources);

    let created: DishResponse = AxumTestRequest::post("/api/dishes")
        .header("authorization", &auth)
        .json(&json!({"title": "Oatmeal"}))
        .send(router.clone())
        .await
        .json();

    let list: DishListResponse = AxumTestRequest::get("/api/dishes")
        .header("authorization", &auth)
        .send(router.clone())
        .await
        .json();
    assert_eq!(list.total, 1);
    assert_eq!(list.dishes[0].title, "Oatmeal");

    let fetched = AxumTestRequest::get(&format!("/api/dishes/{}", created.id))
        .header("authorization", &auth)
        .send(router)
        .await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
    let fetched: DishResponse = fetched.json();
    assert_eq!(fetched.id, created.id);
}

#[tokio::test]
async fn test_dish_ownership_scoping() {
    let resources = create_test_resources().await.unwrap();
    let (_a, auth_a) = specialist_token(&resources);
    let (_b, auth_b) = specialist_token(&resources);
    let router = DishRoutes::routes(resources);

    let created: DishResponse = AxumTestRequest::post("/api/dishes")
        .header("authorization", &auth_a)
        .json(&json!({"title": "Private dish"}))
        .send(router.clone())
        .await
        .json();

    // Another specialist cannot see it
    let response = AxumTestRequest::get(&format!("/api/dishes/{}", created.id))
        .header("authorization", &auth_b)
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // Nor update it
    let response = AxumTestRequest::put(&format!("/api/dishes/{}", created.id))
        .header("authorization", &auth_b)
        .json(&json!({"title": "Stolen"}))
        .send(router)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_and_delete_dish() {
    let resources = create_test_resources().await.unwrap();
    let (_id, auth) = specialist_token(&resources);
    let router = DishRoutes::routes(resources);

    let created: DishResponse = AxumTestRequest::post("/api/dishes")
        .header("authorization", &auth)
        .json(&json!({"title": "Draft title"}))
        .send(router.clone())
        .await
        .json();

    let response = AxumTestRequest::put(&format!("/api/dishes/{}", created.id))
        .header("authorization", &auth)
        .json(&json!({"title": "Final title", "tags": ["lunch"]}))
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let fetched: DishResponse = AxumTestRequest::get(&format!("/api/dishes/{}", created.id))
        .header("authorization", &auth)
        .send(router.clone())
        .await
        .json();
    assert_eq!(fetched.title, "Final title");
    assert_eq!(fetched.tags, vec!["lunch"]);

    let response = AxumTestRequest::delete(&format!("/api/dishes/{}", created.id))
        .header("authorization", &auth)
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = AxumTestRequest::get(&format!("/api/dishes/{}", created.id))
        .header("authorization", &auth)
        .send(router)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
