// ABOUTME: Integration tests for the drafting assistant route handlers
// ABOUTME: Tests the shape-complete-normalize pipeline with a stub provider

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{client_token, create_test_resources_with_llm, specialist_token, StubLlm};
use helpers::axum_test::AxumTestRequest;
use nutrio_server::llm::{DishDraft, MacroEstimate, MealPlanDraft, SubstitutionList};
use nutrio_server::routes::assistant::DraftResponse;
use nutrio_server::routes::AssistantRoutes;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_draft_dish_normalizes_fenced_output() {
    let completion = "Here's a draft for you:\n```json\n{\n  \"title\": \"Salmon salad\",\n  \"ingredients\": [{\"name\": \"salmon\", \"quantity\": 150, \"unit\": \"g\"}],\n  \"macros\": {\"kcal\": 430, \"protein\": 35},\n  \"tags\": [\"high-protein\"]\n}\n```\nEnjoy!";
    let resources = create_test_resources_with_llm(StubLlm::new(completion))
        .await
        .unwrap();
    let (_sid, auth) = specialist_token(&resources);
    let router = AssistantRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/assistant/draft-dish")
        .header("authorization", &auth)
        .json(&json!({"brief": "A light dinner rich in omega-3"}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: DraftResponse<DishDraft> = response.json();

    assert_eq!(body.draft.title.as_deref(), Some("Salmon salad"));
    assert_eq!(body.draft.ingredients.len(), 1);
    assert_eq!(body.draft.macros.as_ref().unwrap().protein_g, Some(35.0));
    // Raw text is passed through for specialist transparency
    assert!(body.raw.contains("Here's a draft"));
    assert_eq!(body.model, "stub-model");
    assert_eq!(body.usage.unwrap().total_tokens, 150);
}

#[tokio::test]
async fn test_draft_dish_requires_brief() {
    let resources = create_test_resources_with_llm(StubLlm::new("{}"))
        .await
        .unwrap();
    let (_sid, auth) = specialist_token(&resources);
    let router = AssistantRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/assistant/draft-dish")
        .header("authorization", &auth)
        .json(&json!({"brief": "  "}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("MISSING_REQUIRED_FIELD"));
}

#[tokio::test]
async fn test_draft_dish_client_forbidden() {
    let resources = create_test_resources_with_llm(StubLlm::new("{}"))
        .await
        .unwrap();
    let (_cid, auth) = client_token(&resources);
    let router = AssistantRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/assistant/draft-dish")
        .header("authorization", &auth)
        .json(&json!({"brief": "A dinner"}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_non_json_completion_maps_to_bad_gateway() {
    let resources = create_test_resources_with_llm(StubLlm::new(
        "I'm sorry, I cannot produce a recipe for that request.",
    ))
    .await
    .unwrap();
    let (_sid, auth) = specialist_token(&resources);
    let router = AssistantRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/assistant/draft-dish")
        .header("authorization", &auth)
        .json(&json!({"brief": "A dinner"}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert!(response.text().contains("LLM_OUTPUT_INVALID"));
}

#[tokio::test]
async fn test_estimate_macros_with_loose_types() {
    let resources = create_test_resources_with_llm(StubLlm::new(
        r#"{"calories": "520", "protein": 31.5, "fat": 18, "carbs": 48}"#,
    ))
    .await
    .unwrap();
    let (_sid, auth) = specialist_token(&resources);
    let router = AssistantRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/assistant/estimate-macros")
        .header("authorization", &auth)
        .json(&json!({"brief": "200g cooked rice with butter"}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: DraftResponse<MacroEstimate> = response.json();
    assert_eq!(body.draft.kcal, Some(520.0));
    assert_eq!(body.draft.protein_g, Some(31.5));
}

#[tokio::test]
async fn test_estimate_macros_rejects_valueless_object() {
    let resources = create_test_resources_with_llm(StubLlm::new(
        r#"{"comment": "not enough information"}"#,
    ))
    .await
    .unwrap();
    let (_sid, auth) = specialist_token(&resources);
    let router = AssistantRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/assistant/estimate-macros")
        .header("authorization", &auth)
        .json(&json!({"brief": "mystery dish"}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_suggest_substitutes() {
    let resources = create_test_resources_with_llm(StubLlm::new(
        r#"{"substitutes": [{"name": "tofu", "reason": "comparable protein"}, "tempeh"]}"#,
    ))
    .await
    .unwrap();
    let (_sid, auth) = specialist_token(&resources);
    let router = AssistantRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/assistant/suggest-substitutes")
        .header("authorization", &auth)
        .json(&json!({"brief": "Replace chicken breast for a vegan client"}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: DraftResponse<SubstitutionList> = response.json();
    assert_eq!(body.draft.substitutes.len(), 2);
    assert_eq!(body.draft.substitutes[0].name, "tofu");
}

#[tokio::test]
async fn test_draft_menu_validates_days() {
    let resources = create_test_resources_with_llm(StubLlm::new("{}"))
        .await
        .unwrap();
    let (_sid, auth) = specialist_token(&resources);
    let router = AssistantRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/assistant/draft-menu")
        .header("authorization", &auth)
        .json(&json!({"brief": "Bulk plan", "days": 0}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_draft_menu_normalizes_plan() {
    let completion = r#"{
        "title": "3-day reset",
        "days": [
            {"day": 1, "meals": [{"slot": "Breakfast", "title": "Oats", "macros": {"kcal": 380}}]},
            {"day": 2, "meals": [{"slot": "dinner", "title": "Lentil stew"}]}
        ]
    }"#;
    let resources = create_test_resources_with_llm(StubLlm::new(completion))
        .await
        .unwrap();
    let (_sid, auth) = specialist_token(&resources);
    let router = AssistantRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/assistant/draft-menu")
        .header("authorization", &auth)
        .json(&json!({"brief": "A gentle reset", "days": 3}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: DraftResponse<MealPlanDraft> = response.json();
    assert_eq!(body.draft.title.as_deref(), Some("3-day reset"));
    assert_eq!(body.draft.days.len(), 2);
    assert_eq!(body.draft.days[0].meals[0].slot.as_deref(), Some("breakfast"));
}

#[tokio::test]
async fn test_unknown_client_context_rejected() {
    let resources = create_test_resources_with_llm(StubLlm::new("{}"))
        .await
        .unwrap();
    let (_sid, auth) = specialist_token(&resources);
    let router = AssistantRoutes::routes(resources);

    let response = AxumTestRequest::post("/api/assistant/draft-dish")
        .header("authorization", &auth)
        .json(&json!({
            "brief": "A dinner",
            "client_id": uuid::Uuid::new_v4().to_string()
        }))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
