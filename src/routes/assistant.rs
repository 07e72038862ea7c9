// ABOUTME: Drafting assistant routes proxying structured prompts to the LLM
// ABOUTME: Shapes the request, performs one completion call, and normalizes the output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! Drafting assistant routes
//!
//! Specialist-only endpoints that forward a free-form brief to the
//! chat-completion provider and return a normalized draft. Each handler is
//! the same three-step pipeline: shape the prompt, perform a single awaited
//! completion call, normalize the output. The raw model text is returned
//! alongside the draft so the specialist can see what was cut.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::AuthResult;
use crate::database::clients::ClientProfileManager;
use crate::errors::AppError;
use crate::llm::{
    normalizer, shape_request, ChatResponse, DishDraft, DraftTask, MacroEstimate, MealPlanDraft,
    PromptContext, SubstitutionList, TokenUsage,
};
use crate::resources::ServerResources;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request for a drafting task
#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    /// Free-form natural-language brief
    pub brief: String,
    /// Client whose profile context (allergies, preference, budget) should
    /// be attached; must be coached by the caller
    #[serde(default)]
    pub client_id: Option<String>,
}

/// Request for a meal-plan draft
#[derive(Debug, Deserialize)]
pub struct DraftMenuRequest {
    /// Free-form natural-language brief
    pub brief: String,
    /// Number of days the plan covers
    pub days: u8,
    /// Client whose profile context should be attached
    #[serde(default)]
    pub client_id: Option<String>,
}

/// Response wrapper for a normalized draft
#[derive(Debug, Serialize, Deserialize)]
pub struct DraftResponse<T> {
    /// The normalized draft
    pub draft: T,
    /// Raw completion text, for specialist transparency
    pub raw: String,
    /// Model that produced the completion
    pub model: String,
    /// Token usage if the provider reported it
    pub usage: Option<TokenUsage>,
}

impl<T> DraftResponse<T> {
    fn new(draft: T, completion: ChatResponse) -> Self {
        Self {
            draft,
            raw: completion.content,
            model: completion.model,
            usage: completion.usage,
        }
    }
}

// ============================================================================
// Assistant Routes
// ============================================================================

/// Drafting assistant routes handler
pub struct AssistantRoutes;

impl AssistantRoutes {
    /// Create all assistant routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/assistant/draft-dish", post(Self::draft_dish))
            .route("/api/assistant/estimate-macros", post(Self::estimate_macros))
            .route(
                "/api/assistant/suggest-substitutes",
                post(Self::suggest_substitutes),
            )
            .route("/api/assistant/draft-menu", post(Self::draft_menu))
            .with_state(resources)
    }

    fn authenticate(
        headers: &axum::http::HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth_manager.authenticate_header(auth_header)
    }

    /// Load the prompt context for an optional coached client
    async fn load_context(
        client_id: Option<&str>,
        specialist_id: &str,
        resources: &ServerResources,
    ) -> Result<PromptContext, AppError> {
        let Some(client_id) = client_id else {
            return Ok(PromptContext::default());
        };

        let profiles = ClientProfileManager::new(resources.database.pool().clone());
        let profile = profiles
            .get_for_specialist(client_id, specialist_id)
            .await?
            .ok_or_else(|| AppError::not_found("Client"))?;

        Ok(PromptContext {
            allergies: profile.allergies,
            dietary_preference: profile.dietary_preference,
            weekly_budget: profile.weekly_budget,
        })
    }

    /// Shape, complete, and extract: the shared front half of every handler
    async fn complete_task(
        task: DraftTask,
        brief: &str,
        context: &PromptContext,
        resources: &ServerResources,
    ) -> Result<(serde_json::Value, ChatResponse), AppError> {
        if brief.trim().is_empty() {
            return Err(AppError::missing_field("brief"));
        }

        let request = shape_request(task, brief, context);
        let completion = resources.llm.complete(&request).await?;

        info!(
            task = ?task,
            chars = completion.content.len(),
            "Received draft completion"
        );

        let value = normalizer::extract_json(&completion.content)?;
        Ok((value, completion))
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    /// Draft a dish from a brief
    async fn draft_dish(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<DraftRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        let context = Self::load_context(
            request.client_id.as_deref(),
            &auth.user_id.to_string(),
            &resources,
        )
        .await?;

        let (value, completion) =
            Self::complete_task(DraftTask::DraftDish, &request.brief, &context, &resources)
                .await?;

        let draft = DishDraft::from_value(&value)?;
        Ok((StatusCode::OK, Json(DraftResponse::new(draft, completion))).into_response())
    }

    /// Estimate macro nutrients for a dish or ingredient list
    async fn estimate_macros(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<DraftRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        let (value, completion) = Self::complete_task(
            DraftTask::EstimateMacros,
            &request.brief,
            &PromptContext::default(),
            &resources,
        )
        .await?;

        let draft = MacroEstimate::from_value(&value);
        if draft.is_empty() {
            return Err(AppError::llm_output_invalid(
                "Completion held no usable macro values",
            ));
        }

        Ok((StatusCode::OK, Json(DraftResponse::new(draft, completion))).into_response())
    }

    /// Suggest substitutes for an ingredient
    async fn suggest_substitutes(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<DraftRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        let context = Self::load_context(
            request.client_id.as_deref(),
            &auth.user_id.to_string(),
            &resources,
        )
        .await?;

        let (value, completion) = Self::complete_task(
            DraftTask::SuggestSubstitutes,
            &request.brief,
            &context,
            &resources,
        )
        .await?;

        let draft = SubstitutionList::from_value(&value)?;
        Ok((StatusCode::OK, Json(DraftResponse::new(draft, completion))).into_response())
    }

    /// Draft a multi-day meal plan
    async fn draft_menu(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<DraftMenuRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        if !(1..=31).contains(&request.days) {
            return Err(AppError::new(
                crate::errors::ErrorCode::ValueOutOfRange,
                "days must be between 1 and 31",
            ));
        }

        let context = Self::load_context(
            request.client_id.as_deref(),
            &auth.user_id.to_string(),
            &resources,
        )
        .await?;

        let (value, completion) = Self::complete_task(
            DraftTask::DraftMealPlan {
                days: request.days,
            },
            &request.brief,
            &context,
            &resources,
        )
        .await?;

        let draft = MealPlanDraft::from_value(&value)?;
        Ok((StatusCode::OK, Json(DraftResponse::new(draft, completion))).into_response())
    }
}
