// ABOUTME: Dish route handlers for specialist-owned recipe records
// ABOUTME: CRUD endpoints with owner scoping and menu-mediated client reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! Dish routes
//!
//! Specialists own dishes and get full CRUD. Clients can read a dish only
//! when one of their assigned menus references it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::AuthResult;
use crate::database::dishes::{DishInput, DishManager};
use crate::database::DishRecord;
use crate::errors::AppError;
use crate::models::{Ingredient, MacroNutrients, Role};
use crate::resources::ServerResources;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create or update a dish
#[derive(Debug, Deserialize)]
pub struct DishRequest {
    /// Dish title
    pub title: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Ingredient lines
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Macro-nutrient estimate per serving
    #[serde(default)]
    pub macros: MacroNutrients,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Preparation instructions
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Response for a single dish
#[derive(Debug, Serialize, Deserialize)]
pub struct DishResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub macros: MacroNutrients,
    pub tags: Vec<String>,
    pub instructions: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<DishRecord> for DishResponse {
    fn from(record: DishRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            ingredients: record.ingredients,
            macros: record.macros,
            tags: record.tags,
            instructions: record.instructions,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Response for listing dishes
#[derive(Debug, Serialize, Deserialize)]
pub struct DishListResponse {
    pub dishes: Vec<DishResponse>,
    pub total: usize,
}

/// Query parameters for listing dishes
#[derive(Debug, Deserialize, Default)]
pub struct ListDishesQuery {
    /// Maximum number of dishes to return
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Offset for pagination
    #[serde(default)]
    pub offset: i64,
}

const fn default_limit() -> i64 {
    50
}

// ============================================================================
// Dish Routes
// ============================================================================

/// Dish routes handler
pub struct DishRoutes;

impl DishRoutes {
    /// Create all dish routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/dishes", post(Self::create_dish))
            .route("/api/dishes", get(Self::list_dishes))
            .route("/api/dishes/:dish_id", get(Self::get_dish))
            .route("/api/dishes/:dish_id", put(Self::update_dish))
            .route("/api/dishes/:dish_id", delete(Self::delete_dish))
            .with_state(resources)
    }

    /// Extract and authenticate the caller from the authorization header
    fn authenticate(
        headers: &axum::http::HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth_manager.authenticate_header(auth_header)
    }

    /// Create a `DishManager` from server resources
    fn manager(resources: &ServerResources) -> DishManager {
        DishManager::new(resources.database.pool().clone())
    }

    fn validated_input(request: DishRequest) -> Result<DishInput, AppError> {
        if request.title.trim().is_empty() {
            return Err(AppError::missing_field("title"));
        }

        Ok(DishInput {
            title: request.title.trim().to_owned(),
            description: request.description,
            ingredients: request.ingredients,
            macros: request.macros,
            tags: request.tags,
            instructions: request.instructions,
        })
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    /// Create a new dish (specialist only)
    async fn create_dish(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<DishRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        let input = Self::validated_input(request)?;
        let dish = Self::manager(&resources)
            .create(&auth.user_id.to_string(), &input)
            .await?;

        Ok((StatusCode::CREATED, Json(DishResponse::from(dish))).into_response())
    }

    /// List the caller's dishes (specialist only)
    async fn list_dishes(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(query): Query<ListDishesQuery>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        let dishes = Self::manager(&resources)
            .list(&auth.user_id.to_string(), query.limit, query.offset)
            .await?;

        let total = dishes.len();
        let response = DishListResponse {
            dishes: dishes.into_iter().map(DishResponse::from).collect(),
            total,
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Get a dish: owner access for specialists, menu-mediated for clients
    async fn get_dish(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(dish_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let manager = Self::manager(&resources);
        let user_id = auth.user_id.to_string();

        let dish = match auth.role {
            Role::Specialist => manager.get(&dish_id, &user_id).await?,
            Role::Client => manager.get_for_client(&dish_id, &user_id).await?,
        }
        .ok_or_else(|| AppError::not_found("Dish"))?;

        Ok((StatusCode::OK, Json(DishResponse::from(dish))).into_response())
    }

    /// Update a dish (specialist only)
    async fn update_dish(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(dish_id): Path<String>,
        Json(request): Json<DishRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        let input = Self::validated_input(request)?;
        let updated = Self::manager(&resources)
            .update(&dish_id, &auth.user_id.to_string(), &input)
            .await?;

        if !updated {
            return Err(AppError::not_found("Dish"));
        }

        Ok((StatusCode::OK, Json(serde_json::json!({"success": true}))).into_response())
    }

    /// Delete a dish (specialist only)
    async fn delete_dish(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(dish_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        let deleted = Self::manager(&resources)
            .delete(&dish_id, &auth.user_id.to_string())
            .await?;

        if !deleted {
            return Err(AppError::not_found("Dish"));
        }

        Ok((StatusCode::OK, Json(serde_json::json!({"success": true}))).into_response())
    }
}
