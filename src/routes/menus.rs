// ABOUTME: Menu route handlers for multi-day meal plans
// ABOUTME: CRUD plus slot assignment, client assignment, and client-side reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! Menu routes
//!
//! Specialists build menus out of their own dishes and assign them to
//! clients. Clients see the menus assigned to them, fully expanded into days
//! and slots.

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
use crate::database::menus::MenuManager;
use crate::database::{MenuRecord, MenuSlotRecord};
use crate::errors::AppError;
use crate::models::{MealSlot, Role};
use crate::resources::ServerResources;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a menu
#[derive(Debug, Deserialize)]
pub struct CreateMenuRequest {
    /// Menu title
    pub title: String,
    /// Number of days the plan covers
    pub day_count: i64,
    /// Client to assign the menu to (optional)
    #[serde(default)]
    pub client_id: Option<String>,
}

/// Request to update a menu
#[derive(Debug, Deserialize)]
pub struct UpdateMenuRequest {
    /// New title
    pub title: String,
    /// New client assignment; null clears it
    #[serde(default)]
    pub client_id: Option<String>,
}

/// Request to assign a dish to a slot
#[derive(Debug, Deserialize)]
pub struct SetSlotRequest {
    /// Zero-based day index
    pub day_index: i64,
    /// Meal slot
    pub slot: MealSlot,
    /// Dish to assign
    pub dish_id: String,
}

/// Request to clear a slot
#[derive(Debug, Deserialize)]
pub struct ClearSlotRequest {
    /// Zero-based day index
    pub day_index: i64,
    /// Meal slot
    pub slot: MealSlot,
}

/// One day of a menu, expanded for responses
#[derive(Debug, Serialize, Deserialize)]
pub struct MenuDayResponse {
    pub day_index: i64,
    pub slots: Vec<MenuSlotResponse>,
}

/// One slot assignment in a response
#[derive(Debug, Serialize, Deserialize)]
pub struct MenuSlotResponse {
    pub slot: MealSlot,
    pub dish_id: String,
    pub dish_title: String,
}

/// Response for a menu with its days expanded
#[derive(Debug, Serialize, Deserialize)]
pub struct MenuResponse {
    pub id: String,
    pub title: String,
    pub client_id: Option<String>,
    pub day_count: i64,
    pub days: Vec<MenuDayResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl MenuResponse {
    fn from_parts(menu: MenuRecord, slots: Vec<MenuSlotRecord>) -> Self {
        // Every day appears, including days with nothing assigned yet
        let days = (0..menu.day_count)
            .map(|day_index| MenuDayResponse {
                day_index,
                slots: slots
                    .iter()
                    .filter(|s| s.day_index == day_index)
                    .map(|s| MenuSlotResponse {
                        slot: s.slot,
                        dish_id: s.dish_id.clone(),
                        dish_title: s.dish_title.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: menu.id,
            title: menu.title,
            client_id: menu.client_id,
            day_count: menu.day_count,
            days,
            created_at: menu.created_at,
            updated_at: menu.updated_at,
        }
    }
}

/// Summary of a menu for listing
#[derive(Debug, Serialize, Deserialize)]
pub struct MenuSummaryResponse {
    pub id: String,
    pub title: String,
    pub client_id: Option<String>,
    pub day_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<MenuRecord> for MenuSummaryResponse {
    fn from(menu: MenuRecord) -> Self {
        Self {
            id: menu.id,
            title: menu.title,
            client_id: menu.client_id,
            day_count: menu.day_count,
            created_at: menu.created_at,
            updated_at: menu.updated_at,
        }
    }
}

/// Response for listing menus
#[derive(Debug, Serialize, Deserialize)]
pub struct MenuListResponse {
    pub menus: Vec<MenuSummaryResponse>,
    pub total: usize,
}

/// Query parameters for listing menus
#[derive(Debug, Deserialize, Default)]
pub struct ListMenusQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

const fn default_limit() -> i64 {
    20
}

// ============================================================================
// Menu Routes
// ============================================================================

/// Menu routes handler
pub struct MenuRoutes;

impl MenuRoutes {
    /// Create all menu routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/menus", post(Self::create_menu))
            .route("/api/menus", get(Self::list_menus))
            .route("/api/menus/:menu_id", get(Self::get_menu))
            .route("/api/menus/:menu_id", put(Self::update_menu))
            .route("/api/menus/:menu_id", delete(Self::delete_menu))
            .route("/api/menus/:menu_id/slots", put(Self::set_slot))
            .route("/api/menus/:menu_id/slots", delete(Self::clear_slot))
            .with_state(resources)
    }

    fn authenticate(
        headers: &axum::http::HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth_manager.authenticate_header(auth_header)
    }

    fn manager(resources: &ServerResources) -> MenuManager {
        MenuManager::new(resources.database.pool().clone())
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    /// Create a menu (specialist only)
    async fn create_menu(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<CreateMenuRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        if request.title.trim().is_empty() {
            return Err(AppError::missing_field("title"));
        }

        let menu = Self::manager(&resources)
            .create(
                &auth.user_id.to_string(),
                request.title.trim(),
                request.day_count,
                request.client_id.as_deref(),
            )
            .await?;

        let response = MenuResponse::from_parts(menu, Vec::new());
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// List menus: own menus for specialists, assigned menus for clients
    async fn list_menus(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(query): Query<ListMenusQuery>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let manager = Self::manager(&resources);
        let user_id = auth.user_id.to_string();

        let menus = match auth.role {
            Role::Specialist => manager.list(&user_id, query.limit, query.offset).await?,
            Role::Client => manager.list_for_client(&user_id).await?,
        };

        let total = menus.len();
        let response = MenuListResponse {
            menus: menus.into_iter().map(MenuSummaryResponse::from).collect(),
            total,
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Get a menu with its days expanded
    async fn get_menu(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(menu_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let manager = Self::manager(&resources);
        let user_id = auth.user_id.to_string();

        let menu = match auth.role {
            Role::Specialist => manager.get(&menu_id, &user_id).await?,
            Role::Client => manager.get_for_client(&menu_id, &user_id).await?,
        }
        .ok_or_else(|| AppError::not_found("Menu"))?;

        let slots = manager.slots(&menu.id).await?;
        Ok((StatusCode::OK, Json(MenuResponse::from_parts(menu, slots))).into_response())
    }

    /// Update title and client assignment (specialist only)
    async fn update_menu(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(menu_id): Path<String>,
        Json(request): Json<UpdateMenuRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        if request.title.trim().is_empty() {
            return Err(AppError::missing_field("title"));
        }

        let updated = Self::manager(&resources)
            .update(
                &menu_id,
                &auth.user_id.to_string(),
                request.title.trim(),
                request.client_id.as_deref(),
            )
            .await?;

        if !updated {
            return Err(AppError::not_found("Menu"));
        }

        Ok((StatusCode::OK, Json(serde_json::json!({"success": true}))).into_response())
    }

    /// Delete a menu (specialist only)
    async fn delete_menu(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(menu_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        let deleted = Self::manager(&resources)
            .delete(&menu_id, &auth.user_id.to_string())
            .await?;

        if !deleted {
            return Err(AppError::not_found("Menu"));
        }

        Ok((StatusCode::OK, Json(serde_json::json!({"success": true}))).into_response())
    }

    /// Assign a dish to a slot (specialist only)
    async fn set_slot(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(menu_id): Path<String>,
        Json(request): Json<SetSlotRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        Self::manager(&resources)
            .set_slot(
                &menu_id,
                &auth.user_id.to_string(),
                request.day_index,
                request.slot,
                &request.dish_id,
            )
            .await?;

        Ok((StatusCode::OK, Json(serde_json::json!({"success": true}))).into_response())
    }

    /// Clear a slot (specialist only)
    async fn clear_slot(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(menu_id): Path<String>,
        Json(request): Json<ClearSlotRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        let cleared = Self::manager(&resources)
            .clear_slot(
                &menu_id,
                &auth.user_id.to_string(),
                request.day_index,
                request.slot,
            )
            .await?;

        if !cleared {
            return Err(AppError::not_found("Menu slot"));
        }

        Ok((StatusCode::OK, Json(serde_json::json!({"success": true}))).into_response())
    }
}
