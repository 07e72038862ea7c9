// ABOUTME: Client profile route handlers
// ABOUTME: Specialist-managed profiles with a client self-service endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! Client profile routes
//!
//! Specialists create and manage profiles for their clients. Clients read
//! their own profile and may update a small set of self-service fields.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::AuthResult;
use crate::database::clients::{ClientProfileInput, ClientProfileManager};
use crate::database::ClientProfileRecord;
use crate::errors::AppError;
use crate::resources::ServerResources;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create or update a client profile (specialist)
#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub display_name: String,
    #[serde(default)]
    pub goals: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dietary_preference: Option<String>,
    #[serde(default)]
    pub weekly_budget: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub activity_level: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request for a client updating their own profile
#[derive(Debug, Deserialize)]
pub struct SelfUpdateRequest {
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub activity_level: Option<String>,
    #[serde(default)]
    pub dietary_preference: Option<String>,
}

/// Response for a client profile
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub client_id: String,
    pub specialist_id: String,
    pub display_name: String,
    pub goals: Option<String>,
    pub allergies: Vec<String>,
    pub dietary_preference: Option<String>,
    pub weekly_budget: Option<f64>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ClientProfileRecord> for ProfileResponse {
    fn from(record: ClientProfileRecord) -> Self {
        Self {
            client_id: record.client_id,
            specialist_id: record.specialist_id,
            display_name: record.display_name,
            goals: record.goals,
            allergies: record.allergies,
            dietary_preference: record.dietary_preference,
            weekly_budget: record.weekly_budget,
            height_cm: record.height_cm,
            weight_kg: record.weight_kg,
            activity_level: record.activity_level,
            notes: record.notes,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Response for listing profiles
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileListResponse {
    pub clients: Vec<ProfileResponse>,
    pub total: usize,
}

// ============================================================================
// Client Routes
// ============================================================================

/// Client profile routes handler
pub struct ClientRoutes;

impl ClientRoutes {
    /// Create all client profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/clients", get(Self::list_clients))
            .route("/api/clients/me", get(Self::get_own_profile))
            .route("/api/clients/me", put(Self::update_own_profile))
            .route("/api/clients/:client_id", get(Self::get_client))
            .route("/api/clients/:client_id", put(Self::upsert_client))
            .route("/api/clients/:client_id", delete(Self::delete_client))
            .with_state(resources)
    }

    fn authenticate(
        headers: &axum::http::HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth_manager.authenticate_header(auth_header)
    }

    fn manager(resources: &ServerResources) -> ClientProfileManager {
        ClientProfileManager::new(resources.database.pool().clone())
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    /// List the specialist's clients
    async fn list_clients(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        let clients = Self::manager(&resources)
            .list_for_specialist(&auth.user_id.to_string())
            .await?;

        let total = clients.len();
        let response = ProfileListResponse {
            clients: clients.into_iter().map(ProfileResponse::from).collect(),
            total,
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// A client reads their own profile
    async fn get_own_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_client()?;

        let profile = Self::manager(&resources)
            .get(&auth.user_id.to_string())
            .await?
            .ok_or_else(|| AppError::not_found("Profile"))?;

        Ok((StatusCode::OK, Json(ProfileResponse::from(profile))).into_response())
    }

    /// A client updates their self-service fields
    async fn update_own_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<SelfUpdateRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_client()?;

        let updated = Self::manager(&resources)
            .update_self(
                &auth.user_id.to_string(),
                request.weight_kg,
                request.activity_level.as_deref(),
                request.dietary_preference.as_deref(),
            )
            .await?;

        if !updated {
            return Err(AppError::not_found("Profile"));
        }

        Ok((StatusCode::OK, Json(serde_json::json!({"success": true}))).into_response())
    }

    /// A specialist reads one of their clients' profiles
    async fn get_client(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(client_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        let profile = Self::manager(&resources)
            .get_for_specialist(&client_id, &auth.user_id.to_string())
            .await?
            .ok_or_else(|| AppError::not_found("Profile"))?;

        Ok((StatusCode::OK, Json(ProfileResponse::from(profile))).into_response())
    }

    /// A specialist creates or updates a client's profile
    async fn upsert_client(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(client_id): Path<String>,
        Json(request): Json<UpsertProfileRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        if request.display_name.trim().is_empty() {
            return Err(AppError::missing_field("display_name"));
        }

        let manager = Self::manager(&resources);
        let specialist_id = auth.user_id.to_string();

        // A profile owned by another specialist must not be silently re-homed
        if let Some(existing) = manager.get(&client_id).await? {
            if existing.specialist_id != specialist_id {
                return Err(AppError::permission_denied(
                    "Client is coached by another specialist",
                ));
            }
        }

        let input = ClientProfileInput {
            display_name: request.display_name.trim().to_owned(),
            goals: request.goals,
            allergies: request.allergies,
            dietary_preference: request.dietary_preference,
            weekly_budget: request.weekly_budget,
            height_cm: request.height_cm,
            weight_kg: request.weight_kg,
            activity_level: request.activity_level,
            notes: request.notes,
        };

        let profile = manager.upsert(&client_id, &specialist_id, &input).await?;

        Ok((StatusCode::OK, Json(ProfileResponse::from(profile))).into_response())
    }

    /// A specialist removes a client's profile
    async fn delete_client(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(client_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        let deleted = Self::manager(&resources)
            .delete(&client_id, &auth.user_id.to_string())
            .await?;

        if !deleted {
            return Err(AppError::not_found("Profile"));
        }

        Ok((StatusCode::OK, Json(serde_json::json!({"success": true}))).into_response())
    }
}
