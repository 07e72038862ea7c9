// ABOUTME: Journal route handlers for client check-in entries
// ABOUTME: Clients write their own entries; specialists read their clients' history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! Journal routes
//!
//! One entry per client per date. Clients upsert and delete their own
//! entries; a specialist can read the history of any client they coach.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::AuthResult;
use crate::database::clients::ClientProfileManager;
use crate::database::journal::JournalManager;
use crate::database::JournalEntryRecord;
use crate::errors::AppError;
use crate::resources::ServerResources;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create or update the entry for a date
#[derive(Debug, Deserialize)]
pub struct UpsertEntryRequest {
    /// Entry date (YYYY-MM-DD)
    pub entry_date: String,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Mood on a 1-5 scale
    #[serde(default)]
    pub mood: Option<i64>,
    /// Energy on a 1-5 scale
    #[serde(default)]
    pub energy: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Response for a journal entry
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryResponse {
    pub id: String,
    pub entry_date: String,
    pub weight_kg: Option<f64>,
    pub mood: Option<i64>,
    pub energy: Option<i64>,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<JournalEntryRecord> for EntryResponse {
    fn from(record: JournalEntryRecord) -> Self {
        Self {
            id: record.id,
            entry_date: record.entry_date,
            weight_kg: record.weight_kg,
            mood: record.mood,
            energy: record.energy,
            note: record.note,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Response for an entry listing
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryListResponse {
    pub entries: Vec<EntryResponse>,
    pub total: usize,
}

/// Query parameters for a date-range listing
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// Inclusive start date (YYYY-MM-DD)
    pub from: String,
    /// Inclusive end date (YYYY-MM-DD)
    pub to: String,
}

// ============================================================================
// Journal Routes
// ============================================================================

/// Journal routes handler
pub struct JournalRoutes;

impl JournalRoutes {
    /// Create all journal routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/journal", put(Self::upsert_entry))
            .route("/api/journal", get(Self::list_own_entries))
            .route("/api/journal/:entry_date", delete(Self::delete_entry))
            .route(
                "/api/clients/:client_id/journal",
                get(Self::list_client_entries),
            )
            .with_state(resources)
    }

    fn authenticate(
        headers: &axum::http::HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth_manager.authenticate_header(auth_header)
    }

    fn manager(resources: &ServerResources) -> JournalManager {
        JournalManager::new(resources.database.pool().clone())
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    /// A client creates or updates the entry for a date
    async fn upsert_entry(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<UpsertEntryRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_client()?;

        let entry = Self::manager(&resources)
            .upsert(
                &auth.user_id.to_string(),
                &request.entry_date,
                request.weight_kg,
                request.mood,
                request.energy,
                request.note.as_deref(),
            )
            .await?;

        Ok((StatusCode::OK, Json(EntryResponse::from(entry))).into_response())
    }

    /// A client lists their own entries in a date range
    async fn list_own_entries(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(query): Query<RangeQuery>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_client()?;

        let entries = Self::manager(&resources)
            .list_range(&auth.user_id.to_string(), &query.from, &query.to)
            .await?;

        let total = entries.len();
        let response = EntryListResponse {
            entries: entries.into_iter().map(EntryResponse::from).collect(),
            total,
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// A client deletes the entry for a date
    async fn delete_entry(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(entry_date): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_client()?;

        let deleted = Self::manager(&resources)
            .delete(&auth.user_id.to_string(), &entry_date)
            .await?;

        if !deleted {
            return Err(AppError::not_found("Journal entry"));
        }

        Ok((StatusCode::OK, Json(serde_json::json!({"success": true}))).into_response())
    }

    /// A specialist reads a coached client's entries in a date range
    async fn list_client_entries(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(client_id): Path<String>,
        Query(query): Query<RangeQuery>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        auth.require_specialist()?;

        // Coaching link check: the client must belong to this specialist
        let profiles = ClientProfileManager::new(resources.database.pool().clone());
        profiles
            .get_for_specialist(&client_id, &auth.user_id.to_string())
            .await?
            .ok_or_else(|| AppError::not_found("Client"))?;

        let entries = Self::manager(&resources)
            .list_range(&client_id, &query.from, &query.to)
            .await?;

        let total = entries.len();
        let response = EntryListResponse {
            entries: entries.into_iter().map(EntryResponse::from).collect(),
            total,
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
