// ABOUTME: Health check route for liveness probes and database reachability
// ABOUTME: Returns service status, version, and a database ping result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;

use crate::resources::ServerResources;

/// Health route handler
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create health routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::health))
            .with_state(resources)
    }

    /// Health check endpoint
    async fn health(State(resources): State<Arc<ServerResources>>) -> impl IntoResponse {
        let db_ok = sqlx::query("SELECT 1")
            .fetch_one(resources.database.pool())
            .await
            .is_ok();

        Json(json!({
            "status": if db_ok { "ok" } else { "degraded" },
            "service": "nutrio-server",
            "version": env!("CARGO_PKG_VERSION"),
            "database": if db_ok { "ok" } else { "unreachable" },
        }))
    }
}
