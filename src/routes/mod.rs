// ABOUTME: Route module organization for the Nutrio server HTTP endpoints
// ABOUTME: One module per domain plus the combined application router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! Route modules for the Nutrio server
//!
//! Each domain module contains route definitions and thin handler functions
//! that delegate to the database managers and the LLM layer.

/// Drafting assistant (LLM proxy) routes
pub mod assistant;
/// Specialist/client messaging routes
pub mod chat;
/// Client profile routes
pub mod clients;
/// Dish CRUD routes
pub mod dishes;
/// Health check routes
pub mod health;
/// Journal entry routes
pub mod journal;
/// Menu and meal-slot routes
pub mod menus;

pub use assistant::AssistantRoutes;
pub use chat::ChatRoutes;
pub use clients::ClientRoutes;
pub use dishes::DishRoutes;
pub use health::HealthRoutes;
pub use journal::JournalRoutes;
pub use menus::MenuRoutes;

use axum::Router;
use std::sync::Arc;

use crate::resources::ServerResources;

/// Build the complete application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(DishRoutes::routes(resources.clone()))
        .merge(MenuRoutes::routes(resources.clone()))
        .merge(ClientRoutes::routes(resources.clone()))
        .merge(JournalRoutes::routes(resources.clone()))
        .merge(ChatRoutes::routes(resources.clone()))
        .merge(AssistantRoutes::routes(resources))
}
