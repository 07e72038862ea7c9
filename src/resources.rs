// ABOUTME: Shared server resources passed to every route handler
// ABOUTME: Bundles the database, auth manager, LLM provider, and config behind Arcs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! Shared server state
//!
//! One [`ServerResources`] is built at startup and cloned into each router as
//! an `Arc`. Everything inside is either immutable or internally pooled, so
//! handlers share it without locking.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::llm::LlmProvider;

/// Shared resources for all route handlers
pub struct ServerResources {
    /// Database handle with the connection pool
    pub database: Arc<Database>,
    /// Bearer-token validator
    pub auth_manager: Arc<AuthManager>,
    /// Chat-completion provider for the drafting assistant
    pub llm: Arc<dyn LlmProvider>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(
        database: Database,
        auth_manager: AuthManager,
        llm: Arc<dyn LlmProvider>,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            database: Arc::new(database),
            auth_manager: Arc::new(auth_manager),
            llm,
            config,
        }
    }
}
