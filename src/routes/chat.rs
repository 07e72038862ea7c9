// ABOUTME: Chat route handlers for the specialist/client messaging thread
// ABOUTME: Thread discovery, creation, and ordered message append/listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! Chat routes
//!
//! Each specialist/client pair shares exactly one thread. Specialists open
//! threads with clients they coach; clients open the thread with their own
//! specialist. Realtime delivery is out of scope; clients poll the message
//! listing.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::AuthResult;
use crate::database::chat::ChatManager;
use crate::database::clients::ClientProfileManager;
use crate::database::{MessageRecord, ThreadRecord};
use crate::errors::AppError;
use crate::models::Role;
use crate::resources::ServerResources;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to open (or fetch) a thread
#[derive(Debug, Deserialize, Default)]
pub struct OpenThreadRequest {
    /// Client to open the thread with; required for specialists, ignored for
    /// clients (their thread is with their own specialist)
    #[serde(default)]
    pub client_id: Option<String>,
}

/// Request to send a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Message content
    pub content: String,
}

/// Response for a thread
#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadResponse {
    pub id: String,
    pub specialist_id: String,
    pub client_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ThreadRecord> for ThreadResponse {
    fn from(record: ThreadRecord) -> Self {
        Self {
            id: record.id,
            specialist_id: record.specialist_id,
            client_id: record.client_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Response for listing threads
#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadListResponse {
    pub threads: Vec<ThreadResponse>,
    pub total: usize,
}

/// Response for a message
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub thread_id: String,
    pub sender_id: String,
    pub sender_role: String,
    pub content: String,
    pub created_at: String,
}

impl From<MessageRecord> for MessageResponse {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            thread_id: record.thread_id,
            sender_id: record.sender_id,
            sender_role: record.sender_role,
            content: record.content,
            created_at: record.created_at,
        }
    }
}

/// Response for a message listing
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageResponse>,
    pub total: i64,
}

/// Query parameters for listing messages
#[derive(Debug, Deserialize, Default)]
pub struct ListMessagesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

const fn default_limit() -> i64 {
    100
}

// ============================================================================
// Chat Routes
// ============================================================================

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/chat/threads", post(Self::open_thread))
            .route("/api/chat/threads", get(Self::list_threads))
            .route(
                "/api/chat/threads/:thread_id/messages",
                get(Self::get_messages),
            )
            .route(
                "/api/chat/threads/:thread_id/messages",
                post(Self::send_message),
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

    fn manager(resources: &ServerResources) -> ChatManager {
        ChatManager::new(resources.database.pool().clone())
    }

    /// Resolve the specialist/client pair for the caller
    ///
    /// Specialists name a coached client; clients are paired with the
    /// specialist on their profile.
    async fn resolve_pair(
        auth: AuthResult,
        request: &OpenThreadRequest,
        resources: &ServerResources,
    ) -> Result<(String, String), AppError> {
        let profiles = ClientProfileManager::new(resources.database.pool().clone());
        let user_id = auth.user_id.to_string();

        match auth.role {
            Role::Specialist => {
                let client_id = request
                    .client_id
                    .as_deref()
                    .ok_or_else(|| AppError::missing_field("client_id"))?;

                profiles
                    .get_for_specialist(client_id, &user_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Client"))?;

                Ok((user_id, client_id.to_owned()))
            }
            Role::Client => {
                let profile = profiles
                    .get(&user_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Profile"))?;

                Ok((profile.specialist_id, user_id))
            }
        }
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    /// Open (or fetch) the thread for a specialist/client pair
    async fn open_thread(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<OpenThreadRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let (specialist_id, client_id) =
            Self::resolve_pair(auth, &request, &resources).await?;

        let thread = Self::manager(&resources)
            .get_or_create_thread(&specialist_id, &client_id)
            .await?;

        Ok((StatusCode::CREATED, Json(ThreadResponse::from(thread))).into_response())
    }

    /// List the caller's threads, most recently active first
    async fn list_threads(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;

        let threads = Self::manager(&resources)
            .list_threads(&auth.user_id.to_string())
            .await?;

        let total = threads.len();
        let response = ThreadListResponse {
            threads: threads.into_iter().map(ThreadResponse::from).collect(),
            total,
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Get messages for a thread the caller participates in
    async fn get_messages(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(thread_id): Path<String>,
        Query(query): Query<ListMessagesQuery>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let manager = Self::manager(&resources);

        let thread = manager
            .get_thread_for_participant(&thread_id, &auth.user_id.to_string())
            .await?
            .ok_or_else(|| AppError::not_found("Thread"))?;

        let messages = manager
            .get_messages(&thread.id, query.limit, query.offset)
            .await?;
        let total = manager.get_message_count(&thread.id).await?;

        let response = MessageListResponse {
            messages: messages.into_iter().map(MessageResponse::from).collect(),
            total,
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Append a message to a thread the caller participates in
    async fn send_message(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(thread_id): Path<String>,
        Json(request): Json<SendMessageRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;

        if request.content.trim().is_empty() {
            return Err(AppError::missing_field("content"));
        }

        let message = Self::manager(&resources)
            .add_message(
                &thread_id,
                &auth.user_id.to_string(),
                auth.role,
                request.content.trim(),
            )
            .await?;

        Ok((StatusCode::CREATED, Json(MessageResponse::from(message))).into_response())
    }
}
