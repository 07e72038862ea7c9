// ABOUTME: Database operations for specialist/client messaging threads
// ABOUTME: Pair-unique threads with ordered messages and participant scoping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::Role;

/// Database representation of a chat thread
///
/// Exactly one thread exists per specialist/client pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadRecord {
    /// Unique thread ID
    pub id: String,
    /// Specialist participant
    pub specialist_id: String,
    /// Client participant
    pub client_id: String,
    /// When the thread was created (ISO 8601)
    pub created_at: String,
    /// When the last message arrived (ISO 8601)
    pub updated_at: String,
}

/// Database representation of a chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Unique message ID
    pub id: String,
    /// Thread this message belongs to
    pub thread_id: String,
    /// Sender user ID
    pub sender_id: String,
    /// Sender role (specialist or client)
    pub sender_role: String,
    /// Message content
    pub content: String,
    /// When the message was created (ISO 8601)
    pub created_at: String,
}

/// Chat database operations manager
pub struct ChatManager {
    pool: SqlitePool,
}

impl ChatManager {
    /// Create a new chat manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_thread(r: &sqlx::sqlite::SqliteRow) -> ThreadRecord {
        ThreadRecord {
            id: r.get("id"),
            specialist_id: r.get("specialist_id"),
            client_id: r.get("client_id"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }
    }

    fn row_to_message(r: &sqlx::sqlite::SqliteRow) -> MessageRecord {
        MessageRecord {
            id: r.get("id"),
            thread_id: r.get("thread_id"),
            sender_id: r.get("sender_id"),
            sender_role: r.get("sender_role"),
            content: r.get("content"),
            created_at: r.get("created_at"),
        }
    }

    /// Get or create the thread for a specialist/client pair
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_or_create_thread(
        &self,
        specialist_id: &str,
        client_id: &str,
    ) -> AppResult<ThreadRecord> {
        if let Some(existing) = self.find_thread(specialist_id, client_id).await? {
            return Ok(existing);
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        // ON CONFLICT DO NOTHING tolerates a concurrent create of the same pair
        sqlx::query(
            r"
            INSERT INTO chat_threads (id, specialist_id, client_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT(specialist_id, client_id) DO NOTHING
            ",
        )
        .bind(&id)
        .bind(specialist_id)
        .bind(client_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create thread: {e}")))?;

        self.find_thread(specialist_id, client_id)
            .await?
            .ok_or_else(|| AppError::internal("Thread vanished after create"))
    }

    /// Find the thread for a specialist/client pair
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn find_thread(
        &self,
        specialist_id: &str,
        client_id: &str,
    ) -> AppResult<Option<ThreadRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, specialist_id, client_id, created_at, updated_at
            FROM chat_threads
            WHERE specialist_id = $1 AND client_id = $2
            ",
        )
        .bind(specialist_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find thread: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_thread))
    }

    /// Get a thread by ID when the given user participates in it
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_thread_for_participant(
        &self,
        thread_id: &str,
        user_id: &str,
    ) -> AppResult<Option<ThreadRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, specialist_id, client_id, created_at, updated_at
            FROM chat_threads
            WHERE id = $1 AND (specialist_id = $2 OR client_id = $2)
            ",
        )
        .bind(thread_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get thread: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_thread))
    }

    /// List threads a user participates in, most recently active first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_threads(&self, user_id: &str) -> AppResult<Vec<ThreadRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, specialist_id, client_id, created_at, updated_at
            FROM chat_threads
            WHERE specialist_id = $1 OR client_id = $1
            ORDER BY updated_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list threads: {e}")))?;

        Ok(rows.iter().map(Self::row_to_thread).collect())
    }

    /// Append a message to a thread the sender participates in
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the thread does not exist or the
    /// sender is not a participant, and a database error otherwise.
    pub async fn add_message(
        &self,
        thread_id: &str,
        sender_id: &str,
        sender_role: Role,
        content: &str,
    ) -> AppResult<MessageRecord> {
        let thread = self
            .get_thread_for_participant(thread_id, sender_id)
            .await?
            .ok_or_else(|| AppError::not_found("Thread"))?;

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO chat_messages (id, thread_id, sender_id, sender_role, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&id)
        .bind(&thread.id)
        .bind(sender_id)
        .bind(sender_role.as_str())
        .bind(content)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add message: {e}")))?;

        sqlx::query("UPDATE chat_threads SET updated_at = $1 WHERE id = $2")
            .bind(&now)
            .bind(&thread.id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to touch thread: {e}")))?;

        Ok(MessageRecord {
            id,
            thread_id: thread.id,
            sender_id: sender_id.to_owned(),
            sender_role: sender_role.as_str().to_owned(),
            content: content.to_owned(),
            created_at: now,
        })
    }

    /// Get messages for a thread in chronological order
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_messages(
        &self,
        thread_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<MessageRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, thread_id, sender_id, sender_role, content, created_at
            FROM chat_messages
            WHERE thread_id = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(thread_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get messages: {e}")))?;

        Ok(rows.iter().map(Self::row_to_message).collect())
    }

    /// Get message count for a thread
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_message_count(&self, thread_id: &str) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM chat_messages WHERE thread_id = $1")
            .bind(thread_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get message count: {e}")))?;

        Ok(row.get("count"))
    }
}
