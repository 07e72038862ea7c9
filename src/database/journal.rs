// ABOUTME: Database operations for client journal entries (weight, mood, energy)
// ABOUTME: Date-keyed upserts with client ownership and specialist read access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Database representation of a journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntryRecord {
    /// Unique entry ID
    pub id: String,
    /// Client who wrote the entry
    pub client_id: String,
    /// Entry date (YYYY-MM-DD); one entry per client per date
    pub entry_date: String,
    /// Morning weight in kilograms
    pub weight_kg: Option<f64>,
    /// Mood on a 1-5 scale
    pub mood: Option<i64>,
    /// Energy on a 1-5 scale
    pub energy: Option<i64>,
    /// Free-text note
    pub note: Option<String>,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

/// Journal database operations manager
pub struct JournalManager {
    pool: SqlitePool,
}

impl JournalManager {
    /// Create a new journal manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(r: &sqlx::sqlite::SqliteRow) -> JournalEntryRecord {
        JournalEntryRecord {
            id: r.get("id"),
            client_id: r.get("client_id"),
            entry_date: r.get("entry_date"),
            weight_kg: r.get("weight_kg"),
            mood: r.get("mood"),
            energy: r.get("energy"),
            note: r.get("note"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }
    }

    /// Validate a 1-5 scale value
    fn check_scale(name: &str, value: Option<i64>) -> AppResult<()> {
        if let Some(v) = value {
            if !(1..=5).contains(&v) {
                return Err(AppError::new(
                    crate::errors::ErrorCode::ValueOutOfRange,
                    format!("{name} must be between 1 and 5"),
                ));
            }
        }
        Ok(())
    }

    /// Create or update the entry for a client and date
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` for mood/energy outside 1-5, `InvalidInput`
    /// for a malformed date, and a database error otherwise.
    pub async fn upsert(
        &self,
        client_id: &str,
        entry_date: &str,
        weight_kg: Option<f64>,
        mood: Option<i64>,
        energy: Option<i64>,
        note: Option<&str>,
    ) -> AppResult<JournalEntryRecord> {
        if chrono::NaiveDate::parse_from_str(entry_date, "%Y-%m-%d").is_err() {
            return Err(AppError::invalid_input(
                "entry_date must be formatted as YYYY-MM-DD",
            ));
        }
        Self::check_scale("mood", mood)?;
        Self::check_scale("energy", energy)?;

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO journal_entries (id, client_id, entry_date, weight_kg, mood, energy,
                                         note, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            ON CONFLICT(client_id, entry_date) DO UPDATE SET
                weight_kg = excluded.weight_kg,
                mood = excluded.mood,
                energy = excluded.energy,
                note = excluded.note,
                updated_at = excluded.updated_at
            ",
        )
        .bind(&id)
        .bind(client_id)
        .bind(entry_date)
        .bind(weight_kg)
        .bind(mood)
        .bind(energy)
        .bind(note)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to upsert journal entry: {e}")))?;

        self.get(client_id, entry_date)
            .await?
            .ok_or_else(|| AppError::internal("Journal entry vanished after upsert"))
    }

    /// Get the entry for a client and date
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get(
        &self,
        client_id: &str,
        entry_date: &str,
    ) -> AppResult<Option<JournalEntryRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, client_id, entry_date, weight_kg, mood, energy, note,
                   created_at, updated_at
            FROM journal_entries
            WHERE client_id = $1 AND entry_date = $2
            ",
        )
        .bind(client_id)
        .bind(entry_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get journal entry: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_record))
    }

    /// List entries for a client in a date range, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_range(
        &self,
        client_id: &str,
        from: &str,
        to: &str,
    ) -> AppResult<Vec<JournalEntryRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, client_id, entry_date, weight_kg, mood, energy, note,
                   created_at, updated_at
            FROM journal_entries
            WHERE client_id = $1 AND entry_date >= $2 AND entry_date <= $3
            ORDER BY entry_date ASC
            ",
        )
        .bind(client_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list journal entries: {e}")))?;

        Ok(rows.iter().map(Self::row_to_record).collect())
    }

    /// Delete the entry for a date; returns false when no row matched
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, client_id: &str, entry_date: &str) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM journal_entries WHERE client_id = $1 AND entry_date = $2")
                .bind(client_id)
                .bind(entry_date)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to delete journal entry: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
