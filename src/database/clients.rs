// ABOUTME: Database operations for client profiles and extended profile fields
// ABOUTME: Specialist-managed records with client self-access for their own row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use crate::errors::{AppError, AppResult};

/// Database representation of a client profile
///
/// Core fields come from onboarding; the extended fields (height, weight,
/// activity level, notes) are filled in over time by the specialist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProfileRecord {
    /// Client user ID (from the identity provider)
    pub client_id: String,
    /// Specialist this client is coached by
    pub specialist_id: String,
    /// Display name
    pub display_name: String,
    /// Coaching goals
    pub goals: Option<String>,
    /// Known allergies
    pub allergies: Vec<String>,
    /// Dietary preference (vegetarian, vegan, ...)
    pub dietary_preference: Option<String>,
    /// Weekly food budget in the client's currency
    pub weekly_budget: Option<f64>,
    /// Height in centimeters
    pub height_cm: Option<f64>,
    /// Weight in kilograms
    pub weight_kg: Option<f64>,
    /// Activity level (sedentary, light, moderate, high)
    pub activity_level: Option<String>,
    /// Specialist notes
    pub notes: Option<String>,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

/// Fields accepted when creating or updating a profile
#[derive(Debug, Clone, Default)]
pub struct ClientProfileInput {
    pub display_name: String,
    pub goals: Option<String>,
    pub allergies: Vec<String>,
    pub dietary_preference: Option<String>,
    pub weekly_budget: Option<f64>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<String>,
    pub notes: Option<String>,
}

/// Client profile database operations manager
pub struct ClientProfileManager {
    pool: SqlitePool,
}

impl ClientProfileManager {
    /// Create a new client profile manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(r: &sqlx::sqlite::SqliteRow) -> ClientProfileRecord {
        let allergies: Vec<String> =
            serde_json::from_str(&r.get::<String, _>("allergies")).unwrap_or_default();

        ClientProfileRecord {
            client_id: r.get("client_id"),
            specialist_id: r.get("specialist_id"),
            display_name: r.get("display_name"),
            goals: r.get("goals"),
            allergies,
            dietary_preference: r.get("dietary_preference"),
            weekly_budget: r.get("weekly_budget"),
            height_cm: r.get("height_cm"),
            weight_kg: r.get("weight_kg"),
            activity_level: r.get("activity_level"),
            notes: r.get("notes"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }
    }

    /// Create or replace a client's profile under a specialist
    ///
    /// The upsert keeps `created_at` and the owning specialist stable when
    /// the row already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails.
    pub async fn upsert(
        &self,
        client_id: &str,
        specialist_id: &str,
        input: &ClientProfileInput,
    ) -> AppResult<ClientProfileRecord> {
        let now = chrono::Utc::now().to_rfc3339();
        let allergies = serde_json::to_string(&input.allergies)
            .map_err(|e| AppError::internal(format!("Failed to serialize allergies: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO client_profiles (client_id, specialist_id, display_name, goals,
                                         allergies, dietary_preference, weekly_budget,
                                         height_cm, weight_kg, activity_level, notes,
                                         created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            ON CONFLICT(client_id) DO UPDATE SET
                display_name = excluded.display_name,
                goals = excluded.goals,
                allergies = excluded.allergies,
                dietary_preference = excluded.dietary_preference,
                weekly_budget = excluded.weekly_budget,
                height_cm = excluded.height_cm,
                weight_kg = excluded.weight_kg,
                activity_level = excluded.activity_level,
                notes = excluded.notes,
                updated_at = excluded.updated_at
            ",
        )
        .bind(client_id)
        .bind(specialist_id)
        .bind(&input.display_name)
        .bind(&input.goals)
        .bind(&allergies)
        .bind(&input.dietary_preference)
        .bind(input.weekly_budget)
        .bind(input.height_cm)
        .bind(input.weight_kg)
        .bind(&input.activity_level)
        .bind(&input.notes)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to upsert client profile: {e}")))?;

        self.get(client_id)
            .await?
            .ok_or_else(|| AppError::internal("Profile vanished after upsert"))
    }

    /// Get a profile by client ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get(&self, client_id: &str) -> AppResult<Option<ClientProfileRecord>> {
        let row = sqlx::query(
            r"
            SELECT client_id, specialist_id, display_name, goals, allergies,
                   dietary_preference, weekly_budget, height_cm, weight_kg,
                   activity_level, notes, created_at, updated_at
            FROM client_profiles
            WHERE client_id = $1
            ",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get client profile: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_record))
    }

    /// Get a profile only when it is coached by the given specialist
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_for_specialist(
        &self,
        client_id: &str,
        specialist_id: &str,
    ) -> AppResult<Option<ClientProfileRecord>> {
        let row = sqlx::query(
            r"
            SELECT client_id, specialist_id, display_name, goals, allergies,
                   dietary_preference, weekly_budget, height_cm, weight_kg,
                   activity_level, notes, created_at, updated_at
            FROM client_profiles
            WHERE client_id = $1 AND specialist_id = $2
            ",
        )
        .bind(client_id)
        .bind(specialist_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get client profile: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_record))
    }

    /// List profiles coached by a specialist, alphabetically
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_for_specialist(
        &self,
        specialist_id: &str,
    ) -> AppResult<Vec<ClientProfileRecord>> {
        let rows = sqlx::query(
            r"
            SELECT client_id, specialist_id, display_name, goals, allergies,
                   dietary_preference, weekly_budget, height_cm, weight_kg,
                   activity_level, notes, created_at, updated_at
            FROM client_profiles
            WHERE specialist_id = $1
            ORDER BY display_name ASC
            ",
        )
        .bind(specialist_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list client profiles: {e}")))?;

        Ok(rows.iter().map(Self::row_to_record).collect())
    }

    /// Client self-service update of the mutable extended fields
    ///
    /// Clients may adjust their own weight, activity level, and dietary
    /// preference; everything else stays specialist-managed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn update_self(
        &self,
        client_id: &str,
        weight_kg: Option<f64>,
        activity_level: Option<&str>,
        dietary_preference: Option<&str>,
    ) -> AppResult<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r"
            UPDATE client_profiles
            SET weight_kg = COALESCE($1, weight_kg),
                activity_level = COALESCE($2, activity_level),
                dietary_preference = COALESCE($3, dietary_preference),
                updated_at = $4
            WHERE client_id = $5
            ",
        )
        .bind(weight_kg)
        .bind(activity_level)
        .bind(dietary_preference)
        .bind(&now)
        .bind(client_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update client profile: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a profile with owner scoping; returns false when no row matched
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, client_id: &str, specialist_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM client_profiles WHERE client_id = $1 AND specialist_id = $2",
        )
        .bind(client_id)
        .bind(specialist_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete client profile: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
