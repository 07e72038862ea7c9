// ABOUTME: Database operations for multi-day menus and their meal slots
// ABOUTME: Handles menu CRUD, slot assignment, and client visibility
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::MealSlot;

/// Database representation of a menu header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuRecord {
    /// Unique menu ID
    pub id: String,
    /// Specialist who owns the menu
    pub specialist_id: String,
    /// Client this menu is assigned to, if any
    pub client_id: Option<String>,
    /// Menu title
    pub title: String,
    /// Number of days this plan covers
    pub day_count: i64,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

/// One assigned slot within a menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuSlotRecord {
    /// Zero-based day index within the plan
    pub day_index: i64,
    /// Meal slot
    pub slot: MealSlot,
    /// Referenced dish ID
    pub dish_id: String,
    /// Dish title, joined in for listing convenience
    pub dish_title: String,
}

/// Menu database operations manager
pub struct MenuManager {
    pool: SqlitePool,
}

impl MenuManager {
    /// Create a new menu manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_menu(r: &sqlx::sqlite::SqliteRow) -> MenuRecord {
        MenuRecord {
            id: r.get("id"),
            specialist_id: r.get("specialist_id"),
            client_id: r.get("client_id"),
            title: r.get("title"),
            day_count: r.get("day_count"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }
    }

    /// Create a menu owned by a specialist
    ///
    /// # Errors
    ///
    /// Returns an error if `day_count` is out of range or the database
    /// operation fails.
    pub async fn create(
        &self,
        specialist_id: &str,
        title: &str,
        day_count: i64,
        client_id: Option<&str>,
    ) -> AppResult<MenuRecord> {
        if !(1..=31).contains(&day_count) {
            return Err(AppError::new(
                crate::errors::ErrorCode::ValueOutOfRange,
                "day_count must be between 1 and 31",
            ));
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO menus (id, specialist_id, client_id, title, day_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ",
        )
        .bind(&id)
        .bind(specialist_id)
        .bind(client_id)
        .bind(title)
        .bind(day_count)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create menu: {e}")))?;

        Ok(MenuRecord {
            id,
            specialist_id: specialist_id.to_owned(),
            client_id: client_id.map(ToOwned::to_owned),
            title: title.to_owned(),
            day_count,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a menu header with owner scoping
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get(&self, menu_id: &str, specialist_id: &str) -> AppResult<Option<MenuRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, specialist_id, client_id, title, day_count, created_at, updated_at
            FROM menus
            WHERE id = $1 AND specialist_id = $2
            ",
        )
        .bind(menu_id)
        .bind(specialist_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get menu: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_menu))
    }

    /// Get a menu assigned to a client
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_for_client(
        &self,
        menu_id: &str,
        client_id: &str,
    ) -> AppResult<Option<MenuRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, specialist_id, client_id, title, day_count, created_at, updated_at
            FROM menus
            WHERE id = $1 AND client_id = $2
            ",
        )
        .bind(menu_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get menu for client: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_menu))
    }

    /// List menus owned by a specialist, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list(
        &self,
        specialist_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<MenuRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, specialist_id, client_id, title, day_count, created_at, updated_at
            FROM menus
            WHERE specialist_id = $1
            ORDER BY updated_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(specialist_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list menus: {e}")))?;

        Ok(rows.iter().map(Self::row_to_menu).collect())
    }

    /// List menus assigned to a client, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_for_client(&self, client_id: &str) -> AppResult<Vec<MenuRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, specialist_id, client_id, title, day_count, created_at, updated_at
            FROM menus
            WHERE client_id = $1
            ORDER BY updated_at DESC
            ",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list client menus: {e}")))?;

        Ok(rows.iter().map(Self::row_to_menu).collect())
    }

    /// Update menu title and client assignment; returns false when no row matched
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn update(
        &self,
        menu_id: &str,
        specialist_id: &str,
        title: &str,
        client_id: Option<&str>,
    ) -> AppResult<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r"
            UPDATE menus
            SET title = $1, client_id = $2, updated_at = $3
            WHERE id = $4 AND specialist_id = $5
            ",
        )
        .bind(title)
        .bind(client_id)
        .bind(&now)
        .bind(menu_id)
        .bind(specialist_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update menu: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a menu and its slots; returns false when no row matched
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, menu_id: &str, specialist_id: &str) -> AppResult<bool> {
        // Slots go first: SQLite only cascades when foreign keys are enabled
        sqlx::query(
            "DELETE FROM menu_slots WHERE menu_id IN
             (SELECT id FROM menus WHERE id = $1 AND specialist_id = $2)",
        )
        .bind(menu_id)
        .bind(specialist_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete menu slots: {e}")))?;

        let result = sqlx::query("DELETE FROM menus WHERE id = $1 AND specialist_id = $2")
            .bind(menu_id)
            .bind(specialist_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete menu: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Assign a dish to a slot, replacing any existing assignment
    ///
    /// The dish must belong to the same specialist as the menu and the day
    /// index must fall inside the plan.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the menu or dish is not visible to the
    /// specialist, `ValueOutOfRange` for a day outside the plan, and a
    /// database error otherwise.
    pub async fn set_slot(
        &self,
        menu_id: &str,
        specialist_id: &str,
        day_index: i64,
        slot: MealSlot,
        dish_id: &str,
    ) -> AppResult<()> {
        let menu = self
            .get(menu_id, specialist_id)
            .await?
            .ok_or_else(|| AppError::not_found("Menu"))?;

        if !(0..menu.day_count).contains(&day_index) {
            return Err(AppError::new(
                crate::errors::ErrorCode::ValueOutOfRange,
                format!(
                    "day_index {day_index} is outside the plan (0..{})",
                    menu.day_count
                ),
            ));
        }

        // Ownership check: the referenced dish must belong to the menu owner
        let dish = sqlx::query("SELECT id FROM dishes WHERE id = $1 AND specialist_id = $2")
            .bind(dish_id)
            .bind(specialist_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check dish owner: {e}")))?;

        if dish.is_none() {
            return Err(AppError::not_found("Dish"));
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO menu_slots (id, menu_id, day_index, slot, slot_order, dish_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT(menu_id, day_index, slot)
            DO UPDATE SET dish_id = excluded.dish_id
            ",
        )
        .bind(&id)
        .bind(menu_id)
        .bind(day_index)
        .bind(slot.as_str())
        .bind(slot.order())
        .bind(dish_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to set menu slot: {e}")))?;

        sqlx::query("UPDATE menus SET updated_at = $1 WHERE id = $2")
            .bind(&now)
            .bind(menu_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to touch menu: {e}")))?;

        Ok(())
    }

    /// Clear a slot; returns false when the slot was empty
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn clear_slot(
        &self,
        menu_id: &str,
        specialist_id: &str,
        day_index: i64,
        slot: MealSlot,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM menu_slots
            WHERE menu_id IN (SELECT id FROM menus WHERE id = $1 AND specialist_id = $2)
              AND day_index = $3 AND slot = $4
            ",
        )
        .bind(menu_id)
        .bind(specialist_id)
        .bind(day_index)
        .bind(slot.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear menu slot: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch all assigned slots of a menu in day/slot order
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn slots(&self, menu_id: &str) -> AppResult<Vec<MenuSlotRecord>> {
        let rows = sqlx::query(
            r"
            SELECT s.day_index, s.slot, s.dish_id, d.title as dish_title
            FROM menu_slots s
            JOIN dishes d ON d.id = s.dish_id
            WHERE s.menu_id = $1
            ORDER BY s.day_index ASC, s.slot_order ASC
            ",
        )
        .bind(menu_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list menu slots: {e}")))?;

        let slots = rows
            .iter()
            .filter_map(|r| {
                let slot_str: String = r.get("slot");
                MealSlot::from_str_opt(&slot_str).map(|slot| MenuSlotRecord {
                    day_index: r.get("day_index"),
                    slot,
                    dish_id: r.get("dish_id"),
                    dish_title: r.get("dish_title"),
                })
            })
            .collect();

        Ok(slots)
    }
}
