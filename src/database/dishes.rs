// ABOUTME: Database operations for dishes owned by specialists
// ABOUTME: CRUD with owner scoping plus menu-mediated read access for clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{Ingredient, MacroNutrients};

/// Database representation of a dish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishRecord {
    /// Unique dish ID
    pub id: String,
    /// Specialist who owns the dish
    pub specialist_id: String,
    /// Dish title
    pub title: String,
    /// Free-text description
    pub description: Option<String>,
    /// Ingredient lines
    pub ingredients: Vec<Ingredient>,
    /// Macro-nutrient estimate per serving
    pub macros: MacroNutrients,
    /// Tags (e.g. vegetarian, high-protein)
    pub tags: Vec<String>,
    /// Preparation instructions
    pub instructions: Option<String>,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

/// Fields accepted when creating or updating a dish
#[derive(Debug, Clone, Default)]
pub struct DishInput {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub macros: MacroNutrients,
    pub tags: Vec<String>,
    pub instructions: Option<String>,
}

/// Dish database operations manager
pub struct DishManager {
    pool: SqlitePool,
}

impl DishManager {
    /// Create a new dish manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(r: &sqlx::sqlite::SqliteRow) -> DishRecord {
        let ingredients: Vec<Ingredient> =
            serde_json::from_str(&r.get::<String, _>("ingredients")).unwrap_or_default();
        let tags: Vec<String> =
            serde_json::from_str(&r.get::<String, _>("tags")).unwrap_or_default();

        DishRecord {
            id: r.get("id"),
            specialist_id: r.get("specialist_id"),
            title: r.get("title"),
            description: r.get("description"),
            ingredients,
            macros: MacroNutrients {
                kcal: r.get("kcal"),
                protein_g: r.get("protein_g"),
                fat_g: r.get("fat_g"),
                carbs_g: r.get("carbs_g"),
            },
            tags,
            instructions: r.get("instructions"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }
    }

    /// Create a dish owned by a specialist
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails.
    pub async fn create(&self, specialist_id: &str, input: &DishInput) -> AppResult<DishRecord> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let ingredients = serde_json::to_string(&input.ingredients)
            .map_err(|e| AppError::internal(format!("Failed to serialize ingredients: {e}")))?;
        let tags = serde_json::to_string(&input.tags)
            .map_err(|e| AppError::internal(format!("Failed to serialize tags: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO dishes (id, specialist_id, title, description, ingredients,
                                kcal, protein_g, fat_g, carbs_g, tags, instructions,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            ",
        )
        .bind(&id)
        .bind(specialist_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&ingredients)
        .bind(input.macros.kcal)
        .bind(input.macros.protein_g)
        .bind(input.macros.fat_g)
        .bind(input.macros.carbs_g)
        .bind(&tags)
        .bind(&input.instructions)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create dish: {e}")))?;

        Ok(DishRecord {
            id,
            specialist_id: specialist_id.to_owned(),
            title: input.title.clone(),
            description: input.description.clone(),
            ingredients: input.ingredients.clone(),
            macros: input.macros,
            tags: input.tags.clone(),
            instructions: input.instructions.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a dish by ID with owner scoping
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get(&self, dish_id: &str, specialist_id: &str) -> AppResult<Option<DishRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, specialist_id, title, description, ingredients,
                   kcal, protein_g, fat_g, carbs_g, tags, instructions,
                   created_at, updated_at
            FROM dishes
            WHERE id = $1 AND specialist_id = $2
            ",
        )
        .bind(dish_id)
        .bind(specialist_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get dish: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_record))
    }

    /// Get a dish a client can see: it must be referenced by one of the
    /// client's assigned menus
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_for_client(
        &self,
        dish_id: &str,
        client_id: &str,
    ) -> AppResult<Option<DishRecord>> {
        let row = sqlx::query(
            r"
            SELECT DISTINCT d.id, d.specialist_id, d.title, d.description, d.ingredients,
                   d.kcal, d.protein_g, d.fat_g, d.carbs_g, d.tags, d.instructions,
                   d.created_at, d.updated_at
            FROM dishes d
            JOIN menu_slots s ON s.dish_id = d.id
            JOIN menus m ON m.id = s.menu_id
            WHERE d.id = $1 AND m.client_id = $2
            ",
        )
        .bind(dish_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get dish for client: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_record))
    }

    /// List dishes owned by a specialist, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list(
        &self,
        specialist_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<DishRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, specialist_id, title, description, ingredients,
                   kcal, protein_g, fat_g, carbs_g, tags, instructions,
                   created_at, updated_at
            FROM dishes
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
        .map_err(|e| AppError::database(format!("Failed to list dishes: {e}")))?;

        Ok(rows.iter().map(Self::row_to_record).collect())
    }

    /// Update a dish with owner scoping; returns false when no row matched
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails.
    pub async fn update(
        &self,
        dish_id: &str,
        specialist_id: &str,
        input: &DishInput,
    ) -> AppResult<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let ingredients = serde_json::to_string(&input.ingredients)
            .map_err(|e| AppError::internal(format!("Failed to serialize ingredients: {e}")))?;
        let tags = serde_json::to_string(&input.tags)
            .map_err(|e| AppError::internal(format!("Failed to serialize tags: {e}")))?;

        let result = sqlx::query(
            r"
            UPDATE dishes
            SET title = $1, description = $2, ingredients = $3,
                kcal = $4, protein_g = $5, fat_g = $6, carbs_g = $7,
                tags = $8, instructions = $9, updated_at = $10
            WHERE id = $11 AND specialist_id = $12
            ",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&ingredients)
        .bind(input.macros.kcal)
        .bind(input.macros.protein_g)
        .bind(input.macros.fat_g)
        .bind(input.macros.carbs_g)
        .bind(&tags)
        .bind(&input.instructions)
        .bind(&now)
        .bind(dish_id)
        .bind(specialist_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update dish: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a dish with owner scoping; returns false when no row matched
    ///
    /// Fails with a conflict when the dish is still referenced by a menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, dish_id: &str, specialist_id: &str) -> AppResult<bool> {
        let referenced = sqlx::query(
            "SELECT COUNT(*) as count FROM menu_slots WHERE dish_id = $1",
        )
        .bind(dish_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check dish references: {e}")))?;

        let count: i64 = referenced.get("count");
        if count > 0 {
            return Err(AppError::new(
                crate::errors::ErrorCode::ResourceLocked,
                "Dish is referenced by a menu and cannot be deleted",
            ));
        }

        let result = sqlx::query("DELETE FROM dishes WHERE id = $1 AND specialist_id = $2")
            .bind(dish_id)
            .bind(specialist_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete dish: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
