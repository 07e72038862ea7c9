// ABOUTME: Database connection management and schema migration for the coaching platform
// ABOUTME: Owns the SQLite pool and the CREATE TABLE migration routine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! # Database Management
//!
//! Connection handling and schema setup for the Nutrio server. Each domain
//! has its own manager (one per module below) that borrows the shared pool;
//! routes construct managers on demand.
//!
//! Uniqueness and ownership invariants live in the schema: owner columns on
//! every table, UNIQUE constraints on natural keys (journal date per client,
//! specialist/client thread pair), and owner-scoped WHERE clauses in every
//! manager query.

pub mod chat;
pub mod clients;
pub mod dishes;
pub mod journal;
pub mod menus;

pub use chat::{ChatManager, MessageRecord, ThreadRecord};
pub use clients::{ClientProfileManager, ClientProfileRecord};
pub use dishes::{DishManager, DishRecord};
pub use journal::{JournalEntryRecord, JournalManager};
pub use menus::{MenuManager, MenuRecord, MenuSlotRecord};

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Database handle owning the SQLite connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration statement fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");

        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") && !in_memory {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        // An in-memory database exists per connection; pin the pool to one
        // connection so every query sees the migrated schema
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(&connection_options)
                .await?
        } else {
            SqlitePool::connect(&connection_options).await?
        };

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Access the underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails.
    pub async fn migrate(&self) -> Result<()> {
        // Client profiles (core + extended fields)
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS client_profiles (
                client_id TEXT PRIMARY KEY,
                specialist_id TEXT NOT NULL,
                display_name TEXT NOT NULL,
                goals TEXT,
                allergies TEXT NOT NULL DEFAULT '[]',
                dietary_preference TEXT,
                weekly_budget REAL,
                height_cm REAL,
                weight_kg REAL,
                activity_level TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_client_profiles_specialist
             ON client_profiles(specialist_id)",
        )
        .execute(&self.pool)
        .await?;

        // Dishes with JSON ingredient/tag lists
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS dishes (
                id TEXT PRIMARY KEY,
                specialist_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                ingredients TEXT NOT NULL DEFAULT '[]',
                kcal REAL,
                protein_g REAL,
                fat_g REAL,
                carbs_g REAL,
                tags TEXT NOT NULL DEFAULT '[]',
                instructions TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_dishes_specialist ON dishes(specialist_id)",
        )
        .execute(&self.pool)
        .await?;

        // Menus: day_count bounds day_index in menu_slots
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS menus (
                id TEXT PRIMARY KEY,
                specialist_id TEXT NOT NULL,
                client_id TEXT,
                title TEXT NOT NULL,
                day_count INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_menus_specialist ON menus(specialist_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_menus_client ON menus(client_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS menu_slots (
                id TEXT PRIMARY KEY,
                menu_id TEXT NOT NULL REFERENCES menus(id) ON DELETE CASCADE,
                day_index INTEGER NOT NULL,
                slot TEXT NOT NULL,
                slot_order INTEGER NOT NULL,
                dish_id TEXT NOT NULL REFERENCES dishes(id),
                UNIQUE(menu_id, day_index, slot)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_menu_slots_menu ON menu_slots(menu_id)",
        )
        .execute(&self.pool)
        .await?;

        // Journal entries: one per client per date
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS journal_entries (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                entry_date TEXT NOT NULL,
                weight_kg REAL,
                mood INTEGER,
                energy INTEGER,
                note TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(client_id, entry_date)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_journal_client_date
             ON journal_entries(client_id, entry_date)",
        )
        .execute(&self.pool)
        .await?;

        // Chat: one thread per specialist/client pair, ordered messages
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chat_threads (
                id TEXT PRIMARY KEY,
                specialist_id TEXT NOT NULL,
                client_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(specialist_id, client_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id TEXT PRIMARY KEY,
                thread_id TEXT NOT NULL REFERENCES chat_threads(id) ON DELETE CASCADE,
                sender_id TEXT NOT NULL,
                sender_role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_thread
             ON chat_messages(thread_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
