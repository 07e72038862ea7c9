// ABOUTME: Main library entry point for the Nutrio coaching platform backend
// ABOUTME: Exposes REST routes for dishes, menus, clients, journal, chat, and LLM drafting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

#![deny(unsafe_code)]

//! # Nutrio Server
//!
//! Backend for the Nutrio nutrition-coaching platform. It connects a
//! specialist (nutritionist) role and a client role over a REST API:
//!
//! - **Dishes**: recipe records with ingredients and macro estimates
//! - **Menus**: multi-day meal plans referencing dishes by slot
//! - **Clients**: coached profiles with goals, allergies, and budget
//! - **Journal**: daily client check-ins (weight, mood, energy)
//! - **Chat**: one messaging thread per specialist/client pair
//! - **Assistant**: LLM-backed drafting of dishes, macro estimates,
//!   substitutes, and meal plans via an OpenAI-compatible endpoint
//!
//! Authentication tokens are issued by an external identity provider and
//! validated here with a shared secret; see [`auth`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nutrio_server::config::ServerConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env()?;
//! println!("Nutrio server configured for port {}", config.http.port);
//! # Ok(())
//! # }
//! ```

/// Bearer-token validation and role gating
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Database connection, migrations, and per-domain managers
pub mod database;

/// Unified error handling
pub mod errors;

/// LLM request shaping, completion client, and output normalization
pub mod llm;

/// Logging configuration
pub mod logging;

/// Shared domain types
pub mod models;

/// Shared server resources
pub mod resources;

/// HTTP route handlers
pub mod routes;
