// ABOUTME: Configuration module organization for the Nutrio server
// ABOUTME: Re-exports the environment-driven server configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! Configuration management
//!
//! All runtime configuration is environment-driven; there is no config file.

/// Environment-based configuration for production deployment
pub mod environment;

pub use environment::{
    AuthConfig, DatabaseConfig, Environment, HttpConfig, LlmConfig, LogLevel, ServerConfig,
};
