// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into typed server, database, auth, and LLM configs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! Environment-based configuration management for production deployment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Default HTTP port when `NUTRIO_HTTP_PORT` is not set
const DEFAULT_HTTP_PORT: u16 = 8081;

/// Default SQLite database URL
const DEFAULT_DATABASE_URL: &str = "sqlite:./data/nutrio.db";

/// Default OpenAI-compatible endpoint (local Ollama)
const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434/v1";

/// Default model for dish and plan drafting
const DEFAULT_LLM_MODEL: &str = "qwen2.5:14b-instruct";

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Environment type for deployment-specific behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Port to bind the HTTP listener to
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL (`sqlite:...` or `sqlite::memory:`)
    pub url: String,
}

/// Authentication configuration
///
/// Tokens are issued by the external identity provider; this server only
/// validates them with the shared HS256 secret.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret for validating bearer tokens
    pub jwt_secret: String,
    /// Token lifetime in hours for locally generated (test/dev) tokens
    pub token_expiry_hours: i64,
}

/// LLM provider configuration for the OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of the chat-completions API
    pub base_url: String,
    /// API key; optional for local servers
    pub api_key: Option<String>,
    /// Model to request
    pub model: String,
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// HTTP settings
    pub http: HttpConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Auth settings
    pub auth: AuthConfig,
    /// LLM settings
    pub llm: LlmConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Required: `NUTRIO_AUTH_SECRET`.
    /// Everything else falls back to development defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a numeric
    /// variable fails to parse.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT").unwrap_or_default(),
        );

        let log_level =
            LogLevel::from_str_or_default(&env::var("RUST_LOG").unwrap_or_default());

        let port = match env::var("NUTRIO_HTTP_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .context("NUTRIO_HTTP_PORT must be a valid port number")?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let bind_address =
            env::var("NUTRIO_BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_owned());

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());

        let jwt_secret = env::var("NUTRIO_AUTH_SECRET")
            .context("NUTRIO_AUTH_SECRET must be set (shared with the identity provider)")?;

        let token_expiry_hours = match env::var("NUTRIO_TOKEN_EXPIRY_HOURS") {
            Ok(value) => value
                .parse::<i64>()
                .context("NUTRIO_TOKEN_EXPIRY_HOURS must be an integer")?,
            Err(_) => 24,
        };

        let llm_base_url =
            env::var("NUTRIO_LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_owned());
        let llm_api_key = env::var("NUTRIO_LLM_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        let llm_model =
            env::var("NUTRIO_LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_owned());

        Ok(Self {
            environment,
            log_level,
            http: HttpConfig { port, bind_address },
            database: DatabaseConfig { url: database_url },
            auth: AuthConfig {
                jwt_secret,
                token_expiry_hours,
            },
            llm: LlmConfig {
                base_url: llm_base_url,
                api_key: llm_api_key,
                model: llm_model,
            },
        })
    }

    /// One-line startup summary with secrets elided
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "env={} http_port={} database={} llm_base_url={} llm_model={} llm_api_key={}",
            self.environment,
            self.http.port,
            self.database.url,
            self.llm.base_url,
            self.llm.model,
            if self.llm.api_key.is_some() {
                "set"
            } else {
                "unset"
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("nonsense"), LogLevel::Info);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("test"),
            Environment::Testing
        );
        assert_eq!(
            Environment::from_str_or_default(""),
            Environment::Development
        );
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_summary_elides_secret() {
        let config = ServerConfig {
            environment: Environment::Testing,
            log_level: LogLevel::Info,
            http: HttpConfig {
                port: 8081,
                bind_address: "127.0.0.1".into(),
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".into(),
            },
            auth: AuthConfig {
                jwt_secret: "super-secret".into(),
                token_expiry_hours: 24,
            },
            llm: LlmConfig {
                base_url: "http://localhost:11434/v1".into(),
                api_key: Some("key-123".into()),
                model: "qwen2.5:14b-instruct".into(),
            },
        };

        let summary = config.summary();
        assert!(!summary.contains("super-secret"));
        assert!(!summary.contains("key-123"));
        assert!(summary.contains("llm_api_key=set"));
    }
}
