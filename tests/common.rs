// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database, auth token, and stub LLM provider helpers

#![allow(dead_code)]

//! Shared test utilities for `nutrio_server`

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use nutrio_server::{
    auth::AuthManager,
    config::{AuthConfig, DatabaseConfig, Environment, HttpConfig, LlmConfig, LogLevel, ServerConfig},
    database::Database,
    errors::AppError,
    llm::{ChatRequest, ChatResponse, LlmProvider, TokenUsage},
    resources::ServerResources,
};

/// Fixed secret shared between the test "identity provider" and the server
pub const TEST_AUTH_SECRET: &str = "nutrio-test-secret-0123456789abcdef";

/// Stub LLM provider returning a canned completion
pub struct StubLlm {
    /// Content to return from every `complete` call
    pub content: String,
}

impl StubLlm {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn default_model(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse, AppError> {
        Ok(ChatResponse {
            content: self.content.clone(),
            model: "stub-model".to_owned(),
            usage: Some(TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 50,
                total_tokens: 150,
            }),
            finish_reason: Some("stop".to_owned()),
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// Test server configuration pointing at an in-memory database
pub fn test_config() -> ServerConfig {
    ServerConfig {
        environment: Environment::Testing,
        log_level: LogLevel::Info,
        http: HttpConfig {
            port: 0,
            bind_address: "127.0.0.1".into(),
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
        },
        auth: AuthConfig {
            jwt_secret: TEST_AUTH_SECRET.into(),
            token_expiry_hours: 24,
        },
        llm: LlmConfig {
            base_url: "http://localhost:11434/v1".into(),
            api_key: None,
            model: "stub-model".into(),
        },
    }
}

/// Create server resources backed by an in-memory database and a stub LLM
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    create_test_resources_with_llm(StubLlm::new("{}")).await
}

/// Create server resources with a specific stub completion
pub async fn create_test_resources_with_llm(llm: StubLlm) -> Result<Arc<ServerResources>> {
    let config = Arc::new(test_config());
    let database = Database::new(&config.database.url).await?;
    let auth_manager = AuthManager::new(&config.auth.jwt_secret, config.auth.token_expiry_hours);

    Ok(Arc::new(ServerResources::new(
        database,
        auth_manager,
        Arc::new(llm),
        config,
    )))
}

/// Generate a bearer header value for a fresh specialist
pub fn specialist_token(resources: &ServerResources) -> (Uuid, String) {
    let user_id = Uuid::new_v4();
    let token = resources
        .auth_manager
        .generate_token(user_id, nutrio_server::models::Role::Specialist)
        .unwrap();
    (user_id, format!("Bearer {token}"))
}

/// Generate a bearer header value for a fresh client
pub fn client_token(resources: &ServerResources) -> (Uuid, String) {
    let user_id = Uuid::new_v4();
    let token = resources
        .auth_manager
        .generate_token(user_id, nutrio_server::models::Role::Client)
        .unwrap();
    (user_id, format!("Bearer {token}"))
}
