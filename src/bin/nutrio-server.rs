// ABOUTME: Server binary for the Nutrio coaching platform backend
// ABOUTME: Loads configuration, runs migrations, and serves the REST API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! # Nutrio Server Binary
//!
//! Starts the coaching backend: environment configuration, logging,
//! database migration, and the axum HTTP listener.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use nutrio_server::{
    auth::AuthManager,
    config::ServerConfig,
    database::Database,
    llm::{LlmProvider, OpenAiCompatibleProvider},
    logging,
    resources::ServerResources,
    routes,
};

#[derive(Parser)]
#[command(name = "nutrio-server")]
#[command(about = "Nutrio Coaching API - nutrition coaching backend with LLM drafting")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http.port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Nutrio Coaching API");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url).await?;
    info!("Database initialized and migrated");

    let auth_manager = AuthManager::new(&config.auth.jwt_secret, config.auth.token_expiry_hours);

    let llm: Arc<dyn LlmProvider> =
        Arc::new(OpenAiCompatibleProvider::from_config(&config.llm)?);
    info!(
        "LLM provider ready: {} (model {})",
        llm.name(),
        llm.default_model()
    );

    let config = Arc::new(config);
    let resources = Arc::new(ServerResources::new(
        database,
        auth_manager,
        llm,
        config.clone(),
    ));

    let app = routes::router(resources)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(330)));

    let addr = format!("{}:{}", config.http.bind_address, config.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve when the process receives a shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
