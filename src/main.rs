// src/main.rs
use axum::{extract::Extension, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod common;
mod pages;
mod posts;
mod services;

use common::config::{AppConfig, RunMode};
use common::AppState;
use services::{GenerationLimiter, LlmService, Mailer, SessionService, TranscriptService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();

    match config.run_mode {
        RunMode::Development => info!("Running in development mode"),
        RunMode::Production => info!("Running in production mode"),
    }

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    // Create the database directory if it doesn't exist yet
    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let sessions = Arc::new(SessionService::new(config.session_secret.clone()));
    info!("SessionService initialized");

    let mailer = Arc::new(Mailer::from_config(&config));
    info!("Mailer initialized");

    let transcripts = Arc::new(TranscriptService::new(Client::builder().build()?));
    info!("TranscriptService initialized");

    let llm = Arc::new(LlmService::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.ai_provider,
    ));
    info!("LlmService initialized");

    let generation_limiter = Arc::new(GenerationLimiter::new(config.generation_cooldown_seconds));
    GenerationLimiter::start_cleanup_task(generation_limiter.clone());
    info!(
        cooldown_seconds = config.generation_cooldown_seconds,
        "GenerationLimiter initialized"
    );

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let addr = SocketAddr::new(config.host.parse()?, config.port);

    let app_state = AppState {
        db: pool,
        config,
        sessions,
        mailer,
        transcripts,
        llm,
        generation_limiter,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .merge(posts::posts_routes())
        .layer(Extension(shared))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
