// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::common::config::AppConfig;
use crate::services::{
    GenerationLimiter, LlmService, Mailer, SessionService, TranscriptService,
};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: AppConfig,
    pub sessions: Arc<SessionService>,
    pub mailer: Arc<Mailer>,
    pub transcripts: Arc<TranscriptService>,
    pub llm: Arc<LlmService>,
    pub generation_limiter: Arc<GenerationLimiter>,
}
