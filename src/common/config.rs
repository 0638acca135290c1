// src/common/config.rs
//! Environment-driven application configuration

use std::env;

/// Text-generation provider selector.
///
/// Only OpenAI has a real implementation today; selecting Gemini is
/// accepted but falls back to OpenAI with a warning at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Gemini,
}

impl AiProvider {
    pub fn from_str_lossy(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "gemini" => AiProvider::Gemini,
            _ => AiProvider::OpenAi,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub session_secret: String,
    pub cookie_name: String,
    pub app_base_url: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub ai_provider: AiProvider,
    pub generation_cooldown_seconds: u64,
    /// "development" relaxes the Secure cookie flag and enables the
    /// log-instead-of-send mail fallback
    pub run_mode: RunMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    pub fn is_development(&self) -> bool {
        matches!(self, RunMode::Development)
    }
}

impl AppConfig {
    /// Load configuration from environment variables, with development
    /// defaults for everything except secrets used in production
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/castpress.db".to_string());

        let session_secret = env::var("SESSION_SECRET")
            .unwrap_or_else(|_| "replace_with_strong_secret".to_string());
        let cookie_name =
            env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "castpress_session".to_string());

        let app_base_url = env::var("APP_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        let smtp_port = env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(587);
        let smtp_from =
            env::var("SMTP_FROM").unwrap_or_else(|_| "no-reply@castpress.local".to_string());

        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let ai_provider = AiProvider::from_str_lossy(
            &env::var("AI_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
        );

        let generation_cooldown_seconds = env::var("GENERATION_COOLDOWN_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let run_mode = match env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => RunMode::Production,
            _ => RunMode::Development,
        };

        Self {
            host,
            port,
            database_url,
            session_secret,
            cookie_name,
            app_base_url,
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port,
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            smtp_from,
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_model,
            ai_provider,
            generation_cooldown_seconds,
            run_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_selector_parsing() {
        assert_eq!(AiProvider::from_str_lossy("openai"), AiProvider::OpenAi);
        assert_eq!(AiProvider::from_str_lossy("GEMINI"), AiProvider::Gemini);
        // Unknown providers fall back to OpenAI
        assert_eq!(AiProvider::from_str_lossy("llama"), AiProvider::OpenAi);
    }
}
