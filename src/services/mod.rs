// Services module - shared infrastructure used by request handlers

pub mod llm;
pub mod mailer;
pub mod rate_limit;
pub mod sanitize;
pub mod tokens;
pub mod transcript;

pub use llm::LlmService;
pub use mailer::Mailer;
pub use rate_limit::GenerationLimiter;
pub use tokens::SessionService;
pub use transcript::TranscriptService;
