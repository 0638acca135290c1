// src/services/llm.rs
//! Text-generation provider client: prompt assembly, one-shot completion
//! call, and structured-output parsing

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::common::config::AiProvider;
use crate::services::transcript::truncate_transcript;

const SYSTEM_PROMPT: &str = "You are an expert blog writer. You turn video transcripts into \
well-structured, SEO-friendly blog posts. You always answer with a single JSON object and \
nothing else.";

/// Output budget for the completion call
const MAX_OUTPUT_TOKENS: u32 = 4000;
/// Fixed sampling temperature
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("provider rate limit exceeded")]
    RateLimitExceeded,

    #[error("could not parse generated output: {0}")]
    ParseFailed(String),
}

/// The structured shape the provider is instructed to answer with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub seo_keywords: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content_html: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[derive(Debug)]
pub struct LlmService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    default_model: String,
}

impl LlmService {
    pub fn new(api_key: Option<String>, default_model: String, provider: AiProvider) -> Self {
        if provider == AiProvider::Gemini {
            // Provider branching is a configuration no-op until a real
            // second provider exists
            warn!("AI_PROVIDER=gemini selected but not implemented, falling back to OpenAI");
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(180))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: "https://api.openai.com".to_string(),
            default_model,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Turn transcript text into a structured blog post.
    ///
    /// The provider is called exactly once; any failure aborts the
    /// request and nothing is persisted by the caller.
    pub async fn generate_post(
        &self,
        transcript: &str,
        model: &str,
    ) -> Result<GeneratedPost, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        let transcript = truncate_transcript(transcript);

        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_user_prompt(&transcript),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        debug!(model = %model, transcript_chars = transcript.len(), "Sending generation request");

        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Generation request failed");
            return Err(LlmError::RequestFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let raw = completion
            .choices
            .first()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?
            .message
            .content
            .clone();

        if let Some(usage) = completion.usage {
            info!(
                model = %model,
                tokens_used = usage.total_tokens,
                "Generation completed"
            );
        }

        parse_generated_post(&raw)
    }
}

fn build_user_prompt(transcript: &str) -> String {
    format!(
        "Write a blog post based on the following video transcript.\n\
         \n\
         Respond with a JSON object with exactly these fields:\n\
         {{\n\
           \"title\": \"catchy post title\",\n\
           \"meta_description\": \"150-160 character meta description\",\n\
           \"seo_keywords\": \"comma-separated keywords\",\n\
           \"summary\": \"2-3 sentence summary\",\n\
           \"content_html\": \"the full post body as HTML using only h1-h6, p, ul, ol and li tags\"\n\
         }}\n\
         \n\
         Transcript:\n{}",
        transcript
    )
}

/// Strip surrounding Markdown code-fence markers from a raw model reply
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line
    let rest = match rest.split_once('\n') {
        Some((_lang, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse the model's reply into a [`GeneratedPost`], tolerating code
/// fences around the JSON body
pub fn parse_generated_post(raw: &str) -> Result<GeneratedPost, LlmError> {
    let cleaned = strip_code_fences(raw);

    let post: GeneratedPost =
        serde_json::from_str(cleaned).map_err(|e| LlmError::ParseFailed(e.to_string()))?;

    if post.title.trim().is_empty() {
        return Err(LlmError::ParseFailed("generated title is empty".to_string()));
    }

    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{
        "title": "A Post",
        "meta_description": "Meta",
        "seo_keywords": "one, two",
        "summary": "Summary.",
        "content_html": "<h1>A Post</h1><p>Body</p>"
    }"#;

    #[test]
    fn test_strip_code_fences_plain_text() {
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_strip_code_fences_with_language_tag() {
        let raw = "```json\n{\"a\":1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\":1}");
    }

    #[test]
    fn test_strip_code_fences_without_language_tag() {
        let raw = "```\n{\"a\":1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\":1}");
    }

    #[test]
    fn test_parse_well_formed_response() {
        let post = parse_generated_post(WELL_FORMED).expect("Failed to parse");
        assert_eq!(post.title, "A Post");
        assert_eq!(post.content_html, "<h1>A Post</h1><p>Body</p>");
    }

    #[test]
    fn test_parse_fenced_response() {
        let raw = format!("```json\n{}\n```", WELL_FORMED);
        let post = parse_generated_post(&raw).expect("Failed to parse fenced response");
        assert_eq!(post.title, "A Post");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let result = parse_generated_post("Sorry, I cannot help with that.");
        assert!(matches!(result, Err(LlmError::ParseFailed(_))));
    }

    #[test]
    fn test_parse_rejects_missing_title() {
        let result = parse_generated_post(r#"{"content_html": "<p>no title</p>"}"#);
        assert!(matches!(result, Err(LlmError::ParseFailed(_))));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let post = parse_generated_post(r#"{"title": "Only a title"}"#).expect("Failed to parse");
        assert_eq!(post.meta_description, "");
        assert_eq!(post.content_html, "");
    }

    #[test]
    fn test_generate_without_api_key_is_not_configured() {
        let service = LlmService::new(None, "gpt-4o-mini".to_string(), AiProvider::OpenAi)
            .with_base_url("http://127.0.0.1:1".to_string());

        let result = tokio_test_block_on(service.generate_post("transcript", "gpt-4o-mini"));
        assert!(matches!(result, Err(LlmError::NotConfigured)));
    }

    fn tokio_test_block_on<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to build runtime")
            .block_on(fut)
    }
}
