//! Post handlers: dashboard listing, generation, editing, download

use axum::extract::{Extension, Json, Path};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::models::{GenerateRequest, GenerateResponse, Post, SavePostRequest, SaveResponse};
use super::validators::{GenerateValidator, SavePostValidator};
use crate::auth::AuthedUser;
use crate::common::{generate_post_id, ApiError, AppState, Validator};
use crate::pages;
use crate::services::llm::LlmError;
use crate::services::rate_limit::AcquireResult;
use crate::services::sanitize::sanitize_post_html;
use crate::services::transcript::TranscriptError;

/// GET /dashboard
/// Lists the caller's posts, newest first
pub async fn dashboard(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();

    let posts = sqlx::query_as::<_, Post>(
        "SELECT * FROM posts WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Html(pages::dashboard_page(&authed.name, &posts)))
}

/// POST /generate
/// Runs the full pipeline: admit via cooldown, acquire transcript, call
/// the provider, sanitize, persist. Exactly one row is inserted on
/// success; no row on any failure branch.
pub async fn generate(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = GenerateValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    // Admission control: one generation per user per cooldown window
    if let AcquireResult::Denied { retry_after } =
        state.generation_limiter.try_acquire(&authed.id).await
    {
        return Err(ApiError::RateLimited { retry_after });
    }

    let source_url = payload
        .youtube_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string);

    // Pasted text takes precedence over URL-derived captions
    let pasted = payload
        .transcript
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let transcript = match (pasted, &source_url) {
        (Some(text), _) => text.to_string(),
        (None, Some(url)) => {
            state
                .transcripts
                .fetch_from_url(url)
                .await
                .map_err(|e| match e {
                    TranscriptError::InvalidUrl => ApiError::BadRequest(
                        "Could not extract a video id from that URL".to_string(),
                    ),
                    TranscriptError::NoCaptions => ApiError::BadRequest(
                        "No captions are available for that video. Paste the transcript instead."
                            .to_string(),
                    ),
                    TranscriptError::RequestFailed(msg) => {
                        warn!(error = %msg, "Caption fetch failed");
                        ApiError::ServiceUnavailable(
                            "Could not reach the caption service".to_string(),
                        )
                    }
                })?
        }
        (None, None) => {
            // Unreachable behind the validator, kept as a guard
            return Err(ApiError::BadRequest(
                "Provide a YouTube URL or paste a transcript".to_string(),
            ));
        }
    };

    let model = payload
        .ai_model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| state.llm.default_model())
        .to_string();

    let generated = state
        .llm
        .generate_post(&transcript, &model)
        .await
        .map_err(|e| match e {
            LlmError::NotConfigured => {
                ApiError::ServiceUnavailable("Text generation is not configured".to_string())
            }
            LlmError::RateLimitExceeded => {
                ApiError::ServiceUnavailable("The provider is rate limiting us".to_string())
            }
            LlmError::ParseFailed(msg) => {
                warn!(error = %msg, "Generated output could not be parsed");
                ApiError::ServiceUnavailable(
                    "The model returned output we could not parse. Try again.".to_string(),
                )
            }
            LlmError::RequestFailed(msg) | LlmError::InvalidResponse(msg) => {
                error!(error = %msg, "Provider call failed");
                ApiError::ServiceUnavailable("Text generation failed".to_string())
            }
        })?;

    let content_html = sanitize_post_html(&generated.content_html);

    let post_id = generate_post_id();

    sqlx::query(
        r#"
        INSERT INTO posts (id, user_id, title, meta_description, seo_keywords, summary, content_html, source_url, ai_model)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post_id)
    .bind(&authed.id)
    .bind(&generated.title)
    .bind(&generated.meta_description)
    .bind(&generated.seo_keywords)
    .bind(&generated.summary)
    .bind(&content_html)
    .bind(&source_url)
    .bind(&model)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        post_id = %post_id,
        model = %model,
        "Post generated and stored"
    );

    Ok(Json(GenerateResponse {
        success: true,
        post_id,
        title: generated.title,
    }))
}

/// GET /posts/:id/edit
/// Renders the editor; a post owned by someone else is NotFound
pub async fn edit_page(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(post_id): Path<String>,
) -> Response {
    let state = state_lock.read().await.clone();

    match fetch_owned_post(&state.db, &post_id, &authed.id).await {
        Ok(Some(post)) => Html(pages::editor_page(&post)).into_response(),
        Ok(None) => not_found_page(),
        Err(e) => ApiError::DatabaseError(e).into_response(),
    }
}

/// POST /posts/:id/save
/// Persists user edits; the HTML body is re-sanitized on every save
pub async fn save(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(post_id): Path<String>,
    Json(payload): Json<SavePostRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = SavePostValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    // Never trust client-submitted markup
    let content_html = sanitize_post_html(&payload.content_html);

    let result = sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, meta_description = ?, seo_keywords = ?, summary = ?,
            content_html = ?, updated_at = datetime('now')
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(payload.title.trim())
    .bind(&payload.meta_description)
    .bind(&payload.seo_keywords)
    .bind(&payload.summary)
    .bind(&content_html)
    .bind(&post_id)
    .bind(&authed.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        // Missing row and wrong owner look identical to the caller
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    info!(user_id = %authed.id, post_id = %post_id, "Post saved");

    Ok(Json(SaveResponse { success: true }))
}

/// GET /posts/:id/download
/// Serves the stored HTML as a file attachment
pub async fn download(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(post_id): Path<String>,
) -> Response {
    let state = state_lock.read().await.clone();

    let post = match fetch_owned_post(&state.db, &post_id, &authed.id).await {
        Ok(Some(post)) => post,
        Ok(None) => return not_found_page(),
        Err(e) => return ApiError::DatabaseError(e).into_response(),
    };

    let document = pages::download_document(&post);
    let disposition = format!("attachment; filename=\"{}.html\"", post.id);

    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document,
    )
        .into_response()
}

// ---- Helper Functions ----

/// Fetch a post only if it belongs to the requesting user.
///
/// The owner check lives in the query itself so a foreign post and a
/// missing post are indistinguishable.
pub async fn fetch_owned_post(
    pool: &SqlitePool,
    post_id: &str,
    user_id: &str,
) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ? AND user_id = ?")
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

fn not_found_page() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(pages::status_page("Not found", "That post does not exist.")),
    )
        .into_response()
}
