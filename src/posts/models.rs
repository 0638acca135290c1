//! Post data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Post database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub meta_description: String,
    pub seo_keywords: String,
    pub summary: String,
    pub content_html: String,
    pub source_url: Option<String>,
    pub ai_model: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// POST /generate request body
#[derive(Deserialize, Debug)]
pub struct GenerateRequest {
    pub youtube_url: Option<String>,
    pub transcript: Option<String>,
    pub ai_model: Option<String>,
}

/// POST /generate success response
#[derive(Serialize, Debug)]
pub struct GenerateResponse {
    pub success: bool,
    pub post_id: String,
    pub title: String,
}

/// POST /posts/:id/save request body
#[derive(Deserialize, Debug)]
pub struct SavePostRequest {
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

/// POST /posts/:id/save response
#[derive(Serialize, Debug)]
pub struct SaveResponse {
    pub success: bool,
}
