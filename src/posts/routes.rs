//! Post routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the posts router
///
/// # Routes
/// - `GET /dashboard` - The caller's post list (auth)
/// - `POST /generate` - Run the generation pipeline (auth, rate-limited)
/// - `GET /posts/:id/edit` - Editor page (auth, owner-checked)
/// - `POST /posts/:id/save` - Persist edits (auth, owner-checked)
/// - `GET /posts/:id/download` - HTML attachment (auth, owner-checked)
pub fn posts_routes() -> Router {
    Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route("/generate", post(handlers::generate))
        .route("/posts/:id/edit", get(handlers::edit_page))
        .route("/posts/:id/save", post(handlers::save))
        .route("/posts/:id/download", get(handlers::download))
}
