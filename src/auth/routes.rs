//! Authentication and account routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /healthz` - Liveness probe
/// - `GET /` - Landing page
/// - `GET|POST /signup` - Account creation
/// - `GET /verify` - Email verification link target
/// - `GET|POST /login` - Session login
/// - `GET /logout` - Session logout
pub fn auth_routes() -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/", get(handlers::home))
        .route("/signup", get(handlers::signup_page).post(handlers::signup))
        .route("/verify", get(handlers::verify_email))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
}
