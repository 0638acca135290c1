//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        StatusCode,
    },
    response::{IntoResponse, Response},
};
use cookie::Cookie;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::handlers::clear_session_cookie;
use super::models::User;
use crate::common::helpers::safe_token_log;
use crate::common::{safe_email_log, ApiError, AppState};
use crate::services::tokens::TokenPurpose;

/// Authenticated user extractor
///
/// Reads the session cookie, verifies the signed token, and loads the
/// user from the database. Any failure clears the cookie and redirects
/// to the login page; verification fails closed.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Rejection that drops the stale session cookie and sends the browser
/// back to the login entry point
pub struct AuthRedirect {
    cookie: Cookie<'static>,
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        let mut response =
            (StatusCode::SEE_OTHER, [("location", "/login")]).into_response();
        if let Ok(value) = self.cookie.to_string().parse() {
            response.headers_mut().insert(SET_COOKIE, value);
        }
        response
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Extension containing the AppState
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::InternalServer("missing app state".to_string()).into_response()
                })?;

        let app_state = state_lock.read().await.clone();

        let redirect = || {
            AuthRedirect {
                cookie: clear_session_cookie(&app_state.config),
            }
            .into_response()
        };

        // Find the session cookie among the request's Cookie headers
        let token = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|c| c.name() == app_state.config.cookie_name)
            .map(|c| c.value().to_string());

        let Some(token) = token else {
            debug!("Authentication failed: no session cookie");
            return Err(redirect());
        };

        // Verify the signed session token
        let user_id = match app_state.sessions.verify(&token, TokenPurpose::Session) {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    error = %e,
                    token = %safe_token_log(&token),
                    "Session token validation failed"
                );
                return Err(redirect());
            }
        };

        // Look up user in database
        let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(&user_id)
            .fetch_optional(&app_state.db)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    user_id = %user_id,
                    "Database error during user lookup in authentication"
                );
                ApiError::DatabaseError(e).into_response()
            })?;

        match user {
            Some(u) if u.verified => {
                debug!(
                    user_id = %u.id,
                    email = %safe_email_log(&u.email),
                    "User authentication successful via session cookie"
                );
                Ok(AuthedUser {
                    id: u.id,
                    name: u.name,
                    email: u.email,
                })
            }
            Some(u) => {
                warn!(user_id = %u.id, "Session for unverified user rejected");
                Err(redirect())
            }
            None => {
                warn!(user_id = %user_id, "Authentication failed: user not found in database");
                Err(redirect())
            }
        }
    }
}
