//! Authentication handlers: signup, email verification, login, logout

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::extract::{Extension, Form, Query};
use axum::http::{header::SET_COOKIE, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use cookie::{Cookie, SameSite};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::models::{LoginForm, SignupForm, User, VerifyQuery};
use super::validators::SignupValidator;
use crate::common::config::AppConfig;
use crate::common::{generate_user_id, safe_email_log, ApiError, AppState, Validator};
use crate::pages;
use crate::services::tokens::TokenPurpose;

/// GET /
pub async fn home() -> Html<String> {
    Html(pages::home_page())
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "OK"
}

/// GET /signup
pub async fn signup_page() -> Html<String> {
    Html(pages::signup_page(None))
}

/// GET /login
pub async fn login_page() -> Html<String> {
    Html(pages::login_page(None))
}

/// POST /signup
/// Creates an unverified account and emails a verification link
pub async fn signup(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Form(form): Form<SignupForm>,
) -> Response {
    let state = state_lock.read().await.clone();

    let validation = SignupValidator.validate(&form);
    if !validation.is_valid {
        return (
            StatusCode::BAD_REQUEST,
            Html(pages::signup_page(Some(&validation.message()))),
        )
            .into_response();
    }

    let email = form.email.trim().to_lowercase();

    let password_hash = match hash_password(&form.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed during signup");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::signup_page(Some("Something went wrong. Please try again."))),
            )
                .into_response();
        }
    };

    let user_id = generate_user_id();

    let insert = sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, verified) VALUES (?, ?, ?, ?, 0)",
    )
    .bind(&user_id)
    .bind(form.name.trim())
    .bind(&email)
    .bind(&password_hash)
    .execute(&state.db)
    .await;

    if let Err(e) = insert {
        if is_unique_violation(&e) {
            warn!(email = %safe_email_log(&email), "Signup rejected: email already registered");
            return (
                StatusCode::BAD_REQUEST,
                Html(pages::signup_page(Some("That email address is already registered."))),
            )
                .into_response();
        }
        error!(error = %e, "Database error inserting new user");
        return ApiError::DatabaseError(e).into_response();
    }

    info!(
        user_id = %user_id,
        email = %safe_email_log(&email),
        "New user account created, sending verification email"
    );

    let token = match state
        .sessions
        .issue(&user_id, TokenPurpose::EmailVerification)
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, user_id = %user_id, "Failed to issue verification token");
            return ApiError::InternalServer("token error".to_string()).into_response();
        }
    };

    let verify_url = format!(
        "{}/verify?token={}",
        state.config.app_base_url.trim_end_matches('/'),
        urlencoding::encode(&token)
    );

    if let Err(e) = state
        .mailer
        .send_verification_email(&email, form.name.trim(), &verify_url)
        .await
    {
        error!(error = %e, email = %safe_email_log(&email), "Failed to send verification email");
        // Roll the account back so a later signup with the same email is
        // not blocked by the UNIQUE constraint
        if let Err(e) = remove_unverified_account(&state.db, &user_id).await {
            error!(error = %e, user_id = %user_id, "Failed to roll back unverified account");
        }
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(pages::status_page(
                "Email delivery failed",
                "Your account was created but the verification email could not be sent. Please try signing up again later.",
            )),
        )
            .into_response();
    }

    Html(pages::status_page(
        "Check your inbox",
        "We sent you a verification link. Click it within 24 hours to activate your account.",
    ))
    .into_response()
}

/// GET /verify?token=
/// Marks the account verified if the token checks out
pub async fn verify_email(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    let state = state_lock.read().await.clone();

    let user_id = match state
        .sessions
        .verify(&query.token, TokenPurpose::EmailVerification)
    {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "Email verification failed");
            return (
                StatusCode::BAD_REQUEST,
                Html(pages::status_page(
                    "Verification failed",
                    "This verification link is invalid or has expired. Please sign up again to receive a new one.",
                )),
            )
                .into_response();
        }
    };

    let update = sqlx::query("UPDATE users SET verified = 1 WHERE id = ?")
        .bind(&user_id)
        .execute(&state.db)
        .await;

    match update {
        Ok(result) if result.rows_affected() > 0 => {
            info!(user_id = %user_id, "Email verified");
            Html(pages::status_page(
                "Email verified",
                "Your account is active. You can now log in.",
            ))
            .into_response()
        }
        Ok(_) => {
            warn!(user_id = %user_id, "Verification token for unknown user");
            (
                StatusCode::BAD_REQUEST,
                Html(pages::status_page(
                    "Verification failed",
                    "This verification link does not match an account.",
                )),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, user_id = %user_id, "Database error marking user verified");
            ApiError::DatabaseError(e).into_response()
        }
    }
}

/// POST /login
/// Sets the HTTP-only session cookie and redirects to the dashboard
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let state = state_lock.read().await.clone();

    let user = match verify_credentials(&state.db, &form.email, &form.password).await {
        Ok(u) => u,
        Err(LoginError::NotVerified) => {
            return (
                StatusCode::UNAUTHORIZED,
                Html(pages::login_page(Some(
                    "Please verify your email address before logging in.",
                ))),
            )
                .into_response();
        }
        Err(LoginError::InvalidCredentials) => {
            return (
                StatusCode::UNAUTHORIZED,
                Html(pages::login_page(Some("Incorrect email or password."))),
            )
                .into_response();
        }
        Err(LoginError::Database(e)) => {
            error!(error = %e, "Database error during login");
            return ApiError::DatabaseError(e).into_response();
        }
    };

    let token = match state.sessions.issue(&user.id, TokenPurpose::Session) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, user_id = %user.id, "Failed to issue session token");
            return ApiError::InternalServer("token error".to_string()).into_response();
        }
    };

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User logged in"
    );

    let cookie = session_cookie(&state.config, &token);
    with_cookie(Redirect::to("/dashboard").into_response(), &cookie)
}

/// GET /logout
pub async fn logout(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Response {
    let state = state_lock.read().await;
    let cookie = clear_session_cookie(&state.config);
    with_cookie(Redirect::to("/").into_response(), &cookie)
}

// ---- Helper Functions ----

#[derive(Debug)]
pub enum LoginError {
    InvalidCredentials,
    NotVerified,
    Database(sqlx::Error),
}

/// Resolve email + password to a verified user.
///
/// Wrong email, wrong password and unknown accounts all collapse into
/// `InvalidCredentials`; only a correct password on an unverified account
/// is distinguished, so the user can be told to check their inbox.
pub async fn verify_credentials(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<User, LoginError> {
    let email = email.trim().to_lowercase();

    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(pool)
        .await
        .map_err(LoginError::Database)?;

    let Some(user) = user else {
        warn!(email = %safe_email_log(&email), "Login failed: unknown email");
        return Err(LoginError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(LoginError::InvalidCredentials);
    }

    if !user.verified {
        warn!(user_id = %user.id, "Login refused: email not verified");
        return Err(LoginError::NotVerified);
    }

    Ok(user)
}

/// Remove an account that never completed verification, such as when
/// the verification email could not be delivered. Verified accounts are
/// never touched.
pub async fn remove_unverified_account(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE id = ? AND verified = 0")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.message().contains("UNIQUE"))
}

/// Build the login session cookie: HTTP-only, 7-day max age, Secure
/// outside development
pub fn session_cookie(config: &AppConfig, token: &str) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token.to_string()))
        .path("/")
        .http_only(true)
        .secure(!config.run_mode.is_development())
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::days(7))
        .build()
}

/// An expired, empty cookie that removes the session from the browser
pub fn clear_session_cookie(config: &AppConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), String::new()))
        .path("/")
        .http_only(true)
        .max_age(cookie::time::Duration::ZERO)
        .build()
}

fn with_cookie(mut response: Response, cookie: &Cookie<'_>) -> Response {
    match cookie.to_string().parse() {
        Ok(value) => {
            response.headers_mut().insert(SET_COOKIE, value);
            response
        }
        Err(_) => ApiError::InternalServer("cookie error".to_string()).into_response(),
    }
}
