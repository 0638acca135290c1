// src/services/tokens.rs
//! Signed, time-limited tokens for email verification and login sessions

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Login sessions live for 7 days
pub const SESSION_TTL_HOURS: i64 = 24 * 7;
/// Email verification tokens live for 24 hours
pub const VERIFY_TTL_HOURS: i64 = 24;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,

    #[error("token issued for a different purpose")]
    PurposeMismatch,

    #[error("token encoding failed: {0}")]
    EncodingFailed(String),
}

/// What a token proves. Each purpose gets its own TTL and a token issued
/// for one purpose never verifies as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    Session,
    EmailVerification,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Session => "session",
            TokenPurpose::EmailVerification => "verify",
        }
    }

    pub fn ttl_hours(&self) -> i64 {
        match self {
            TokenPurpose::Session => SESSION_TTL_HOURS,
            TokenPurpose::EmailVerification => VERIFY_TTL_HOURS,
        }
    }
}

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub purpose: String,
    pub exp: usize,
}

/// Issues and verifies the signed tokens backing login sessions and
/// email verification links
#[derive(Debug)]
pub struct SessionService {
    secret: String,
}

impl SessionService {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Create a signed token for the given user and purpose, expiring
    /// after the purpose's TTL
    pub fn issue(&self, user_id: &str, purpose: TokenPurpose) -> Result<String, TokenError> {
        let exp = (Utc::now() + Duration::hours(purpose.ttl_hours())).timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            purpose: purpose.as_str().to_string(),
            exp,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Validate a token and return the user id it was issued for.
    ///
    /// Fails closed: expiry, bad signature, malformed payload, and
    /// purpose mismatch all reject the token.
    pub fn verify(&self, token: &str, expected: TokenPurpose) -> Result<String, TokenError> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            warn!(error = %e, "Token validation failed");
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if decoded.claims.purpose != expected.as_str() {
            warn!(
                got = %decoded.claims.purpose,
                expected = %expected.as_str(),
                "Token purpose mismatch"
            );
            return Err(TokenError::PurposeMismatch);
        }

        Ok(decoded.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = SessionService::new("test_secret_key".to_string());

        let token = service
            .issue("U_TEST01", TokenPurpose::Session)
            .expect("Failed to issue token");
        let user_id = service
            .verify(&token, TokenPurpose::Session)
            .expect("Failed to verify token");

        assert_eq!(user_id, "U_TEST01");
    }

    #[test]
    fn test_verify_fails_with_wrong_secret() {
        let issuer = SessionService::new("test_secret_key".to_string());
        let verifier = SessionService::new("a_different_secret".to_string());

        let token = issuer
            .issue("U_TEST01", TokenPurpose::EmailVerification)
            .expect("Failed to issue token");

        let result = verifier.verify(&token, TokenPurpose::EmailVerification);
        assert!(matches!(result, Err(TokenError::Invalid)));
    }

    #[test]
    fn test_verify_fails_on_purpose_mismatch() {
        let service = SessionService::new("test_secret_key".to_string());

        // A verification token must never pass as a login session
        let token = service
            .issue("U_TEST01", TokenPurpose::EmailVerification)
            .expect("Failed to issue token");

        let result = service.verify(&token, TokenPurpose::Session);
        assert!(matches!(result, Err(TokenError::PurposeMismatch)));
    }

    #[test]
    fn test_verify_fails_on_expired_token() {
        let service = SessionService::new("test_secret_key".to_string());

        // Craft a token that expired an hour ago
        let exp = (Utc::now() - Duration::hours(1)).timestamp() as usize;
        let claims = Claims {
            sub: "U_TEST01".to_string(),
            purpose: "session".to_string(),
            exp,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test_secret_key".as_bytes()),
        )
        .expect("Failed to encode token");

        let result = service.verify(&token, TokenPurpose::Session);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_verify_fails_on_garbage_token() {
        let service = SessionService::new("test_secret_key".to_string());

        let result = service.verify("not.a.token", TokenPurpose::Session);
        assert!(matches!(result, Err(TokenError::Invalid)));

        let result = service.verify("", TokenPurpose::Session);
        assert!(matches!(result, Err(TokenError::Invalid)));
    }
}
