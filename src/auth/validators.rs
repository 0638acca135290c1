// src/auth/validators.rs

use super::models::SignupForm;
use crate::common::{ValidationResult, Validator};

pub struct SignupValidator;

impl Validator<SignupForm> for SignupValidator {
    fn validate(&self, data: &SignupForm) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Name is required");
        } else if data.name.len() > 100 {
            result.add_error("name", "Name must be less than 100 characters");
        }

        if data.email.trim().is_empty() {
            result.add_error("email", "Email is required");
        } else if !is_plausible_email(&data.email) {
            result.add_error("email", "Email address is not valid");
        }

        if data.password.len() < 8 {
            result.add_error("password", "Password must be at least 8 characters");
        } else if data.password.len() > 200 {
            result.add_error("password", "Password must be less than 200 characters");
        }

        result
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, password: &str) -> SignupForm {
        SignupForm {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_signup_passes() {
        let result = SignupValidator.validate(&form("Ada", "ada@example.com", "longenough"));
        assert!(result.is_valid);
        assert_eq!(result.errors.len(), 0);
    }

    #[test]
    fn test_empty_name_fails() {
        let result = SignupValidator.validate(&form("  ", "ada@example.com", "longenough"));
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "name"));
    }

    #[test]
    fn test_bad_email_fails() {
        for email in ["", "no-at-sign", "a@b", "a@.com", "a@com."] {
            let result = SignupValidator.validate(&form("Ada", email, "longenough"));
            assert!(!result.is_valid, "email '{}' should fail validation", email);
            assert!(result.errors.iter().any(|e| e.field == "email"));
        }
    }

    #[test]
    fn test_short_password_fails() {
        let result = SignupValidator.validate(&form("Ada", "ada@example.com", "short"));
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "password"));
    }
}
