use garde::Validate;
use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AppError, Result};

/// Shown when either field is blank.
pub const MISSING_FIELDS: &str = "Please fill in all fields.";
/// Shown when the email is not well formed.
pub const INVALID_EMAIL: &str = "Please enter a valid email address.";

/// The login form body. Both fields default to empty so a missing field
/// surfaces as a validation message rather than a rejected request.
#[derive(Deserialize, Default, Zeroize, ZeroizeOnDrop)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Validate)]
struct EmailAddress {
    #[garde(email, custom(has_dotted_domain))]
    value: String,
}

/// The domain must consist of at least two non-empty dot-separated labels.
fn has_dotted_domain(value: &str, _: &()) -> garde::Result {
    let domain = value
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .unwrap_or_default();
    let mut labels = domain.split('.');
    let well_formed = domain.contains('.') && labels.all(|label| !label.is_empty());
    if well_formed {
        Ok(())
    } else {
        Err(garde::Error::new("domain must contain a dot-separated label"))
    }
}

/// Trims the submitted email the way the login form expects it.
pub fn normalize_email(email: &str) -> &str {
    email.trim()
}

/// Validates a login submission.
///
/// # Arguments
///
/// * `email` - The already-trimmed email.
/// * `password` - The password, untouched.
///
/// # Returns
///
/// A `Result<()>` carrying the user-facing message on failure.
pub fn validate_login(email: &str, password: &str) -> Result<()> {
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation(MISSING_FIELDS.to_string()));
    }

    let candidate = EmailAddress {
        value: email.to_string(),
    };
    if candidate.validate().is_err() {
        return Err(AppError::Validation(INVALID_EMAIL.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<()>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn blank_fields_are_rejected_first() {
        assert_eq!(message(validate_login("", "secret")), MISSING_FIELDS);
        assert_eq!(message(validate_login("a@b.co", "")), MISSING_FIELDS);
        assert_eq!(message(validate_login("not-an-email", "")), MISSING_FIELDS);
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["plainaddress", "@example.com", "john@", "john@example", "john@example."] {
            assert_eq!(message(validate_login(email, "secret")), INVALID_EMAIL, "{}", email);
        }
    }

    #[test]
    fn well_formed_emails_pass() {
        assert!(validate_login("admin@securecrm.com", "admin123").is_ok());
        assert!(validate_login("john.doe@mail.example.org", "x").is_ok());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(normalize_email("  john@example.com \n"), "john@example.com");
    }
}
