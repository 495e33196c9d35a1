use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The authenticated user.
///
/// Created on successful login or registration, persisted through the
/// [`IdentityStore`](crate::store::IdentityStore), and destroyed on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Email address the account is keyed by.
    pub email: String,

    /// Display name reported by the service.
    pub name: String,
}

impl Identity {
    /// Create a new `Identity`.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Checks a password against the registration policy.
///
/// The password must be at least 8 characters and contain an upper-case
/// letter, a lower-case letter, a digit, and a symbol outside the
/// alphanumeric set. The check runs locally; a failing password never
/// reaches the network.
pub fn validate_password(password: &str) -> Result<()> {
    let long_enough = password.chars().count() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());

    if long_enough && has_upper && has_lower && has_digit && has_symbol {
        Ok(())
    } else {
        Err(Error::validation(
            "Password must be at least 8 characters, include uppercase, lowercase, number, and special character.",
            Some("password".to_string()),
        ))
    }
}
