//! Field-level validation helpers shared by request DTOs and repositories.
//!
//! The functions here return `Result<(), String>` so they can be reused from
//! both `validator` custom hooks and plain handler code.

use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidateEmail, ValidationError};

use crate::error::CoreError;

/// Minimum accepted password length for new accounts and password changes.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Message used whenever a create payload lacks a mandatory field.
pub const MISSING_FIELDS_MESSAGE: &str = "Please provide all required fields";

/// Ten ASCII digits, nothing else.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{10}$").expect("phone pattern is a valid regex")
});

/// The nodal-officer email pattern stored agencies have always been held to.
static OFFICER_EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([\.-]?\w+)*@\w+([\.-]?\w+)*(\.\w{2,3})+$")
        .expect("officer email pattern is a valid regex")
});

/// Validate a 10-digit phone number.
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err("Please provide a valid 10-digit phone number".to_string())
    }
}

/// Validate a nodal officer's email against the agency email pattern.
pub fn validate_officer_email(email: &str) -> Result<(), String> {
    if OFFICER_EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err("Please provide a valid email".to_string())
    }
}

/// Validate an account email (RFC-ish check from `validator`).
pub fn validate_account_email(email: &str) -> Result<(), String> {
    if email.validate_email() {
        Ok(())
    } else {
        Err("Please provide a valid email".to_string())
    }
}

/// Validate that a password meets the minimum length.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    Ok(())
}

/// Require every listed field to be present and non-blank.
///
/// Mirrors the "all required fields" gate in front of every create operation:
/// a single generic message, no per-field detail.
pub fn require_fields(fields: &[Option<&str>]) -> Result<(), CoreError> {
    let all_present = fields
        .iter()
        .all(|f| f.is_some_and(|value| !value.trim().is_empty()));
    if all_present {
        Ok(())
    } else {
        Err(CoreError::Validation(MISSING_FIELDS_MESSAGE.to_string()))
    }
}

// ---------------------------------------------------------------------------
// `validator` custom hooks
// ---------------------------------------------------------------------------

/// Adapter for `#[validate(custom(function = "phone"))]`.
pub fn phone(value: &str) -> Result<(), ValidationError> {
    validate_phone(value).map_err(|msg| ValidationError::new("phone").with_message(msg.into()))
}

/// Adapter for `#[validate(custom(function = "officer_email"))]`.
pub fn officer_email(value: &str) -> Result<(), ValidationError> {
    validate_officer_email(value)
        .map_err(|msg| ValidationError::new("email").with_message(msg.into()))
}
