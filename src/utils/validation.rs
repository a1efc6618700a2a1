use std::sync::OnceLock;

use regex::Regex;

use crate::utils::error::CustomError;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("valid phone regex"))
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url regex"))
}

pub fn validate_email(email: &str) -> Result<(), CustomError> {
    if !email_pattern().is_match(email.trim()) {
        return Err(CustomError::ValidationError(format!("'{}' is not a valid email address", email)));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), CustomError> {
    if !phone_pattern().is_match(phone.trim()) {
        return Err(CustomError::ValidationError(format!("'{}' is not a valid phone number", phone)));
    }
    Ok(())
}

pub fn validate_url(url: &str) -> Result<(), CustomError> {
    if !url_pattern().is_match(url.trim()) {
        return Err(CustomError::ValidationError(format!("'{}' is not a valid URL", url)));
    }
    Ok(())
}

/// Trimmed, non-empty, and at most `max` characters.
pub fn require_text(field: &str, value: &str, max: usize) -> Result<String, CustomError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CustomError::BadRequestError(format!("{} cannot be empty", field)));
    }
    if trimmed.chars().count() > max {
        return Err(CustomError::ValidationError(format!(
            "{} must be at most {} characters long",
            field, max
        )));
    }
    Ok(trimmed.to_string())
}

/// Like [`require_text`] but blank input becomes `None`.
pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>, CustomError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => require_text(field, text, max).map(Some),
    }
}
