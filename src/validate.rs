//! Input validation for shorten requests
//!
//! All checks run before any store mutation; a rejected request leaves the
//! store untouched.

use url::Url;

use crate::error::StoreError;

/// Minimum custom shortcode length
pub const CODE_MIN_LEN: usize = 3;

/// Maximum custom shortcode length
pub const CODE_MAX_LEN: usize = 10;

/// Validates a destination URL.
///
/// Must parse as an absolute URL with an `http` or `https` scheme.
pub fn validate_url(raw: &str) -> Result<(), StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidUrl("URL is required".into()));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|_| StoreError::InvalidUrl(format!("not a valid URL: {trimmed}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(StoreError::InvalidUrl(format!(
            "URL must start with http:// or https://, got scheme {other:?}"
        ))),
    }
}

/// Validates a user-supplied custom shortcode.
///
/// Custom codes may be mixed case (they are lowercased at the store
/// boundary) but must be 3-10 ASCII alphanumeric characters.
pub fn validate_custom_code(code: &str) -> Result<(), StoreError> {
    if code.len() < CODE_MIN_LEN || code.len() > CODE_MAX_LEN {
        return Err(StoreError::InvalidShortcode(format!(
            "shortcode must be {CODE_MIN_LEN}-{CODE_MAX_LEN} characters"
        )));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(StoreError::InvalidShortcode(
            "only letters and numbers allowed".into(),
        ));
    }
    Ok(())
}

/// Validates a requested validity duration.
///
/// The expiry invariant (`expires_at > created_at`) requires at least one
/// minute of validity.
pub fn validate_validity(minutes: i64) -> Result<(), StoreError> {
    if minutes < 1 {
        return Err(StoreError::InvalidValidity(
            "validity must be at least 1 minute".into(),
        ));
    }
    Ok(())
}
