//! Error taxonomy for the engine
//!
//! Two deliberately separate families:
//!
//! - [`StoreError`] — operational failures reported to the caller before any
//!   state mutation (validation, duplicates, generator exhaustion).
//! - [`StorageError`] — persistence-layer failures. These never escape the
//!   mapping store: they are caught at the boundary and logged, and the
//!   in-memory effect of the operation still applies (degraded durability
//!   is accepted behavior for a local single-writer store).

use thiserror::Error;

/// Failures surfaced to callers of the mapping store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Destination URL failed validation (must be absolute http/https)
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Custom shortcode failed validation (length 3-10, alphanumeric only)
    #[error("invalid shortcode: {0}")]
    InvalidShortcode(String),

    /// Requested validity duration cannot satisfy `expires_at > created_at`
    #[error("invalid validity: {0}")]
    InvalidValidity(String),

    /// The (case-normalized) shortcode is already mapped
    #[error("shortcode already exists: {0}")]
    DuplicateShortcode(String),

    /// The generator ran out of attempts without finding a free code.
    /// With a 36^6 keyspace this signals a saturated store, not bad luck.
    #[error("unable to generate a unique shortcode")]
    GenerationExhausted,
}

/// Failures inside a persistence backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend I/O failure (open, read, write, commit)
    #[error("storage backend error: {0}")]
    Backend(String),

    /// State could not be encoded or decoded as JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        StorageError::Backend(err.to_string())
    }
}
