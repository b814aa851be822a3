//! Data models for the URL shortening engine
//!
//! This module defines all the data structures used throughout the crate,
//! including the persisted record shapes, click events, lookup results and
//! the read-only views handed to presentation code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum number of user-agent characters kept on a click event.
///
/// The truncated string doubles as a weak "unique visitor" proxy in the
/// statistics aggregator, so the cut-off is part of the data contract.
pub const USER_AGENT_MAX_CHARS: usize = 100;

/// A destination mapping stored under a shortcode
///
/// The shortcode itself is the map key and is not repeated inside the record.
/// Field names serialize camelCase to match the persisted JSON layout
/// (`{"originalUrl": ..., "createdAt": ..., "expiresAt": ...}`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    /// The original long URL that was shortened (validated http/https)
    pub original_url: String,

    /// Timestamp when this record was created
    pub created_at: DateTime<Utc>,

    /// Timestamp after which the mapping is no longer usable.
    /// Invariant: always strictly greater than `created_at`.
    pub expires_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Whether the record has passed its expiry instant.
    ///
    /// Expiry is always evaluated lazily against the current clock; expired
    /// records stay in the store until a sweep or an explicit delete.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// One recorded redirection through a shortcode
///
/// Events are kept in an append-only log per shortcode. The `id` is a
/// timestamp-plus-random-suffix string: unique in practice, not guaranteed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    /// Best-effort unique identifier (millis since epoch + random hex)
    pub id: String,

    /// Time of the click
    pub timestamp: DateTime<Utc>,

    /// Originating URL, or the literal value `"direct"` when there was none
    pub referrer: String,

    /// Client identifying string truncated to [`USER_AGENT_MAX_CHARS`].
    /// Used only as a weak uniqueness proxy for visitor counting.
    pub user_agent: String,

    /// Coarse location derived from the client timezone, never real geolocation
    pub location: String,
}

/// Raw click inputs supplied by the caller of `track_click`
///
/// All derivation (the `"direct"` fallback, user-agent truncation, the
/// timezone-to-location mapping) happens inside the store, so callers pass
/// whatever the surrounding runtime exposed, unmodified.
#[derive(Debug, Clone, Default)]
pub struct ClickMetadata {
    /// Referring URL, if the navigation had one
    pub referrer: Option<String>,

    /// Full client user-agent string, if available
    pub user_agent: Option<String>,

    /// IANA timezone name of the client (e.g. "Asia/Kolkata"), if available
    pub timezone: Option<String>,
}

/// Result of looking up a shortcode
///
/// Expiry is part of the lookup contract rather than a bolted-on flag:
/// an expired mapping still returns its record so presentation code can
/// show what expired, but callers must not redirect through it.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Mapping exists and is still usable
    Active(UrlRecord),
    /// Mapping exists but its expiry instant has passed
    Expired(UrlRecord),
    /// No mapping under this shortcode
    NotFound,
}

impl Lookup {
    /// The record, regardless of expiry, when one exists.
    pub fn record(&self) -> Option<&UrlRecord> {
        match self {
            Lookup::Active(record) | Lookup::Expired(record) => Some(record),
            Lookup::NotFound => None,
        }
    }
}

/// Read-only dashboard view of one mapping, annotated with its click log
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UrlSummary {
    /// Normalized (lowercase) shortcode
    pub shortcode: String,

    /// The original long URL
    pub original_url: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,

    /// Derived from the click log length, never stored independently
    pub click_count: usize,

    /// The full click log, in append order (oldest first)
    pub clicks: Vec<ClickEvent>,

    /// Computed against the current clock at listing time
    pub expired: bool,
}

/// Full dump of the store state, for export/backup
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    /// shortcode -> record
    pub urls: HashMap<String, UrlRecord>,

    /// shortcode -> click log
    pub clicks: HashMap<String, Vec<ClickEvent>>,

    /// When the snapshot was taken
    pub exported: DateTime<Utc>,
}
