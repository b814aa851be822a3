//! The mapping store: single source of truth for shortcode mappings
//!
//! `UrlStore` owns the shortcode -> record map and the per-shortcode click
//! logs, and rewrites both persisted documents through its injected
//! [`StorageBackend`] on every mutation. Persistence failures are logged and
//! swallowed: the in-memory effect of an operation always applies, durability
//! for that mutation is best-effort.

use chrono::{Duration, Utc};
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::error::{StorageError, StoreError};
use crate::model::{
    ClickEvent, ClickMetadata, ExportSnapshot, Lookup, UrlRecord, UrlSummary, USER_AGENT_MAX_CHARS,
};
use crate::shortcode;
use crate::stats::{self, ClickStats, DIRECT_REFERRER};
use crate::storage::{StorageBackend, CLICKS_KEY, URLS_KEY};
use crate::validate::{validate_custom_code, validate_url, validate_validity};
use crate::location::approximate_location;

/// Mapping store over an injected persistence backend
///
/// All shortcodes are normalized to lowercase at every entry point, so the
/// maps are keyed case-insensitively. Reads never mutate; every mutating
/// operation persists before returning.
pub struct UrlStore {
    backend: Box<dyn StorageBackend>,
    urls: HashMap<String, UrlRecord>,
    clicks: HashMap<String, Vec<ClickEvent>>,
}

impl UrlStore {
    /// Opens a store over `backend`, loading any previously persisted state.
    ///
    /// Load failures (backend I/O, malformed JSON) are logged and treated as
    /// an empty store; they never prevent startup.
    pub fn open(backend: Box<dyn StorageBackend>) -> Self {
        let mut store = UrlStore {
            backend,
            urls: HashMap::new(),
            clicks: HashMap::new(),
        };
        store.load_from_storage();
        store
    }

    /// Convenience constructor for an ephemeral in-memory store.
    pub fn in_memory() -> Self {
        Self::open(Box::new(crate::storage::MemoryBackend::new()))
    }

    fn load_from_storage(&mut self) {
        if let Some(urls) = self.load_document::<HashMap<String, UrlRecord>>(URLS_KEY) {
            // Re-normalize on load; older persisted state may predate the
            // lowercase-at-entry rule.
            self.urls = urls
                .into_iter()
                .map(|(code, record)| (code.to_lowercase(), record))
                .collect();
        }
        if let Some(clicks) = self.load_document::<HashMap<String, Vec<ClickEvent>>>(CLICKS_KEY) {
            self.clicks = clicks
                .into_iter()
                .map(|(code, log)| (code.to_lowercase(), log))
                .collect();
        }

        info!(
            url_count = self.urls.len(),
            total_clicks = self.total_clicks(),
            "storage loaded"
        );
    }

    fn load_document<T: serde::de::DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        match self.backend.load(key) {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!(key, error = %err, "persisted document is malformed, starting empty");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(key, error = %err, "failed to load persisted document");
                None
            }
        }
    }

    /// Creates a new mapping.
    ///
    /// When `custom_code` is given it is validated (3-10 alphanumeric chars)
    /// and lowercased; otherwise a 6-character code is drawn from the
    /// generator. Fails with [`StoreError::DuplicateShortcode`] when the
    /// normalized code is already mapped. Nothing is mutated on any failure.
    pub fn create(
        &mut self,
        original_url: &str,
        custom_code: Option<&str>,
        validity_minutes: i64,
    ) -> Result<UrlSummary, StoreError> {
        validate_url(original_url)?;
        validate_validity(validity_minutes)?;

        // Treat an empty custom code the same as none supplied.
        let custom_code = custom_code.filter(|code| !code.trim().is_empty());

        let shortcode = match custom_code {
            Some(code) => {
                validate_custom_code(code)?;
                let normalized = code.to_lowercase();
                if self.urls.contains_key(&normalized) {
                    return Err(StoreError::DuplicateShortcode(normalized));
                }
                normalized
            }
            None => {
                let urls = &self.urls;
                shortcode::generate_unique(|candidate| urls.contains_key(candidate))?
            }
        };

        let created_at = Utc::now();
        let record = UrlRecord {
            original_url: original_url.trim().to_string(),
            created_at,
            expires_at: created_at + Duration::minutes(validity_minutes),
        };

        self.urls.insert(shortcode.clone(), record.clone());
        self.clicks.insert(shortcode.clone(), Vec::new());
        self.persist();

        info!(%shortcode, original_url = %record.original_url, "URL created");

        Ok(UrlSummary {
            shortcode,
            original_url: record.original_url,
            created_at: record.created_at,
            expires_at: record.expires_at,
            click_count: 0,
            clicks: Vec::new(),
            expired: false,
        })
    }

    /// Looks up a shortcode.
    ///
    /// Never mutates: an expired mapping is tagged, not deleted, so callers
    /// can distinguish "gone" from "was here but lapsed".
    pub fn get(&self, shortcode: &str) -> Lookup {
        let normalized = shortcode.to_lowercase();
        match self.urls.get(&normalized) {
            Some(record) if record.is_expired() => {
                debug!(shortcode = %normalized, "URL access attempted - expired");
                Lookup::Expired(record.clone())
            }
            Some(record) => Lookup::Active(record.clone()),
            None => Lookup::NotFound,
        }
    }

    /// Removes a mapping and its click log in one operation.
    ///
    /// Returns `false` when the shortcode was not present.
    pub fn delete(&mut self, shortcode: &str) -> bool {
        let normalized = shortcode.to_lowercase();
        let deleted = self.urls.remove(&normalized).is_some();
        self.clicks.remove(&normalized);

        if deleted {
            self.persist();
            info!(shortcode = %normalized, "URL deleted");
        }

        deleted
    }

    /// Records one click against an active mapping.
    ///
    /// Returns `false` without appending when the mapping is absent or
    /// expired. Referrer, user-agent and location derivation all happen here
    /// so callers pass raw metadata.
    pub fn track_click(&mut self, shortcode: &str, metadata: ClickMetadata) -> bool {
        let normalized = shortcode.to_lowercase();
        match self.get(&normalized) {
            Lookup::Active(_) => {}
            Lookup::Expired(_) | Lookup::NotFound => return false,
        }

        let click = build_click(metadata);
        info!(
            shortcode = %normalized,
            referrer = %click.referrer,
            location = %click.location,
            "click tracked"
        );

        self.clicks.entry(normalized).or_default().push(click);
        self.persist();

        true
    }

    /// Case-insensitive existence check.
    pub fn exists(&self, shortcode: &str) -> bool {
        self.urls.contains_key(&shortcode.to_lowercase())
    }

    /// All mappings (expired included), newest first, annotated with their
    /// click logs and derived click counts.
    pub fn list_all(&self) -> Vec<UrlSummary> {
        let mut summaries: Vec<UrlSummary> = self
            .urls
            .iter()
            .map(|(shortcode, record)| {
                let clicks = self.clicks.get(shortcode).cloned().unwrap_or_default();
                UrlSummary {
                    shortcode: shortcode.clone(),
                    original_url: record.original_url.clone(),
                    created_at: record.created_at,
                    expires_at: record.expires_at,
                    click_count: clicks.len(),
                    clicks,
                    expired: record.is_expired(),
                }
            })
            .collect();

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    /// Removes every mapping whose expiry has passed, returning the count.
    ///
    /// Persists only when something was actually removed, so back-to-back
    /// sweeps with no new expirations are free.
    pub fn sweep_expired(&mut self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = self
            .urls
            .iter()
            .filter(|(_, record)| now > record.expires_at)
            .map(|(code, _)| code.clone())
            .collect();

        for code in &expired {
            self.urls.remove(code);
            self.clicks.remove(code);
        }

        if !expired.is_empty() {
            self.persist();
            info!(count = expired.len(), "expired URLs cleared");
        }

        expired.len()
    }

    /// On-demand statistics for one shortcode's click log.
    pub fn click_stats(&self, shortcode: &str) -> ClickStats {
        match self.clicks.get(&shortcode.to_lowercase()) {
            Some(log) => stats::aggregate(log),
            None => stats::aggregate(&[]),
        }
    }

    /// Total clicks recorded across all mappings.
    pub fn total_clicks(&self) -> usize {
        self.clicks.values().map(Vec::len).sum()
    }

    /// Full copy of the store state for export/backup.
    pub fn export_data(&self) -> ExportSnapshot {
        ExportSnapshot {
            urls: self.urls.clone(),
            clicks: self.clicks.clone(),
            exported: Utc::now(),
        }
    }

    /// Rewrites both persisted documents.
    ///
    /// Failures are logged and swallowed: callers already hold the updated
    /// in-memory state and must not be blocked by a persistence problem.
    fn persist(&mut self) {
        let urls_doc = serde_json::to_string(&self.urls).map_err(StorageError::from);
        let clicks_doc = serde_json::to_string(&self.clicks).map_err(StorageError::from);

        for (key, doc) in [(URLS_KEY, urls_doc), (CLICKS_KEY, clicks_doc)] {
            let result = doc.and_then(|doc| self.backend.save(key, &doc));
            if let Err(err) = result {
                error!(key, error = %err, "failed to persist store state");
            }
        }
    }
}

/// Builds a click event from raw caller metadata.
fn build_click(metadata: ClickMetadata) -> ClickEvent {
    let referrer = metadata
        .referrer
        .filter(|referrer| !referrer.trim().is_empty())
        .unwrap_or_else(|| DIRECT_REFERRER.to_string());

    // Char-wise truncation keeps the cut multi-byte safe.
    let user_agent: String = metadata
        .user_agent
        .unwrap_or_default()
        .chars()
        .take(USER_AGENT_MAX_CHARS)
        .collect();

    let suffix: u32 = rand::rng().random_range(0..0x1_0000);
    ClickEvent {
        id: format!("{}-{:04x}", Utc::now().timestamp_millis(), suffix),
        timestamp: Utc::now(),
        referrer,
        user_agent,
        location: approximate_location(metadata.timezone.as_deref()),
    }
}
