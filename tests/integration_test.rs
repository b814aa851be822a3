//! Integration tests for the mapping store
//!
//! These tests verify the full engine stack including:
//! - Create/lookup/delete/track operations
//! - Persistence round-trips (in-memory and redb backends)
//! - Expiry tagging and sweeping
//! - Degraded behavior when persistence fails

use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use snaplink::error::{StorageError, StoreError};
use snaplink::model::{ClickMetadata, Lookup};
use snaplink::storage::{MemoryBackend, RedbBackend, StorageBackend, CLICKS_KEY, URLS_KEY};
use snaplink::sweeper::Sweeper;
use snaplink::UrlStore;

/// Helper to create a store over a shared in-memory backend
///
/// The returned backend handle views the same state as the store, so tests
/// can inspect persisted documents or reopen a second store over them.
fn memory_store() -> (UrlStore, MemoryBackend) {
    let backend = MemoryBackend::new();
    let store = UrlStore::open(Box::new(backend.clone()));
    (store, backend)
}

/// Helper to seed an already-expired mapping directly into a backend
fn seed_expired(backend: &mut MemoryBackend, shortcode: &str) {
    let expired_at = Utc::now() - Duration::minutes(5);
    let created_at = expired_at - Duration::minutes(30);
    let doc = serde_json::json!({
        shortcode: {
            "originalUrl": "https://example.com/old",
            "createdAt": created_at.to_rfc3339(),
            "expiresAt": expired_at.to_rfc3339(),
        }
    });
    backend.save(URLS_KEY, &doc.to_string()).unwrap();
}

#[test]
fn test_create_generates_six_char_lowercase_code() {
    let (mut store, _backend) = memory_store();

    let summary = store
        .create("https://example.com/page", None, 30)
        .expect("create should succeed");

    assert_eq!(summary.shortcode.len(), 6);
    assert!(summary
        .shortcode
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    assert_eq!(summary.expires_at - summary.created_at, Duration::minutes(30));
    assert!(store.exists(&summary.shortcode));
}

#[test]
fn test_create_with_custom_code_normalizes_case() {
    let (mut store, _backend) = memory_store();

    let summary = store
        .create("https://example.com/a", Some("MyLink9"), 60)
        .unwrap();

    assert_eq!(summary.shortcode, "mylink9");
    assert!(store.exists("mylink9"));
    assert!(store.exists("MYLINK9")); // case-insensitive
}

#[test]
fn test_duplicate_custom_code_rejected() {
    let (mut store, _backend) = memory_store();

    store
        .create("https://example.com/first", Some("abc123"), 30)
        .unwrap();
    let err = store
        .create("https://example.com/first", Some("abc123"), 30)
        .unwrap_err();

    assert_eq!(err, StoreError::DuplicateShortcode("abc123".to_string()));
    // A differently-cased spelling collides too.
    let err = store
        .create("https://example.com/first", Some("ABC123"), 30)
        .unwrap_err();
    assert_eq!(err, StoreError::DuplicateShortcode("abc123".to_string()));

    // Store still contains exactly one record for the code.
    let all = store.list_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].shortcode, "abc123");
}

#[test]
fn test_short_custom_code_rejected_before_mutation() {
    let (mut store, _backend) = memory_store();

    let err = store
        .create("https://example.com/page", Some("ab"), 30)
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidShortcode(_)));
    assert!(!store.exists("ab"));
    assert!(store.list_all().is_empty());
}

#[test]
fn test_invalid_destination_rejected() {
    let (mut store, _backend) = memory_store();

    for bad in ["", "not a url", "ftp://example.com/file", "example.com/nope"] {
        let err = store.create(bad, None, 30).unwrap_err();
        assert!(matches!(err, StoreError::InvalidUrl(_)), "accepted {bad:?}");
    }
    assert!(store.list_all().is_empty());
}

#[test]
fn test_zero_validity_rejected() {
    let (mut store, _backend) = memory_store();

    assert!(store.create("https://example.com", None, 0).is_err());
    assert!(store.create("https://example.com", None, -5).is_err());
}

#[test]
fn test_exists_and_delete_semantics() {
    let (mut store, _backend) = memory_store();

    store
        .create("https://example.com/page", Some("gone1"), 30)
        .unwrap();

    assert!(store.exists("gone1"));
    assert!(store.delete("gone1"));
    assert!(!store.exists("gone1"));
    // Deleting again reports absence.
    assert!(!store.delete("gone1"));
    // The click log went with the record.
    assert_eq!(store.click_stats("gone1").total, 0);
}

#[test]
fn test_get_unknown_code_is_not_found() {
    let (store, _backend) = memory_store();
    assert_eq!(store.get("zzzzzz"), Lookup::NotFound);
}

#[test]
fn test_expired_lookup_is_tagged_not_deleted() {
    let mut backend = MemoryBackend::new();
    seed_expired(&mut backend, "old123");
    let mut store = UrlStore::open(Box::new(backend));

    let lookup = store.get("old123");
    assert!(matches!(lookup, Lookup::Expired(_)));
    assert_eq!(
        lookup.record().unwrap().original_url,
        "https://example.com/old"
    );

    // Tracking against an expired mapping fails and appends nothing.
    assert!(!store.track_click("old123", ClickMetadata::default()));
    assert_eq!(store.click_stats("old123").total, 0);

    // Lookup did not delete the record.
    assert!(store.exists("old123"));
}

#[test]
fn test_track_click_derives_event_fields() {
    let (mut store, _backend) = memory_store();
    store
        .create("https://example.com/page", Some("hit123"), 30)
        .unwrap();

    let long_agent = "x".repeat(150);
    let tracked = store.track_click(
        "hit123",
        ClickMetadata {
            referrer: Some("https://news.ycombinator.com/item?id=1".to_string()),
            user_agent: Some(long_agent),
            timezone: Some("Asia/Kolkata".to_string()),
        },
    );
    assert!(tracked);

    let stats = store.click_stats("hit123");
    assert_eq!(stats.total, 1);
    assert_eq!(stats.referrer_stats["news.ycombinator.com"], 1);
    assert_eq!(stats.location_stats["India"], 1);

    let event = &stats.recent_clicks[0];
    assert_eq!(event.user_agent.chars().count(), 100); // truncated
    assert!(!event.id.is_empty());
}

#[test]
fn test_track_click_falls_back_to_direct_and_unknown() {
    let (mut store, _backend) = memory_store();
    store
        .create("https://example.com/page", Some("plain1"), 30)
        .unwrap();

    assert!(store.track_click("plain1", ClickMetadata::default()));

    let stats = store.click_stats("plain1");
    assert_eq!(stats.referrer_stats["direct"], 1);
    assert_eq!(stats.location_stats["Unknown"], 1);
}

#[test]
fn test_three_clicks_aggregate_to_three() {
    let (mut store, _backend) = memory_store();
    store
        .create("https://example.com/page", Some("trio99"), 30)
        .unwrap();

    for _ in 0..3 {
        assert!(store.track_click("trio99", ClickMetadata::default()));
    }

    let stats = store.click_stats("trio99");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.hourly_stats.iter().sum::<u64>(), 3);
    assert_eq!(stats.recent_clicks.len(), 3);
}

#[test]
fn test_list_all_is_sorted_newest_first_and_annotated() {
    let (mut store, _backend) = memory_store();

    store.create("https://example.com/1", Some("first1"), 30).unwrap();
    store.create("https://example.com/2", Some("second"), 30).unwrap();
    store.create("https://example.com/3", Some("third1"), 30).unwrap();
    store.track_click("second", ClickMetadata::default());

    let all = store.list_all();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].shortcode, "third1");
    assert_eq!(all[2].shortcode, "first1");
    assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let second = all.iter().find(|s| s.shortcode == "second").unwrap();
    assert_eq!(second.click_count, 1);
    assert_eq!(second.clicks.len(), 1);
}

#[test]
fn test_round_trip_through_memory_backend() {
    let backend = MemoryBackend::new();

    let created = {
        let mut store = UrlStore::open(Box::new(backend.clone()));
        let summary = store.create("https://example.com/page", None, 30).unwrap();
        store.track_click(&summary.shortcode, ClickMetadata::default());
        store.track_click(&summary.shortcode, ClickMetadata::default());
        (summary.shortcode.clone(), store.get(&summary.shortcode))
    };

    // Reopen a fresh store over the same persisted state.
    let reopened = UrlStore::open(Box::new(backend.clone()));
    let (shortcode, lookup) = created;

    // Records compare equal, timestamps as instants.
    assert_eq!(reopened.get(&shortcode), lookup);
    assert_eq!(reopened.click_stats(&shortcode).total, 2);
    assert_eq!(reopened.total_clicks(), 2);
}

#[test]
fn test_round_trip_through_redb_backend() {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp_db.path().to_path_buf();

    let (shortcode, lookup) = {
        let backend = RedbBackend::open(&path).expect("Failed to open redb backend");
        let mut store = UrlStore::open(Box::new(backend));
        let summary = store
            .create("https://example.com/durable", Some("keep99"), 120)
            .unwrap();
        store.track_click(&summary.shortcode, ClickMetadata::default());
        (summary.shortcode.clone(), store.get(&summary.shortcode))
    };

    // The first database handle is dropped; reopen the same file.
    let backend = RedbBackend::open(&path).expect("Failed to reopen redb backend");
    let reopened = UrlStore::open(Box::new(backend));

    assert_eq!(reopened.get(&shortcode), lookup);
    assert_eq!(reopened.click_stats(&shortcode).total, 1);
}

#[test]
fn test_load_normalizes_legacy_uppercase_keys() {
    let mut backend = MemoryBackend::new();
    let now = Utc::now();
    let doc = serde_json::json!({
        "ABC123": {
            "originalUrl": "https://example.com/legacy",
            "createdAt": now.to_rfc3339(),
            "expiresAt": (now + Duration::minutes(30)).to_rfc3339(),
        }
    });
    backend.save(URLS_KEY, &doc.to_string()).unwrap();

    let store = UrlStore::open(Box::new(backend));
    assert!(store.exists("abc123"));
    assert_eq!(store.list_all()[0].shortcode, "abc123");
}

#[test]
fn test_malformed_persisted_state_starts_empty() {
    let mut backend = MemoryBackend::new();
    backend.save(URLS_KEY, "{ this is not json").unwrap();

    let store = UrlStore::open(Box::new(backend));
    assert!(store.list_all().is_empty());
}

#[test]
fn test_sweep_removes_expired_and_is_idempotent() {
    let mut backend = MemoryBackend::new();
    seed_expired(&mut backend, "old123");
    let mut store = UrlStore::open(Box::new(backend));
    store
        .create("https://example.com/fresh", Some("fresh1"), 60)
        .unwrap();

    assert_eq!(store.sweep_expired(), 1);
    assert!(!store.exists("old123"));
    assert!(store.exists("fresh1"));

    // Nothing new expired: the second sweep is a no-op.
    assert_eq!(store.sweep_expired(), 0);
}

/// Backend whose writes always fail, to exercise degraded persistence
struct FailingBackend;

impl StorageBackend for FailingBackend {
    fn load(&mut self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn save(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Backend("quota exceeded".to_string()))
    }
}

#[test]
fn test_persistence_failure_still_applies_in_memory() {
    let mut store = UrlStore::open(Box::new(FailingBackend));

    // The save fails internally but the operation must not.
    let summary = store
        .create("https://example.com/page", Some("best99"), 30)
        .unwrap();
    assert!(store.exists(&summary.shortcode));
    assert!(store.track_click(&summary.shortcode, ClickMetadata::default()));
    assert_eq!(store.click_stats(&summary.shortcode).total, 1);
}

#[test]
fn test_persisted_layout_is_camel_case_json() {
    let (mut store, backend) = memory_store();
    store
        .create("https://example.com/page", Some("abc123"), 30)
        .unwrap();
    store.track_click("abc123", ClickMetadata::default());

    let urls_doc: serde_json::Value =
        serde_json::from_str(&backend.document(URLS_KEY).unwrap()).unwrap();
    assert!(urls_doc["abc123"]["originalUrl"].is_string());
    assert!(urls_doc["abc123"]["createdAt"].is_string());
    assert!(urls_doc["abc123"]["expiresAt"].is_string());

    let clicks_doc: serde_json::Value =
        serde_json::from_str(&backend.document(CLICKS_KEY).unwrap()).unwrap();
    assert_eq!(clicks_doc["abc123"][0]["referrer"], "direct");
    assert!(clicks_doc["abc123"][0]["userAgent"].is_string());
    assert!(clicks_doc["abc123"][0]["timestamp"].is_string());
    assert!(clicks_doc["abc123"][0]["location"].is_string());
}

#[test]
fn test_export_data_snapshot() {
    let (mut store, _backend) = memory_store();
    store.create("https://example.com/1", Some("exp001"), 30).unwrap();
    store.create("https://example.com/2", Some("exp002"), 30).unwrap();
    store.track_click("exp001", ClickMetadata::default());

    let snapshot = store.export_data();
    assert_eq!(snapshot.urls.len(), 2);
    assert_eq!(snapshot.clicks["exp001"].len(), 1);
    assert!(snapshot.exported <= Utc::now());
}

#[tokio::test]
async fn test_sweeper_removes_expired_and_stops_cleanly() {
    let mut backend = MemoryBackend::new();
    seed_expired(&mut backend, "old123");
    let store = Arc::new(Mutex::new(UrlStore::open(Box::new(backend))));

    let sweeper = Sweeper::start(store.clone(), std::time::Duration::from_millis(50));
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    sweeper.stop().await;

    assert!(!store.lock().unwrap().exists("old123"));
}
