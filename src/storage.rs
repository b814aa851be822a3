//! Persistence backends for the mapping store
//!
//! The engine persists its full state as two JSON documents under fixed
//! string keys, mirroring a browser local-storage area:
//!
//! - `urlShortener_urls`   — JSON object mapping shortcode -> record
//! - `urlShortener_clicks` — JSON object mapping shortcode -> click array
//!
//! A backend is any string key-value surface with `load`/`save`.
//! The store is constructed with a backend injected, so tests run against
//! [`MemoryBackend`] while real deployments use the redb-backed
//! [`RedbBackend`].

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

/// Storage key for the shortcode -> record map
pub const URLS_KEY: &str = "urlShortener_urls";

/// Storage key for the shortcode -> click log map
pub const CLICKS_KEY: &str = "urlShortener_clicks";

/// Single table holding the serialized state documents
///
/// Key: logical storage key (e.g. "urlShortener_urls")
/// Value: JSON document as a string
const TABLE_STATE: TableDefinition<&str, &str> = TableDefinition::new("state_v1");

/// A synchronous string key-value persistence surface
///
/// Every mutation of the mapping store rewrites the affected documents in
/// full; at this data scale the writes are small and fast, so the trait is
/// deliberately synchronous. Implementations report failures through
/// [`StorageError`]; the store logs them and carries on.
pub trait StorageBackend: Send {
    /// Returns the document stored under `key`, or `None` if absent.
    fn load(&mut self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous document.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory backend for tests and ephemeral use
///
/// The map lives behind a shared handle: cloning the backend yields another
/// view of the same state, so a test can drop a store and reopen a second
/// one over identical persisted data.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw document under `key`, for inspecting persisted state in tests.
    pub fn document(&self, key: &str) -> Option<String> {
        self.data.lock().unwrap().get(key).cloned()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&mut self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Durable backend over an embedded redb database
///
/// One table, one row per logical storage key. Each `save` runs in its own
/// write transaction, so a crash never leaves a half-written document.
pub struct RedbBackend {
    db: Database,
}

impl RedbBackend {
    /// Creates or opens the database file and ensures the state table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path).map_err(StorageError::backend)?;

        // Open the table once under a write transaction so that later reads
        // never race a missing table definition.
        let write_txn = db.begin_write().map_err(StorageError::backend)?;
        {
            write_txn
                .open_table(TABLE_STATE)
                .map_err(StorageError::backend)?;
        }
        write_txn.commit().map_err(StorageError::backend)?;

        Ok(RedbBackend { db })
    }
}

impl StorageBackend for RedbBackend {
    fn load(&mut self, key: &str) -> Result<Option<String>, StorageError> {
        let read_txn = self.db.begin_read().map_err(StorageError::backend)?;
        let table = read_txn
            .open_table(TABLE_STATE)
            .map_err(StorageError::backend)?;

        let value = table
            .get(key)
            .map_err(StorageError::backend)?
            .map(|guard| guard.value().to_string());

        Ok(value)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let write_txn = self.db.begin_write().map_err(StorageError::backend)?;
        {
            let mut table = write_txn
                .open_table(TABLE_STATE)
                .map_err(StorageError::backend)?;
            table.insert(key, value).map_err(StorageError::backend)?;
        }
        write_txn.commit().map_err(StorageError::backend)?;

        Ok(())
    }
}
