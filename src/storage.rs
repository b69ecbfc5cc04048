//! Durable key-value storage boundary.
//!
//! Every persistent collection (catalog, comments, cart, orders, session
//! identity) lives under one storage key as a JSON array of records. The
//! helpers here enforce the degradation rules at the read boundary: a missing
//! or malformed key reads as the empty collection, and the record types
//! default malformed numeric fields to zero, so consumers never have to guard
//! against corrupt stored data themselves.
//!
//! Two embedders sharing one store race last-writer-wins; that is an accepted
//! property of the storage model, not something this layer compensates for.
//! Callers that need to observe external writers simply re-read, which the
//! cart service does on every read operation.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::errors::ServiceError;

/// Error raised by a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Synchronous key-value storage, the localStorage analog.
///
/// Implementations must be cheap to read: services re-read their collection
/// on every operation rather than caching it.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store used by tests and short-lived embedders.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::Backend("store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Backend("store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Backend("store lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Reads the collection stored under `key`.
///
/// A missing key or a payload that does not parse as a JSON array of records
/// yields the empty collection. Parse failures are logged, never propagated.
pub fn read_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, ServiceError> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str(&raw) {
        Ok(records) => Ok(records),
        Err(err) => {
            warn!(key, %err, "malformed stored collection, reading as empty");
            Ok(Vec::new())
        }
    }
}

/// Replaces the collection stored under `key`.
pub fn write_collection<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    records: &[T],
) -> Result<(), ServiceError> {
    let raw = serde_json::to_string(records)?;
    store.put(key, &raw)?;
    Ok(())
}
