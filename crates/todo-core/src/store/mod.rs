//! The three state stores.
//!
//! Each store loads once when it is constructed, keeps its data in memory,
//! and on every mutation writes the whole collection back under its key and
//! publishes the new snapshot. A write that fails leaves the previous state
//! in place.

mod categories;
mod error;
mod flags;
mod tasks;

pub use categories::CategoryStore;
pub use error::StoreError;
pub use flags::{FallbackSource, FeatureFlagStore, InitState};
pub use tasks::TaskStore;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::KeyValueStore;

/// Storage handle shared by all stores of one process.
pub type SharedStorage = Arc<dyn KeyValueStore>;

/// Reads and decodes the value under `key`. `Ok(None)` if nothing was stored.
pub(crate) fn load<T: DeserializeOwned>(
    storage: &SharedStorage,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let raw = storage.get(key).map_err(|source| StoreError::StorageRead {
        key: key.to_string(),
        source,
    })?;

    match raw {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encodes `value` and writes it under `key`.
pub(crate) fn persist<T: Serialize + ?Sized>(
    storage: &SharedStorage,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })?;
    storage
        .set(key, &json)
        .map_err(|source| StoreError::StorageWrite {
            key: key.to_string(),
            source,
        })?;
    tracing::debug!(key, bytes = json.len(), "persisted");
    Ok(())
}
