use thiserror::Error;

use crate::remote::RemoteConfigError;
use crate::storage::StorageError;

/// Errors raised inside the stores.
///
/// Store methods catch and log these; only the validation helpers hand them
/// to callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {key}: {source}")]
    StorageRead {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to write {key}: {source}")]
    StorageWrite {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Corrupt data under {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Remote config fetch failed: {0}")]
    RemoteConfigFetch(#[from] RemoteConfigError),

    #[error("Validation failed: {0}")]
    Validation(String),
}
