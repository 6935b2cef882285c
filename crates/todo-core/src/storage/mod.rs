mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Trait for key-value persistence backends.
///
/// Stores serialize their whole collection into a single string and write it
/// under a fixed key. Both operations are synchronous.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if nothing was written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Returns true if `key` can be used as a storage key.
///
/// Keys map to file names, so only ASCII alphanumerics, `_` and `-` are
/// accepted.
pub(crate) fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
