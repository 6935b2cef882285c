use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{StorageConfig, STORAGE_FILE_EXTENSION};

use super::error::StorageError;
use super::{is_valid_key, KeyValueStore};

/// File-based storage implementation.
///
/// Every key is stored as its own file:
/// ```text
/// ~/.todo/
///   todo_tasks.json
///   todo_categories.json
///   firebase_remote_config.json
/// ```
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Creates a FileStorage rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Creates a FileStorage from the storage configuration.
    pub fn with_config(config: &StorageConfig) -> Self {
        Self::new(config.data_path())
    }

    /// Returns the directory holding the key files.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the path of the file backing `key`.
    fn key_file(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self
            .base_path
            .join(format!("{key}.{STORAGE_FILE_EXTENSION}")))
    }

    /// Ensures the base directory exists.
    fn ensure_base_dir(&self) -> Result<(), StorageError> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path)
                .map_err(|e| StorageError::io(&self.base_path, e))?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_file(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_file(key)?;
        self.ensure_base_dir()?;

        // Write next to the target and rename so a crash never leaves a
        // truncated collection behind.
        let tmp = path.with_extension(format!("{STORAGE_FILE_EXTENSION}.tmp"));
        fs::write(&tmp, value).map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::io(&path, e))?;

        Ok(())
    }
}
