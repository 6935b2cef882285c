use todo_core::{FileStorage, KeyValueStore, StorageConfig, StorageError};
use tempfile::TempDir;

fn create_test_storage() -> (FileStorage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::new(temp_dir.path().join("data"));
    (storage, temp_dir)
}

#[test]
fn test_get_missing_key() {
    let (storage, _temp) = create_test_storage();
    assert_eq!(storage.get("todo_tasks").unwrap(), None);
}

#[test]
fn test_set_and_get() {
    let (storage, _temp) = create_test_storage();

    storage.set("todo_tasks", r#"[{"id":"a"}]"#).unwrap();
    assert_eq!(
        storage.get("todo_tasks").unwrap().as_deref(),
        Some(r#"[{"id":"a"}]"#)
    );

    let file = storage.base_path().join("todo_tasks.json");
    assert!(file.exists());
    assert!(!storage.base_path().join("todo_tasks.json.tmp").exists());
}

#[test]
fn test_set_replaces_whole_value() {
    let (storage, _temp) = create_test_storage();

    storage.set("todo_categories", "[1,2,3]").unwrap();
    storage.set("todo_categories", "[]").unwrap();
    assert_eq!(storage.get("todo_categories").unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_survives_new_instance() {
    let temp_dir = TempDir::new().unwrap();
    FileStorage::new(temp_dir.path())
        .set("firebase_remote_config", "{}")
        .unwrap();

    let reopened = FileStorage::new(temp_dir.path());
    assert_eq!(
        reopened.get("firebase_remote_config").unwrap().as_deref(),
        Some("{}")
    );
}

#[test]
fn test_invalid_keys_rejected() {
    let (storage, _temp) = create_test_storage();

    for key in ["", "../escape", "a/b", "with space"] {
        assert!(matches!(
            storage.set(key, "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.get(key), Err(StorageError::InvalidKey(_))));
    }
}

#[test]
fn test_with_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = StorageConfig {
        data_dir: temp_dir.path().to_string_lossy().to_string(),
        ..StorageConfig::default()
    };

    let storage = FileStorage::with_config(&config);
    storage.set("todo_tasks", "[]").unwrap();
    assert!(temp_dir.path().join("todo_tasks.json").exists());
}
