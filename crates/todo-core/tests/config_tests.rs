use std::time::Duration;

use todo_core::config::{
    DEFAULT_CATEGORIES_KEY, DEFAULT_DATA_DIR, DEFAULT_FLAGS_KEY, DEFAULT_LOG_LEVEL,
    DEFAULT_REMOTE_PROVIDER, DEFAULT_TASKS_KEY,
};
use todo_core::{Config, ConfigError};
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.storage.data_dir, DEFAULT_DATA_DIR);
    assert_eq!(config.storage.tasks_key, DEFAULT_TASKS_KEY);
    assert_eq!(config.storage.categories_key, DEFAULT_CATEGORIES_KEY);
    assert_eq!(config.storage.flags_key, DEFAULT_FLAGS_KEY);
    assert_eq!(config.remote.provider, DEFAULT_REMOTE_PROVIDER);
    assert_eq!(config.remote.minimum_fetch_interval(), Duration::from_secs(3600));
    assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
}

#[test]
fn test_config_to_toml() {
    let toml_str = Config::default_config_string();
    assert!(toml_str.contains("[storage]"));
    assert!(toml_str.contains("[remote]"));
    assert!(toml_str.contains("[logging]"));
    assert!(!toml_str.contains("api_key"));
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
[storage]
data_dir = ".custom-todo"

[remote]
provider = "static"
minimum_fetch_interval_secs = 60

[remote.values]
enable_dark_mode = "true"
max_tasks = "20"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.storage.data_dir, ".custom-todo");
    assert_eq!(config.storage.tasks_key, DEFAULT_TASKS_KEY);
    assert_eq!(config.remote.provider, "static");
    assert_eq!(config.remote.minimum_fetch_interval(), Duration::from_secs(60));
    assert_eq!(config.remote.values["max_tasks"], "20");
}

#[test]
fn test_from_file_rejects_unknown_provider() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("todo.toml");
    std::fs::write(&path, "[remote]\nprovider = \"carrier-pigeon\"\n").unwrap();

    let result = Config::from_file(&path);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_from_file_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("todo.toml");
    std::fs::write(&path, "[storage\n").unwrap();

    assert!(matches!(Config::from_file(&path), Err(ConfigError::ParseError(_))));
}
