use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use todo_core::{
    FallbackSource, FeatureFlagStore, FeatureFlags, FirebaseRemoteConfig, FlagKey, FlagUpdate,
    FlagValue, InitState, KeyValueStore, MemoryStorage, RemoteConfig, SharedStorage,
    SimulatedRemoteConfig,
};

const HOUR: Duration = Duration::from_secs(3600);

fn memory() -> SharedStorage {
    Arc::new(MemoryStorage::new())
}

fn store_with(storage: &SharedStorage, remote: Option<Box<dyn RemoteConfig>>) -> FeatureFlagStore {
    FeatureFlagStore::new(Arc::clone(storage), "firebase_remote_config", remote, HOUR)
}

#[tokio::test]
async fn test_no_remote_falls_back_to_defaults() {
    let storage = memory();
    let mut store = store_with(&storage, None);

    assert_eq!(store.state(), InitState::Uninitialized);
    let state = store.initialize().await;

    assert_eq!(state, InitState::LocalFallback(FallbackSource::Defaults));
    assert_eq!(store.get_all(), FeatureFlags::default());
    assert!(store.categories_enabled());
    assert!(!store.dark_mode_enabled());
    assert_eq!(store.max_tasks(), 100);

    // Defaults are cached on first load.
    let cached = storage.get("firebase_remote_config").unwrap().unwrap();
    let cached: FeatureFlags = serde_json::from_str(&cached).unwrap();
    assert_eq!(cached, FeatureFlags::default());
}

#[tokio::test]
async fn test_set_flag_survives_restart_without_remote() {
    let storage = memory();
    let mut store = store_with(&storage, None);
    store.initialize().await;

    store.set_flag(FlagUpdate::EnableDarkMode(true));
    store.set_flag(FlagUpdate::MaxTasks(25));
    assert_eq!(store.get_flag(FlagKey::EnableDarkMode), FlagValue::Bool(true));
    assert_eq!(store.get_all().max_tasks, 25);

    let mut fresh = store_with(&storage, Some(Box::new(SimulatedRemoteConfig::unreachable("offline"))));
    // Readable before initialization.
    assert!(fresh.dark_mode_enabled());

    let state = fresh.initialize().await;
    assert_eq!(state, InitState::LocalFallback(FallbackSource::Cache));
    assert!(fresh.dark_mode_enabled());
    assert_eq!(fresh.max_tasks(), 25);
}

#[tokio::test]
async fn test_max_tasks_is_clamped() {
    let mut store = store_with(&memory(), None);

    store.set_flag(FlagUpdate::MaxTasks(0));
    assert_eq!(store.max_tasks(), 1);

    store.set_flag(FlagUpdate::MaxTasks(5000));
    assert_eq!(store.max_tasks(), 1000);

    store.set_flag(FlagUpdate::MaxTasks(-3));
    assert_eq!(store.get_flag(FlagKey::MaxTasks), FlagValue::Number(1));
}

#[tokio::test]
async fn test_out_of_range_cache_is_clamped_on_load() {
    let storage = memory();
    storage
        .set(
            "firebase_remote_config",
            r#"{"enable_categories":false,"max_tasks":99999}"#,
        )
        .unwrap();

    let store = store_with(&storage, None);
    assert!(!store.categories_enabled());
    assert!(!store.dark_mode_enabled());
    assert_eq!(store.max_tasks(), 1000);
}

#[tokio::test]
async fn test_remote_values_override_and_are_cached() {
    let storage = memory();
    let remote = SimulatedRemoteConfig::with_values([
        ("enable_dark_mode", json!("true")),
        ("max_tasks", json!("250")),
    ]);
    let mut store = store_with(&storage, Some(Box::new(remote)));

    assert_eq!(store.initialize().await, InitState::Initialized);
    assert!(store.dark_mode_enabled());
    assert!(store.categories_enabled());
    assert_eq!(store.max_tasks(), 250);

    let offline = store_with(&storage, None);
    assert!(offline.dark_mode_enabled());
    assert_eq!(offline.max_tasks(), 250);
}

#[tokio::test]
async fn test_remote_values_are_coerced() {
    let remote = SimulatedRemoteConfig::with_values([
        ("enable_categories", json!("0")),
        ("enable_dark_mode", json!("perhaps")),
        ("max_tasks", json!("lots")),
    ]);
    let mut store = store_with(&memory(), Some(Box::new(remote)));
    store.initialize().await;

    assert!(!store.categories_enabled());
    assert!(!store.dark_mode_enabled());
    assert_eq!(store.max_tasks(), 100);
}

#[tokio::test]
async fn test_unparseable_remote_values_replace_local_overrides() {
    let storage = memory();
    let mut local = store_with(&storage, None);
    local.set_flag(FlagUpdate::MaxTasks(25));
    local.set_flag(FlagUpdate::EnableDarkMode(true));

    let remote = SimulatedRemoteConfig::with_values([
        ("enable_categories", json!("perhaps")),
        ("enable_dark_mode", json!("nope")),
        ("max_tasks", json!("lots")),
    ]);
    let mut store = store_with(&storage, Some(Box::new(remote)));
    assert_eq!(store.max_tasks(), 25);

    assert_eq!(store.initialize().await, InitState::Initialized);
    assert!(!store.categories_enabled());
    assert!(!store.dark_mode_enabled());
    assert_eq!(store.max_tasks(), 100);
}

#[tokio::test]
async fn test_remote_max_tasks_is_clamped() {
    let remote = SimulatedRemoteConfig::with_values([("max_tasks", json!(0))]);
    let mut store = store_with(&memory(), Some(Box::new(remote)));
    store.initialize().await;
    assert_eq!(store.max_tasks(), 1);
}

#[tokio::test]
async fn test_unreachable_remote_without_cache_uses_defaults() {
    let remote = SimulatedRemoteConfig::unreachable("dns failure");
    let template = remote.template();
    let mut store = store_with(&memory(), Some(Box::new(remote)));

    let state = store.initialize().await;
    assert_eq!(state, InitState::LocalFallback(FallbackSource::Defaults));
    assert_eq!(template.fetch_count(), 1);
    assert_eq!(store.get_all(), FeatureFlags::default());
}

#[tokio::test]
async fn test_placeholder_credentials_skip_fetch() {
    let remote = FirebaseRemoteConfig::firebase(
        "PEGA_AQUI_TU_API_KEY",
        "PEGA_AQUI_TU_PROJECT_ID",
        "PEGA_AQUI_TU_APP_ID",
    );
    let mut store = store_with(&memory(), Some(Box::new(remote)));

    let state = store.initialize().await;
    assert_eq!(state, InitState::LocalFallback(FallbackSource::Defaults));
    assert!(!store.refresh().await);
}

#[tokio::test]
async fn test_initialize_publishes_once() {
    let remote = SimulatedRemoteConfig::with_values([("enable_dark_mode", json!(true))]);
    let mut store = store_with(&memory(), Some(Box::new(remote)));
    let mut sub = store.subscribe();

    assert!(!sub.try_recv().unwrap().enable_dark_mode);

    store.initialize().await;
    store.initialize().await;

    assert!(sub.try_recv().unwrap().enable_dark_mode);
    assert!(sub.try_recv().is_none());
    assert_eq!(store.state(), InitState::Initialized);
}

#[tokio::test]
async fn test_refresh_bypasses_fetch_interval_once() {
    let remote = SimulatedRemoteConfig::with_values([("max_tasks", json!("10"))]);
    let template = remote.template();
    let mut store = store_with(&memory(), Some(Box::new(remote)));

    store.initialize().await;
    assert_eq!(store.max_tasks(), 10);
    assert_eq!(template.fetch_count(), 1);

    template.set("max_tasks", json!("50"));

    // Within the interval: no network round trip, old values stay.
    assert!(store.fetch().await);
    assert_eq!(template.fetch_count(), 1);
    assert_eq!(store.max_tasks(), 10);

    assert!(store.refresh().await);
    assert_eq!(template.fetch_count(), 2);
    assert_eq!(store.max_tasks(), 50);

    // The interval applies again after a refresh.
    template.set("max_tasks", json!("60"));
    assert!(store.fetch().await);
    assert_eq!(template.fetch_count(), 2);
    assert_eq!(store.max_tasks(), 50);
}

#[tokio::test]
async fn test_refresh_recovers_from_fallback() {
    let remote = SimulatedRemoteConfig::unreachable("offline");
    let template = remote.template();
    let mut store = store_with(&memory(), Some(Box::new(remote)));
    let mut sub = store.subscribe();
    sub.latest();

    assert!(matches!(store.initialize().await, InitState::LocalFallback(_)));
    assert!(!store.refresh().await);

    template.set_unreachable(None);
    template.set("enable_categories", json!("false"));
    assert!(store.refresh().await);

    assert_eq!(store.state(), InitState::Initialized);
    assert!(!store.categories_enabled());
    assert!(!sub.latest().unwrap().enable_categories);
}

#[tokio::test]
async fn test_remote_wins_over_local_override() {
    let storage = memory();
    let mut local = store_with(&storage, None);
    local.set_flag(FlagUpdate::EnableCategories(false));

    let remote = SimulatedRemoteConfig::with_values([("enable_categories", json!("true"))]);
    let mut store = store_with(&storage, Some(Box::new(remote)));
    assert!(!store.categories_enabled());

    store.initialize().await;
    assert!(store.categories_enabled());
}

#[test]
fn test_failed_cache_write_discards_override() {
    // Large enough for the defaults, too small for anything else.
    let defaults_len = serde_json::to_string(&FeatureFlags::default()).unwrap().len();
    let storage: SharedStorage = Arc::new(MemoryStorage::with_quota(defaults_len));
    let mut store = store_with(&storage, None);
    let mut sub = store.subscribe();
    sub.latest();

    store.set_flag(FlagUpdate::MaxTasks(1000));

    assert_eq!(store.max_tasks(), 100);
    assert!(sub.try_recv().is_none());
}

#[tokio::test]
async fn test_throttled_fetch_keeps_local_override() {
    let remote = SimulatedRemoteConfig::with_values([("max_tasks", json!("10"))]);
    let template = remote.template();
    let mut store = store_with(&memory(), Some(Box::new(remote)));
    store.initialize().await;
    assert_eq!(store.max_tasks(), 10);

    store.set_flag(FlagUpdate::MaxTasks(30));
    let mut sub = store.subscribe();
    sub.latest();

    assert!(store.fetch().await);
    assert_eq!(template.fetch_count(), 1);
    assert_eq!(store.max_tasks(), 30);
    assert!(sub.try_recv().is_none());

    // A real fetch applies the remote value again.
    assert!(store.refresh().await);
    assert_eq!(store.max_tasks(), 10);
}
