pub mod broadcast;
pub mod category;
pub mod config;
pub mod context;
pub mod flags;
pub mod remote;
pub mod storage;
pub mod store;
pub mod task;

pub use broadcast::{Broadcaster, Subscription};
pub use category::{validate_color, validate_name, Category, CategoryPatch};
pub use config::{Config, ConfigError, LoggingConfig, RemoteSettings, StorageConfig};
pub use context::AppContext;
pub use flags::{FeatureFlags, FlagKey, FlagUpdate, FlagValue};
pub use remote::{FirebaseRemoteConfig, RemoteConfig, RemoteConfigError, SimulatedRemoteConfig};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, StorageError};
pub use store::{
    CategoryStore, FallbackSource, FeatureFlagStore, InitState, SharedStorage, StoreError,
    TaskStore,
};
pub use task::{validate_title, Task, TaskPatch, TaskStats};
