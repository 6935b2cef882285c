use std::sync::Arc;

use crate::category::Category;
use crate::config::Config;
use crate::remote::{self, RemoteConfig};
use crate::storage::FileStorage;
use crate::store::{CategoryStore, FeatureFlagStore, InitState, SharedStorage, TaskStore};
use crate::task::Task;

/// The three stores of one running app.
///
/// Built once at start-up and passed by reference to whatever presents the
/// data. All stores share the same storage backend.
pub struct AppContext {
    pub tasks: TaskStore,
    pub categories: CategoryStore,
    pub flags: FeatureFlagStore,
}

impl AppContext {
    /// Opens file-backed stores and the remote provider named in `config`.
    pub fn open(config: &Config) -> Self {
        let storage: SharedStorage = Arc::new(FileStorage::with_config(&config.storage));
        let remote = remote::from_settings(&config.remote);
        Self::with_storage(storage, remote, config)
    }

    /// Opens the stores on an existing backend.
    pub fn with_storage(
        storage: SharedStorage,
        remote: Option<Box<dyn RemoteConfig>>,
        config: &Config,
    ) -> Self {
        let keys = &config.storage;
        Self {
            tasks: TaskStore::new(Arc::clone(&storage), keys.tasks_key.as_str()),
            categories: CategoryStore::new(Arc::clone(&storage), keys.categories_key.as_str()),
            flags: FeatureFlagStore::new(
                storage,
                keys.flags_key.as_str(),
                remote,
                config.remote.minimum_fetch_interval(),
            ),
        }
    }

    /// Finishes feature flag start-up.
    pub async fn initialize(&mut self) -> InitState {
        self.flags.initialize().await
    }

    /// Returns true if one more task fits under `max_tasks`.
    pub fn can_add_task(&self) -> bool {
        self.tasks.has_room_for(self.flags.max_tasks())
    }

    /// Looks up the category of `task`. `None` when it has none or the
    /// category was deleted.
    pub fn category_of(&self, task: &Task) -> Option<&Category> {
        task.category_id
            .as_deref()
            .and_then(|id| self.categories.get(id))
    }
}
