use crate::broadcast::{Broadcaster, Subscription};
use crate::category::{default_categories, Category, CategoryPatch};
use crate::config::DEFAULT_CATEGORIES_KEY;

use super::{load, persist, SharedStorage};

/// Owns the category collection.
///
/// The first time it opens against storage that holds no categories it seeds
/// "Personal", "Work" and "Shopping". A stored list, even an empty one, is
/// never re-seeded.
pub struct CategoryStore {
    storage: SharedStorage,
    key: String,
    categories: Vec<Category>,
    broadcaster: Broadcaster<Vec<Category>>,
}

impl CategoryStore {
    /// Opens the store under the default key.
    pub fn open(storage: SharedStorage) -> Self {
        Self::new(storage, DEFAULT_CATEGORIES_KEY)
    }

    /// Opens the store under `key`.
    pub fn new(storage: SharedStorage, key: impl Into<String>) -> Self {
        let key = key.into();
        let loaded = match load::<Vec<Category>>(&storage, &key) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load categories, seeding defaults");
                None
            }
        };

        let mut store = Self {
            storage,
            key,
            categories: Vec::new(),
            broadcaster: Broadcaster::new(),
        };

        match loaded {
            Some(categories) => {
                tracing::debug!(count = categories.len(), "loaded categories");
                store.categories = categories;
            }
            None => {
                tracing::info!("no categories stored, seeding defaults");
                store.save(default_categories());
            }
        }

        store
    }

    /// Subscribes to snapshots. The current one is delivered first.
    pub fn subscribe(&mut self) -> Subscription<Vec<Category>> {
        self.broadcaster.subscribe(self.categories.clone())
    }

    pub fn get_all(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Appends a new category and returns it.
    ///
    /// Without a color the first palette entry is used.
    pub fn add(&mut self, name: impl Into<String>, color: Option<String>) -> Category {
        let category = Category::new(name, color);
        let mut categories = self.categories.clone();
        categories.push(category.clone());
        self.save(categories);
        category
    }

    /// Merges `patch` into the category with `id`.
    pub fn update(&mut self, id: &str, patch: CategoryPatch) -> bool {
        let Some(index) = self.categories.iter().position(|c| c.id == id) else {
            return false;
        };
        let mut categories = self.categories.clone();
        categories[index].apply(patch);
        self.save(categories);
        true
    }

    /// Removes the category with `id`. Tasks referring to it are left alone.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let categories = self
            .categories
            .iter()
            .filter(|c| c.id != id)
            .cloned()
            .collect();
        self.save(categories);
        true
    }

    fn save(&mut self, categories: Vec<Category>) {
        if let Err(e) = persist(&self.storage, &self.key, &categories) {
            tracing::error!(error = %e, "failed to save categories, change discarded");
            return;
        }
        self.categories = categories;
        self.broadcaster.publish(&self.categories);
    }
}
