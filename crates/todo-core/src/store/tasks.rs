use crate::broadcast::{Broadcaster, Subscription};
use crate::config::DEFAULT_TASKS_KEY;
use crate::task::{Task, TaskPatch, TaskStats};

use super::{load, persist, SharedStorage};

/// Owns the task collection.
///
/// Tasks keep insertion order. Category references are not checked; a task
/// may point at a category that no longer exists.
pub struct TaskStore {
    storage: SharedStorage,
    key: String,
    tasks: Vec<Task>,
    broadcaster: Broadcaster<Vec<Task>>,
}

impl TaskStore {
    /// Opens the store under the default key.
    pub fn open(storage: SharedStorage) -> Self {
        Self::new(storage, DEFAULT_TASKS_KEY)
    }

    /// Opens the store under `key`, loading whatever was persisted.
    ///
    /// Missing, unreadable or corrupt data yields an empty collection.
    pub fn new(storage: SharedStorage, key: impl Into<String>) -> Self {
        let key = key.into();
        let tasks = match load::<Vec<Task>>(&storage, &key) {
            Ok(Some(tasks)) => {
                tracing::debug!(count = tasks.len(), "loaded tasks");
                tasks
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load tasks, starting empty");
                Vec::new()
            }
        };

        Self {
            storage,
            key,
            tasks,
            broadcaster: Broadcaster::new(),
        }
    }

    /// Subscribes to snapshots. The current one is delivered first.
    pub fn subscribe(&mut self) -> Subscription<Vec<Task>> {
        self.broadcaster.subscribe(self.tasks.clone())
    }

    /// Returns the in-memory snapshot.
    pub fn get_all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Appends a new open task and returns it.
    ///
    /// The title is taken as given; run [`crate::validate_title`] first.
    pub fn add(&mut self, title: impl Into<String>, category_id: Option<String>) -> Task {
        let task = Task::new(title, category_id);
        let mut tasks = self.tasks.clone();
        tasks.push(task.clone());
        self.save(tasks);
        task
    }

    /// Merges `patch` into the task with `id`. Returns false if there is no
    /// such task.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> bool {
        self.modify(id, |task| task.apply(patch))
    }

    /// Flips the completion flag of the task with `id`.
    pub fn toggle_complete(&mut self, id: &str) -> bool {
        self.modify(id, Task::toggle)
    }

    /// Removes the task with `id`. Returns false if there is no such task.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let tasks = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.save(tasks);
        true
    }

    /// Returns the tasks in `category_id`, or all tasks for `None`.
    pub fn filter_by_category(&self, category_id: Option<&str>) -> Vec<Task> {
        match category_id {
            None => self.tasks.clone(),
            Some(id) => self
                .tasks
                .iter()
                .filter(|t| t.category_id.as_deref() == Some(id))
                .cloned()
                .collect(),
        }
    }

    pub fn count_by_category(&self, category_id: &str) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.category_id.as_deref() == Some(category_id))
            .count()
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    /// Returns true if another task fits under `max_tasks`.
    ///
    /// The store never enforces the cap itself.
    pub fn has_room_for(&self, max_tasks: u32) -> bool {
        self.tasks.len() < max_tasks as usize
    }

    fn modify(&mut self, id: &str, change: impl FnOnce(&mut Task)) -> bool {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };
        let mut tasks = self.tasks.clone();
        change(&mut tasks[index]);
        self.save(tasks);
        true
    }

    /// Persists `tasks`, then makes them current and publishes them.
    fn save(&mut self, tasks: Vec<Task>) {
        if let Err(e) = persist(&self.storage, &self.key, &tasks) {
            tracing::error!(error = %e, "failed to save tasks, change discarded");
            return;
        }
        self.tasks = tasks;
        self.broadcaster.publish(&self.tasks);
    }
}
