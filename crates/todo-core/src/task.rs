use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::StoreError;

/// A single to-do item.
///
/// Persisted with camelCase field names and RFC 3339 timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, fixed at creation
    pub id: String,
    /// What needs doing
    pub title: String,
    /// Optional longer text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the task is done
    #[serde(default)]
    pub completed: bool,
    /// Category this task belongs to. May point at a deleted category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// When the task was created
    pub created_at: DateTime<Utc>,
    /// When the task was last changed
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates an open task with a fresh identifier.
    pub fn new(title: impl Into<String>, category_id: Option<String>) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            completed: false,
            category_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`. Never moves it backwards, even if the wall
    /// clock does.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// Merges `patch` into this task and refreshes `updated_at`.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        self.touch();
    }

    /// Flips the completion flag and refreshes `updated_at`.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
        self.touch();
    }
}

/// Partial update of a [`Task`].
///
/// `None` leaves a field untouched. For nullable fields the inner option
/// sets or clears the value. Identifier and creation time are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub category_id: Option<Option<String>>,
}

impl TaskPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn category(mut self, category_id: Option<String>) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Counters over the task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskStats {
    /// Computes the counters for `tasks`.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
        }
    }
}

/// Trims a task title and rejects it if nothing is left.
///
/// The store accepts any title; callers run this first.
pub fn validate_title(title: &str) -> Result<String, StoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation("task title must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}
