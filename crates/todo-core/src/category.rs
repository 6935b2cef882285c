use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{CATEGORY_COLORS, DEFAULT_CATEGORY_ICON};
use crate::store::StoreError;

/// A named, colored group of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Hex color, e.g. `#3880ff`
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Category {
    /// Creates a category with a fresh identifier.
    ///
    /// Falls back to the first palette color and the folder icon.
    pub fn new(name: impl Into<String>, color: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color: color.unwrap_or_else(default_color),
            icon: Some(DEFAULT_CATEGORY_ICON.to_string()),
        }
    }

    fn fixed(id: &str, name: &str, color: &str, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            icon: Some(icon.to_string()),
        }
    }

    /// Merges `patch` into this category.
    pub fn apply(&mut self, patch: CategoryPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
    }
}

/// Partial update of a [`Category`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
}

impl CategoryPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn icon(mut self, icon: Option<String>) -> Self {
        self.icon = Some(icon);
        self
    }
}

/// The first palette entry.
pub fn default_color() -> String {
    CATEGORY_COLORS[0].to_string()
}

/// Categories written on the very first load.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::fixed("cat1", "Personal", CATEGORY_COLORS[0], "person-outline"),
        Category::fixed("cat2", "Work", CATEGORY_COLORS[1], "briefcase-outline"),
        Category::fixed("cat3", "Shopping", CATEGORY_COLORS[3], "cart-outline"),
    ]
}

/// Trims a category name and rejects it if nothing is left.
pub fn validate_name(name: &str) -> Result<String, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation("category name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Returns true for `#rgb` or `#rrggbb` hex colors.
pub fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Checks a user-picked color.
pub fn validate_color(color: &str) -> Result<String, StoreError> {
    let color = color.trim();
    if !is_hex_color(color) {
        return Err(StoreError::Validation(format!("not a hex color: {color}")));
    }
    Ok(color.to_lowercase())
}
