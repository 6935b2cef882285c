//! Default values for the todo configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Storage Defaults
// ============================================================================

/// Default data directory, relative to the home directory.
pub const DEFAULT_DATA_DIR: &str = ".todo";

/// Storage key holding the task collection.
pub const DEFAULT_TASKS_KEY: &str = "todo_tasks";

/// Storage key holding the category collection.
pub const DEFAULT_CATEGORIES_KEY: &str = "todo_categories";

/// Storage key holding the cached feature flags.
pub const DEFAULT_FLAGS_KEY: &str = "firebase_remote_config";

/// File extension used by the file backend for each key.
pub const STORAGE_FILE_EXTENSION: &str = "json";

// ============================================================================
// Remote Config Defaults
// ============================================================================

/// Default remote provider ("none", "static" or "firebase").
pub const DEFAULT_REMOTE_PROVIDER: &str = "none";

/// Minimum interval between two remote fetches (1 hour).
pub const DEFAULT_MINIMUM_FETCH_INTERVAL_SECS: u64 = 3600;

/// Base URL of the Firebase Remote Config REST API.
pub const DEFAULT_FIREBASE_URL: &str = "https://firebaseremoteconfig.googleapis.com/v1";

/// Credential values shipped in templates. A credential that still carries
/// one of these markers means the provider was never configured.
pub const PLACEHOLDER_CREDENTIAL_MARKERS: &[&str] = &["PEGA_AQUI", "TU_API_KEY", "YOUR_", "tu-proyecto"];

// ============================================================================
// Feature Flag Defaults
// ============================================================================

/// Categories are enabled out of the box.
pub const DEFAULT_ENABLE_CATEGORIES: bool = true;

/// Dark mode is off out of the box.
pub const DEFAULT_ENABLE_DARK_MODE: bool = false;

/// Default advisory cap on the number of tasks.
pub const DEFAULT_MAX_TASKS: u32 = 100;

/// Lower bound for `max_tasks`.
pub const MIN_MAX_TASKS: u32 = 1;

/// Upper bound for `max_tasks`.
pub const MAX_MAX_TASKS: u32 = 1000;

// ============================================================================
// Category Defaults
// ============================================================================

/// Colors offered for categories. The first entry is the default.
pub const CATEGORY_COLORS: &[&str] = &[
    "#3880ff", // blue
    "#2dd36f", // green
    "#ffc409", // yellow
    "#eb445a", // red
    "#5260ff", // purple
    "#3dc2ff", // cyan
    "#ff7f50", // coral
    "#92949c", // grey
];

/// Icons offered for categories.
pub const CATEGORY_ICONS: &[&str] = &[
    "folder-outline",
    "briefcase-outline",
    "home-outline",
    "cart-outline",
    "fitness-outline",
    "school-outline",
    "airplane-outline",
    "heart-outline",
    "star-outline",
    "flag-outline",
];

/// Icon assigned to categories created without one.
pub const DEFAULT_CATEGORY_ICON: &str = "folder-outline";

// ============================================================================
// Logging Defaults
// ============================================================================

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_LEVEL: &str = "warn";
