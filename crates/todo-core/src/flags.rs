//! Feature flag record and the coercion rules for loosely typed values.
//!
//! Remote providers and older caches hand out values as strings, numbers or
//! booleans interchangeably. Everything goes through [`coerce_bool`] and
//! [`coerce_number`] before it reaches [`FeatureFlags`]. A string outside the
//! truthy set reads as `false`; a number that does not parse falls back to
//! the default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{
    DEFAULT_ENABLE_CATEGORIES, DEFAULT_ENABLE_DARK_MODE, DEFAULT_MAX_TASKS, MAX_MAX_TASKS,
    MIN_MAX_TASKS,
};
use crate::store::StoreError;

/// The three feature flags of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub enable_categories: bool,
    pub enable_dark_mode: bool,
    /// Advisory cap on the number of tasks, always within [1, 1000]
    pub max_tasks: u32,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_categories: DEFAULT_ENABLE_CATEGORIES,
            enable_dark_mode: DEFAULT_ENABLE_DARK_MODE,
            max_tasks: DEFAULT_MAX_TASKS,
        }
    }
}

impl FeatureFlags {
    /// Returns the value of one flag.
    pub fn get(&self, key: FlagKey) -> FlagValue {
        match key {
            FlagKey::EnableCategories => FlagValue::Bool(self.enable_categories),
            FlagKey::EnableDarkMode => FlagValue::Bool(self.enable_dark_mode),
            FlagKey::MaxTasks => FlagValue::Number(self.max_tasks),
        }
    }

    /// Applies a typed update. `max_tasks` is clamped.
    pub fn set(&mut self, update: FlagUpdate) {
        match update {
            FlagUpdate::EnableCategories(v) => self.enable_categories = v,
            FlagUpdate::EnableDarkMode(v) => self.enable_dark_mode = v,
            FlagUpdate::MaxTasks(v) => self.max_tasks = clamp_max_tasks(v),
        }
    }

    /// Overlays loosely typed values onto `self`.
    ///
    /// Missing keys leave the current value. Present values always apply:
    /// booleans through [`coerce_bool`], numbers through [`coerce_number`]
    /// with the default as fallback. Returns the number of flags that were
    /// taken from `value_of`.
    pub fn merge_loose<F>(&mut self, mut value_of: F) -> usize
    where
        F: FnMut(FlagKey) -> Option<Value>,
    {
        let mut applied = 0;
        for key in FlagKey::ALL {
            let Some(raw) = value_of(key) else {
                continue;
            };
            let update = match key {
                FlagKey::EnableCategories => FlagUpdate::EnableCategories(coerce_bool(&raw)),
                FlagKey::EnableDarkMode => FlagUpdate::EnableDarkMode(coerce_bool(&raw)),
                FlagKey::MaxTasks => match coerce_number(&raw).and_then(number_to_i64) {
                    Some(n) => FlagUpdate::MaxTasks(n),
                    None => {
                        tracing::warn!(flag = key.as_str(), value = %raw, "not a number, using default");
                        FlagUpdate::MaxTasks(i64::from(DEFAULT_MAX_TASKS))
                    }
                },
            };
            self.set(update);
            applied += 1;
        }
        applied
    }

    /// Builds flags from a JSON object, starting from the defaults.
    pub fn from_loose_object(object: &Map<String, Value>) -> Self {
        let mut flags = Self::default();
        flags.merge_loose(|key| object.get(key.as_str()).cloned());
        flags
    }
}

/// Names of the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKey {
    EnableCategories,
    EnableDarkMode,
    MaxTasks,
}

impl FlagKey {
    pub const ALL: [FlagKey; 3] = [
        FlagKey::EnableCategories,
        FlagKey::EnableDarkMode,
        FlagKey::MaxTasks,
    ];

    /// The key used in caches and remote config.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKey::EnableCategories => "enable_categories",
            FlagKey::EnableDarkMode => "enable_dark_mode",
            FlagKey::MaxTasks => "max_tasks",
        }
    }
}

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FlagKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlagKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| StoreError::Validation(format!("unknown flag: {s}")))
    }
}

/// Value of a single flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagValue {
    Bool(bool),
    Number(u32),
}

impl FlagValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(v) => Some(*v),
            FlagValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<u32> {
        match self {
            FlagValue::Number(v) => Some(*v),
            FlagValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(v) => write!(f, "{v}"),
            FlagValue::Number(v) => write!(f, "{v}"),
        }
    }
}

/// A typed write to one flag.
///
/// `MaxTasks` takes any integer; it is clamped to [1, 1000] when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagUpdate {
    EnableCategories(bool),
    EnableDarkMode(bool),
    MaxTasks(i64),
}

impl FlagUpdate {
    pub fn key(&self) -> FlagKey {
        match self {
            FlagUpdate::EnableCategories(_) => FlagKey::EnableCategories,
            FlagUpdate::EnableDarkMode(_) => FlagKey::EnableDarkMode,
            FlagUpdate::MaxTasks(_) => FlagKey::MaxTasks,
        }
    }

    /// Parses user input for `key`. Unlike remote coercion this is strict:
    /// input that does not parse is an error.
    pub fn parse(key: FlagKey, raw: &str) -> Result<Self, StoreError> {
        let value = Value::String(raw.to_string());
        let invalid = || StoreError::Validation(format!("invalid value for {key}: {raw:?}"));
        match key {
            FlagKey::EnableCategories => strict_bool(raw)
                .map(FlagUpdate::EnableCategories)
                .ok_or_else(invalid),
            FlagKey::EnableDarkMode => strict_bool(raw)
                .map(FlagUpdate::EnableDarkMode)
                .ok_or_else(invalid),
            FlagKey::MaxTasks => coerce_number(&value)
                .and_then(number_to_i64)
                .map(FlagUpdate::MaxTasks)
                .ok_or_else(invalid),
        }
    }
}

const TRUTHY: &[&str] = &["1", "true", "t", "yes", "y", "on"];
const FALSY: &[&str] = &["0", "false", "f", "no", "n", "off", ""];

fn strict_bool(raw: &str) -> Option<bool> {
    let lowered = raw.trim().to_ascii_lowercase();
    if TRUTHY.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSY.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Coerces a loosely typed value to a boolean.
///
/// Strings are true only when in the truthy set (`1`, `true`, `t`, `yes`,
/// `y`, `on`, case insensitive). Numbers are true when non-zero. Everything
/// else is false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => TRUTHY.contains(&s.trim().to_ascii_lowercase().as_str()),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

/// Coerces a loosely typed value to a finite number.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn number_to_i64(n: f64) -> Option<i64> {
    let rounded = n.round();
    (rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64).then_some(rounded as i64)
}

/// Clamps a requested task cap to [1, 1000].
pub fn clamp_max_tasks(value: i64) -> u32 {
    value.clamp(MIN_MAX_TASKS as i64, MAX_MAX_TASKS as i64) as u32
}
