mod error;
mod firebase;
mod provider;
mod simulated;

pub use error::RemoteConfigError;
pub use firebase::FirebaseRemoteConfig;
pub use provider::from_settings;
pub use simulated::{RemoteTemplate, SimulatedRemoteConfig};

use async_trait::async_trait;
use serde_json::Value;

use crate::flags::{coerce_bool, coerce_number};

/// Trait for remote config providers.
///
/// A provider keeps two sets of values: the ones last fetched and the active
/// ones readers see. [`fetch_and_activate`](RemoteConfig::fetch_and_activate)
/// moves the former to the latter. Values are loosely typed; the typed
/// getters return `None` for missing keys, and `get_number` also for values
/// that are not numbers.
#[async_trait]
pub trait RemoteConfig: Send + Sync {
    /// Fetches the latest template and activates it.
    ///
    /// Returns true if the active values changed.
    async fn fetch_and_activate(&mut self) -> Result<bool, RemoteConfigError>;

    /// Returns the active raw value for `key`.
    fn get_value(&self, key: &str) -> Option<Value>;

    /// Returns false while credentials still hold template placeholders.
    fn is_configured(&self) -> bool {
        true
    }

    /// Returns the active value for `key` coerced to a boolean.
    fn get_boolean(&self, key: &str) -> Option<bool> {
        self.get_value(key).as_ref().map(coerce_bool)
    }

    /// Returns the active value for `key` coerced to a number.
    fn get_number(&self, key: &str) -> Option<f64> {
        self.get_value(key).as_ref().and_then(coerce_number)
    }
}

/// Blanket implementation for boxed trait objects.
#[async_trait]
impl RemoteConfig for Box<dyn RemoteConfig> {
    async fn fetch_and_activate(&mut self) -> Result<bool, RemoteConfigError> {
        (**self).fetch_and_activate().await
    }

    fn get_value(&self, key: &str) -> Option<Value> {
        (**self).get_value(key)
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }
}
