use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{RemoteConfig, RemoteConfigError};

/// A remote config provider that serves values from memory.
///
/// The published template is shared through [`RemoteTemplate`] handles, so
/// values can be changed after the provider was handed to a store. Useful
/// for demos and tests.
pub struct SimulatedRemoteConfig {
    shared: Arc<Shared>,
    active: BTreeMap<String, Value>,
}

#[derive(Default)]
struct Shared {
    published: Mutex<BTreeMap<String, Value>>,
    unreachable: Mutex<Option<String>>,
    fetches: AtomicUsize,
}

impl SimulatedRemoteConfig {
    /// Creates a provider with an empty template.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            active: BTreeMap::new(),
        }
    }

    /// Creates a provider publishing `values`.
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let provider = Self::new();
        {
            let mut published = provider.shared.published.lock();
            for (key, value) in values {
                published.insert(key.into(), value);
            }
        }
        provider
    }

    /// Creates a provider whose fetches always fail.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        let provider = Self::new();
        provider.template().set_unreachable(Some(reason.into()));
        provider
    }

    /// Returns a handle to the published template.
    pub fn template(&self) -> RemoteTemplate {
        RemoteTemplate {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Default for SimulatedRemoteConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteConfig for SimulatedRemoteConfig {
    async fn fetch_and_activate(&mut self) -> Result<bool, RemoteConfigError> {
        self.shared.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = self.shared.unreachable.lock().clone() {
            return Err(RemoteConfigError::Network(reason));
        }

        let published = self.shared.published.lock().clone();
        if published == self.active {
            return Ok(false);
        }
        self.active = published;
        Ok(true)
    }

    fn get_value(&self, key: &str) -> Option<Value> {
        self.active.get(key).cloned()
    }
}

/// Handle for editing the template of a [`SimulatedRemoteConfig`].
#[derive(Clone)]
pub struct RemoteTemplate {
    shared: Arc<Shared>,
}

impl RemoteTemplate {
    /// Publishes `value` under `key`. Readers see it after the next fetch.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.shared.published.lock().insert(key.into(), value);
    }

    /// Makes subsequent fetches fail with `reason`, or succeed again on `None`.
    pub fn set_unreachable(&self, reason: Option<String>) {
        *self.shared.unreachable.lock() = reason;
    }

    /// Number of fetches attempted so far.
    pub fn fetch_count(&self) -> usize {
        self.shared.fetches.load(Ordering::SeqCst)
    }
}
