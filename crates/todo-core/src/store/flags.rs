use std::time::{Duration, Instant};

use serde_json::{Map, Value};

use crate::broadcast::{Broadcaster, Subscription};
use crate::config::{DEFAULT_FLAGS_KEY, DEFAULT_MINIMUM_FETCH_INTERVAL_SECS};
use crate::flags::{FeatureFlags, FlagKey, FlagUpdate, FlagValue};
use crate::remote::{RemoteConfig, RemoteConfigError};

use super::{load, persist, SharedStorage, StoreError};

/// Where the flag store is in its start-up sequence.
///
/// ```text
/// Uninitialized ──> FetchingRemote ──> Initialized
///       │                  │
///       └──────────────────┴─────────> LocalFallback(Cache | Defaults)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    FetchingRemote,
    /// Values came from the remote provider.
    Initialized,
    /// No usable remote; values came from the local cache or the defaults.
    LocalFallback(FallbackSource),
}

impl InitState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InitState::Initialized | InitState::LocalFallback(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackSource {
    Cache,
    Defaults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    /// Skip the fetch if the last one is younger than the minimum interval.
    Throttled,
    /// Fetch regardless of when the last fetch happened.
    Force,
}

/// Holds the feature flags.
///
/// Values start out as the local cache (or the defaults when there is no
/// cache) and are readable right away. [`initialize`](Self::initialize) then
/// overlays whatever the remote provider serves.
pub struct FeatureFlagStore {
    storage: SharedStorage,
    key: String,
    flags: FeatureFlags,
    loaded_from: FallbackSource,
    state: InitState,
    remote: Option<Box<dyn RemoteConfig>>,
    minimum_fetch_interval: Duration,
    last_fetch: Option<Instant>,
    broadcaster: Broadcaster<FeatureFlags>,
}

impl FeatureFlagStore {
    /// Opens the store under the default key with the default fetch interval.
    pub fn open(storage: SharedStorage, remote: Option<Box<dyn RemoteConfig>>) -> Self {
        Self::new(
            storage,
            DEFAULT_FLAGS_KEY,
            remote,
            Duration::from_secs(DEFAULT_MINIMUM_FETCH_INTERVAL_SECS),
        )
    }

    /// Opens the store and loads the cached flags.
    ///
    /// When nothing is cached yet the defaults are written to the cache.
    pub fn new(
        storage: SharedStorage,
        key: impl Into<String>,
        remote: Option<Box<dyn RemoteConfig>>,
        minimum_fetch_interval: Duration,
    ) -> Self {
        let key = key.into();
        let (flags, loaded_from) = match load::<Map<String, Value>>(&storage, &key) {
            Ok(Some(cached)) => (FeatureFlags::from_loose_object(&cached), FallbackSource::Cache),
            Ok(None) => {
                let defaults = FeatureFlags::default();
                if let Err(e) = persist(&storage, &key, &defaults) {
                    tracing::warn!(error = %e, "failed to cache default flags");
                }
                (defaults, FallbackSource::Defaults)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load cached flags, using defaults");
                (FeatureFlags::default(), FallbackSource::Defaults)
            }
        };

        Self {
            storage,
            key,
            flags,
            loaded_from,
            state: InitState::Uninitialized,
            remote,
            minimum_fetch_interval,
            last_fetch: None,
            broadcaster: Broadcaster::new(),
        }
    }

    /// Runs the start-up sequence and publishes the resulting flags once.
    ///
    /// Calling it again after it finished is a no-op that returns the state.
    pub async fn initialize(&mut self) -> InitState {
        if self.state != InitState::Uninitialized {
            return self.state;
        }

        let usable = match &self.remote {
            None => {
                tracing::info!("no remote config provider, using local flags");
                false
            }
            Some(remote) if !remote.is_configured() => {
                tracing::info!("remote config credentials not set, using local flags");
                false
            }
            Some(_) => true,
        };

        let next = if usable {
            self.state = InitState::FetchingRemote;
            match self.fetch_remote(FetchMode::Throttled).await {
                Ok(_) => InitState::Initialized,
                Err(e) => {
                    tracing::warn!(error = %e, "remote config unavailable, using local flags");
                    InitState::LocalFallback(self.loaded_from)
                }
            }
        } else {
            InitState::LocalFallback(self.loaded_from)
        };
        self.state = next;

        tracing::info!(state = ?self.state, flags = ?self.flags, "feature flags ready");
        self.broadcaster.publish(&self.flags);
        self.state
    }

    /// Fetches from the remote provider unless the last fetch is younger than
    /// the minimum fetch interval, in which case the flags are left as they
    /// are. Returns true on success.
    pub async fn fetch(&mut self) -> bool {
        self.sync_remote(FetchMode::Throttled).await
    }

    /// Fetches from the remote provider ignoring the minimum fetch interval.
    ///
    /// Later calls to [`fetch`](Self::fetch) are throttled again. Returns true
    /// if the fetch succeeded; failures are logged and leave the current
    /// flags in place.
    pub async fn refresh(&mut self) -> bool {
        self.sync_remote(FetchMode::Force).await
    }

    async fn sync_remote(&mut self, mode: FetchMode) -> bool {
        if !self.remote.as_ref().is_some_and(|r| r.is_configured()) {
            tracing::debug!("remote sync skipped, no configured remote provider");
            return false;
        }

        let before = self.flags;
        match self.fetch_remote(mode).await {
            Ok(_) => {
                if self.state.is_terminal() {
                    self.state = InitState::Initialized;
                }
                if self.flags != before {
                    self.broadcaster.publish(&self.flags);
                }
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote flag sync failed");
                false
            }
        }
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    /// Subscribes to snapshots. The current one is delivered first.
    pub fn subscribe(&mut self) -> Subscription<FeatureFlags> {
        self.broadcaster.subscribe(self.flags)
    }

    pub fn get_flag(&self, key: FlagKey) -> FlagValue {
        self.flags.get(key)
    }

    pub fn get_all(&self) -> FeatureFlags {
        self.flags
    }

    pub fn categories_enabled(&self) -> bool {
        self.flags.enable_categories
    }

    pub fn dark_mode_enabled(&self) -> bool {
        self.flags.enable_dark_mode
    }

    pub fn max_tasks(&self) -> u32 {
        self.flags.max_tasks
    }

    /// Overrides one flag locally, caches it and publishes.
    ///
    /// `max_tasks` is clamped to [1, 1000]. If the cache write fails the
    /// override is dropped.
    pub fn set_flag(&mut self, update: FlagUpdate) {
        let mut flags = self.flags;
        flags.set(update);

        if let Err(e) = persist(&self.storage, &self.key, &flags) {
            tracing::error!(error = %e, flag = %update.key(), "failed to save flag, change discarded");
            return;
        }
        self.flags = flags;
        self.broadcaster.publish(&self.flags);
    }

    /// Fetches, activates and overlays remote values onto the flags.
    async fn fetch_remote(&mut self, mode: FetchMode) -> Result<bool, StoreError> {
        let remote = self.remote.as_mut().ok_or_else(|| {
            RemoteConfigError::NotConfigured("no remote provider".to_string())
        })?;

        let throttled = mode == FetchMode::Throttled
            && self
                .last_fetch
                .is_some_and(|at| at.elapsed() < self.minimum_fetch_interval);

        if throttled {
            tracing::debug!("remote fetch throttled, keeping current flags");
            return Ok(false);
        }

        let activated = remote.fetch_and_activate().await?;
        self.last_fetch = Some(Instant::now());

        let mut flags = self.flags;
        let applied = flags.merge_loose(|key| remote.get_value(key.as_str()));
        tracing::debug!(activated, applied, "remote flags applied");

        if flags != self.flags {
            self.flags = flags;
            // The cache only speeds up the next offline start.
            if let Err(e) = persist(&self.storage, &self.key, &self.flags) {
                tracing::warn!(error = %e, "failed to cache remote flags");
            }
        }

        Ok(activated)
    }
}
