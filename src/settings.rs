use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Runtime tuning shared between the coordinator and the API layer.
///
/// Consumers read a fresh snapshot on every operation, so replacing the
/// settings takes effect on the next scan without a restart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    #[serde(default = "default_cache_max")]
    pub cache_max: usize,

    #[serde(default = "default_cache_floor")]
    pub cache_floor: usize,

    #[serde(default = "default_batch_cap")]
    pub batch_cap: usize,

    #[serde(default = "default_notifications")]
    pub notifications: bool,
}

fn default_ttl_ms() -> u64 {
    5 * 60 * 1000
}

fn default_cache_max() -> usize {
    1000
}

fn default_cache_floor() -> usize {
    500
}

fn default_batch_cap() -> usize {
    50
}

fn default_notifications() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            cache_max: default_cache_max(),
            cache_floor: default_cache_floor(),
            batch_cap: default_batch_cap(),
            notifications: default_notifications(),
        }
    }
}

impl Settings {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsHandle(Arc<RwLock<Settings>>);

impl SettingsHandle {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self(Arc::new(RwLock::new(settings)))
    }

    pub fn snapshot(&self) -> Settings {
        *self.0.read().unwrap()
    }

    pub fn replace(&self, settings: Settings) {
        *self.0.write().unwrap() = settings;
    }
}
