//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::watch::{RemovePolicy, WatchOptions};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FoundationConfig {
    /// Graceful shutdown behaviour.
    pub shutdown: ShutdownConfig,

    /// File watcher behaviour.
    pub watcher: WatcherConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Shutdown hook and drain settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Catch and log a panicking hook, then continue with the next one.
    pub isolate_hook_panics: bool,

    /// Per-hook time limit. Hooks run on the blocking pool when set.
    pub hook_timeout_ms: Option<u64>,

    /// Limit on waiting for pending work. Unset waits forever.
    pub drain_timeout_ms: Option<u64>,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            isolate_hook_panics: true,
            hook_timeout_ms: None,
            drain_timeout_ms: None,
        }
    }
}

impl ShutdownConfig {
    pub fn hook_timeout(&self) -> Option<Duration> {
        self.hook_timeout_ms.map(Duration::from_millis)
    }

    pub fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout_ms.map(Duration::from_millis)
    }
}

/// File watcher settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatcherConfig {
    /// Behaviour when the watched file is removed.
    pub on_remove: RemovePolicy,

    /// Grace period for a removed file to reappear.
    pub remove_grace_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            on_remove: RemovePolicy::Stop,
            remove_grace_ms: 100,
        }
    }
}

impl From<&WatcherConfig> for WatchOptions {
    fn from(config: &WatcherConfig) -> Self {
        WatchOptions {
            on_remove: config.on_remove,
            remove_grace: Duration::from_millis(config.remove_grace_ms),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `tracing` filter; `RUST_LOG` overrides it.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
        }
    }
}
