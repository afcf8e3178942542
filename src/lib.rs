//! Process lifecycle building blocks for long-running services.
//!
//! - [`lifecycle`]: termination signals, graceful shutdown, cancellation contexts
//! - [`watch`]: symlink-aware single-file watcher for mounted config and secrets
//! - [`config`]: TOML configuration with hot reload
//! - [`health`]: liveness/readiness flags

pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod util;
pub mod watch;

pub use config::FoundationConfig;
pub use lifecycle::{CancellableContext, PendingWork, ShutdownCoordinator, SignalBridge};
pub use watch::{watch_file, watch_file_with, ChangeEvent, ChangeKind, WatchHandle};
