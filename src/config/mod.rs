//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FoundationConfig (validated, immutable)
//!
//! On change:
//!     watcher.rs sees the file written, replaced or re-linked
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new config sent to the consumer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{FoundationConfig, ObservabilityConfig, ShutdownConfig, WatcherConfig};
pub use watcher::ConfigWatcher;
