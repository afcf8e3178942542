//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!
//! Consumers:
//!     → stdout, collected by the host
//! ```
//!
//! # Design Decisions
//! - Structured fields (path, signal, hook index) instead of formatted text
//! - Library code only emits events; the binary installs the subscriber

pub mod logging;

pub use logging::init_logging;
