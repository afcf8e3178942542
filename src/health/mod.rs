//! Health state subsystem.
//!
//! # Data Flow
//! ```text
//! Startup finished → Probes::mark_ready
//! Worker loops → Probes::notify_alive
//! Termination signal → ShutdownCoordinator → Probes::mark_not_ready
//! ```
//!
//! Serving the flags over HTTP is left to the embedding service.

pub mod probes;

pub use probes::Probes;
