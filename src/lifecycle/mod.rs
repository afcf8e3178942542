//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → SignalBridge (broadcast + single-fire token)
//!
//! Shutdown (shutdown.rs):
//!     Signal received → mark not ready → run hooks in order → drain pending work → return
//!
//! Contexts (context.rs):
//!     SignalBridge token → child token per context → cancelled on first signal
//! ```
//!
//! # Design Decisions
//! - One signal registration per process, shared by every consumer
//! - Hooks are synchronous and run one at a time
//! - Drain has an optional timeout: forced return after deadline

pub mod context;
pub mod shutdown;
pub mod signals;

pub use context::CancellableContext;
pub use shutdown::{PendingWork, ShutdownCoordinator, ShutdownHook, ShutdownReport, WorkGuard};
pub use signals::{SignalBridge, TerminationSignal};
