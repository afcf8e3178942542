//! Liveness and readiness state.
//!
//! # States
//! - Alive: the process is running and making progress
//! - Ready: the process accepts new work
//!
//! # State Transitions
//! ```text
//! start → alive, not ready
//! mark_ready → ready
//! termination signal → not ready (still alive while draining)
//! ```
//!
//! # Design Decisions
//! - Plain atomics, readable from any thread or probe endpoint
//! - Readiness transitions are logged; liveness pings are not

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct ProbeState {
    alive: AtomicBool,
    ready: AtomicBool,
    heartbeats: AtomicU64,
}

/// Shared liveness/readiness flags.
#[derive(Debug, Clone)]
pub struct Probes {
    state: Arc<ProbeState>,
}

impl Probes {
    /// Alive, not yet ready.
    pub fn new() -> Self {
        Self {
            state: Arc::new(ProbeState {
                alive: AtomicBool::new(true),
                ready: AtomicBool::new(false),
                heartbeats: AtomicU64::new(0),
            }),
        }
    }

    pub fn mark_ready(&self) {
        if !self.state.ready.swap(true, Ordering::SeqCst) {
            tracing::info!("Readiness: ready");
        }
    }

    pub fn mark_not_ready(&self) {
        if self.state.ready.swap(false, Ordering::SeqCst) {
            tracing::info!("Readiness: not ready");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state.ready.load(Ordering::SeqCst)
    }

    /// Liveness hook: record that the process is still making progress.
    pub fn notify_alive(&self) {
        self.state.alive.store(true, Ordering::Relaxed);
        self.state.heartbeats.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_dead(&self) {
        self.state.alive.store(false, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        self.state.alive.load(Ordering::SeqCst)
    }

    /// Number of liveness notifications so far.
    pub fn heartbeats(&self) -> u64 {
        self.state.heartbeats.load(Ordering::Relaxed)
    }
}

impl Default for Probes {
    fn default() -> Self {
        Self::new()
    }
}
