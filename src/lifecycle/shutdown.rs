//! Shutdown coordination.
//!
//! # Responsibilities
//! - Track in-flight work (`PendingWork`)
//! - Block until the first termination signal
//! - Run cleanup hooks in declaration order, then drain pending work
//!
//! # Design Decisions
//! - `run_until_shutdown` consumes the coordinator, so it runs at most once
//! - Work tracking is RAII: a `WorkGuard` decrements on drop
//! - Hook panics are isolated by default; see [`ShutdownConfig`]

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::task::{task_tracker::TaskTrackerToken, TaskTracker};

use crate::config::schema::ShutdownConfig;
use crate::health::Probes;
use crate::lifecycle::signals::{SignalBridge, TerminationSignal};

/// A zero-argument cleanup action run after the termination signal.
pub type ShutdownHook = Box<dyn FnOnce() + Send + 'static>;

/// Counter of in-flight work that shutdown waits on.
#[derive(Debug, Clone, Default)]
pub struct PendingWork {
    tracker: TaskTracker,
}

/// Marks one unit of pending work; dropping it completes the unit.
#[derive(Debug)]
#[must_use = "pending work completes as soon as the guard is dropped"]
pub struct WorkGuard {
    _token: TaskTrackerToken,
}

impl PendingWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a unit of work.
    pub fn begin(&self) -> WorkGuard {
        WorkGuard {
            _token: self.tracker.token(),
        }
    }

    /// Spawn a task that counts as pending work until it finishes.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn(future)
    }

    /// Units of work still outstanding.
    pub fn count(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until the count reaches zero.
    ///
    /// Work may still be started while waiting; it is waited on as well.
    pub async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

/// Why a hook did not complete.
#[derive(Debug, Error)]
pub enum HookFailure {
    #[error("hook panicked: {0}")]
    Panicked(String),

    #[error("hook did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("hook task was cancelled")]
    Cancelled,
}

/// Outcome of a completed shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// The signal that started shutdown.
    pub signal: TerminationSignal,
    /// Hooks invoked.
    pub hooks_run: usize,
    /// Hooks that panicked or timed out.
    pub hooks_failed: usize,
    /// False when the drain timeout elapsed with work outstanding.
    pub drained: bool,
}

/// Coordinator for graceful shutdown.
pub struct ShutdownCoordinator {
    bridge: SignalBridge,
    pending: PendingWork,
    hooks: Vec<ShutdownHook>,
    config: ShutdownConfig,
    probes: Option<Probes>,
}

impl ShutdownCoordinator {
    /// Install OS signal handlers and create a coordinator with no pending work.
    pub fn init() -> std::io::Result<Self> {
        Ok(Self::new(SignalBridge::install()?))
    }

    /// Create a coordinator driven by an existing bridge.
    pub fn new(bridge: SignalBridge) -> Self {
        Self {
            bridge,
            pending: PendingWork::new(),
            hooks: Vec::new(),
            config: ShutdownConfig::default(),
            probes: None,
        }
    }

    pub fn with_config(mut self, config: ShutdownConfig) -> Self {
        self.config = config;
        self
    }

    /// Flip these probes to not-ready when the signal arrives.
    pub fn with_probes(mut self, probes: Probes) -> Self {
        self.probes = Some(probes);
        self
    }

    /// Append a hook. Hooks run in the order they were added.
    pub fn on_shutdown<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn pending_work(&self) -> PendingWork {
        self.pending.clone()
    }

    pub fn bridge(&self) -> &SignalBridge {
        &self.bridge
    }

    /// Block until a termination signal, run the hooks, then wait for pending
    /// work to drain.
    pub async fn run_until_shutdown(self) -> ShutdownReport {
        let Self {
            bridge,
            pending,
            hooks,
            config,
            probes,
        } = self;

        let signal = bridge.wait().await;
        tracing::info!(
            %signal,
            pending = pending.count(),
            "Received signal. Waiting for running tasks to finish..."
        );

        if let Some(probes) = &probes {
            probes.mark_not_ready();
        }

        let hooks_run = hooks.len();
        let mut hooks_failed = 0;
        for (index, hook) in hooks.into_iter().enumerate() {
            if let Err(failure) = run_hook(hook, &config).await {
                hooks_failed += 1;
                tracing::error!(hook = index, error = %failure, "Shutdown hook failed");
            }
        }

        let drained = match config.drain_timeout() {
            Some(limit) => match tokio::time::timeout(limit, pending.wait()).await {
                Ok(()) => true,
                Err(_) => {
                    tracing::warn!(
                        remaining = pending.count(),
                        timeout_ms = limit.as_millis() as u64,
                        "Pending work did not finish before the drain timeout"
                    );
                    false
                }
            },
            None => {
                pending.wait().await;
                true
            }
        };

        tracing::info!("Shutting down...");

        ShutdownReport {
            signal,
            hooks_run,
            hooks_failed,
            drained,
        }
    }
}

async fn run_hook(hook: ShutdownHook, config: &ShutdownConfig) -> Result<(), HookFailure> {
    if let Some(limit) = config.hook_timeout() {
        // A timed-out hook keeps running on the blocking pool; we just stop waiting.
        let task = tokio::task::spawn_blocking(hook);
        return match tokio::time::timeout(limit, task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) if err.is_panic() => {
                let payload = err.into_panic();
                if !config.isolate_hook_panics {
                    panic::resume_unwind(payload);
                }
                Err(HookFailure::Panicked(panic_message(payload.as_ref())))
            }
            Ok(Err(_)) => Err(HookFailure::Cancelled),
            Err(_) => Err(HookFailure::TimedOut(limit)),
        };
    }

    if !config.isolate_hook_panics {
        hook();
        return Ok(());
    }

    panic::catch_unwind(AssertUnwindSafe(hook))
        .map_err(|payload| HookFailure::Panicked(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
