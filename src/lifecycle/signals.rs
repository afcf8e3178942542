//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGTERM/SIGINT handlers
//! - Fan every received signal out to all subscribers
//! - Trip a single-fire token on the first signal
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - One registration per bridge; contexts and coordinators subscribe to the
//!   bridge instead of registering their own handlers
//! - Repeated signals are still broadcast; most callers only act on the first

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Buffered signals per subscriber before the oldest is dropped.
const SIGNAL_CAPACITY: usize = 8;

/// A process-termination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationSignal {
    /// SIGTERM (orchestrator stop, `kill`).
    Terminate,
    /// SIGINT (Ctrl-C).
    Interrupt,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationSignal::Terminate => f.write_str("SIGTERM"),
            TerminationSignal::Interrupt => f.write_str("SIGINT"),
        }
    }
}

#[derive(Debug)]
struct Inner {
    tx: broadcast::Sender<TerminationSignal>,
    done: CancellationToken,
    first: OnceLock<TerminationSignal>,
    /// Cancelled when the last bridge clone is dropped.
    closed: CancellationToken,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}

/// Shared termination broadcaster.
///
/// Cloning is cheap; all clones observe the same signals.
#[derive(Debug, Clone)]
pub struct SignalBridge {
    inner: Arc<Inner>,
}

impl SignalBridge {
    /// Create a bridge without OS registration. Signals only arrive via
    /// [`SignalBridge::trigger`].
    pub fn manual() -> Self {
        let (tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                tx,
                done: CancellationToken::new(),
                first: OnceLock::new(),
                closed: CancellationToken::new(),
            }),
        }
    }

    /// Register SIGTERM and SIGINT handlers and forward them into a new bridge.
    ///
    /// The forwarder task ends when the last clone of the bridge is dropped,
    /// releasing the OS registrations with it.
    ///
    /// # Panics
    /// Panics when called outside of a Tokio runtime.
    pub fn install() -> std::io::Result<Self> {
        let bridge = Self::manual();
        let os_signals = OsSignals::register()?;
        tokio::spawn(forward(os_signals, &bridge));

        tracing::debug!("Termination signal handlers installed");
        Ok(bridge)
    }

    /// Subscribe to every signal received from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TerminationSignal> {
        self.inner.tx.subscribe()
    }

    /// Token cancelled once, on the first signal.
    pub fn token(&self) -> CancellationToken {
        self.inner.done.clone()
    }

    /// Deliver a signal as if it came from the OS.
    pub fn trigger(&self, signal: TerminationSignal) {
        if self.inner.first.set(signal).is_ok() {
            tracing::debug!(%signal, "First termination signal");
        }
        // No subscribers is fine; the token still records the signal.
        let _ = self.inner.tx.send(signal);
        self.inner.done.cancel();
    }

    /// The first signal received, if any.
    pub fn received(&self) -> Option<TerminationSignal> {
        self.inner.first.get().copied()
    }

    /// Wait for the first signal. Returns immediately if it already arrived.
    pub async fn wait(&self) -> TerminationSignal {
        self.inner.done.cancelled().await;
        self.received().unwrap_or(TerminationSignal::Terminate)
    }

    /// Number of live broadcast subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.tx.receiver_count()
    }
}

/// Forward OS signals into `bridge` until it is dropped.
fn forward(
    mut os_signals: OsSignals,
    bridge: &SignalBridge,
) -> impl std::future::Future<Output = ()> + Send + 'static {
    let weak: Weak<Inner> = Arc::downgrade(&bridge.inner);
    let closed = bridge.inner.closed.clone();

    async move {
        loop {
            let signal = tokio::select! {
                _ = closed.cancelled() => break,
                signal = os_signals.next() => signal,
            };
            let Some(signal) = signal else { break };
            match weak.upgrade() {
                Some(inner) => SignalBridge { inner }.trigger(signal),
                None => break,
            }
        }
        tracing::debug!("Signal forwarder stopped");
    }
}

#[cfg(unix)]
struct OsSignals {
    terminate: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }

    async fn next(&mut self) -> Option<TerminationSignal> {
        tokio::select! {
            s = self.terminate.recv() => s.map(|_| TerminationSignal::Terminate),
            s = self.interrupt.recv() => s.map(|_| TerminationSignal::Interrupt),
        }
    }
}

#[cfg(not(unix))]
struct OsSignals;

#[cfg(not(unix))]
impl OsSignals {
    fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn next(&mut self) -> Option<TerminationSignal> {
        tokio::signal::ctrl_c()
            .await
            .ok()
            .map(|_| TerminationSignal::Interrupt)
    }
}
