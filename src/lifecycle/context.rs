//! Signal-aware cancellation contexts.

use std::future::Future;

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::lifecycle::signals::SignalBridge;

/// A cancellation context that trips on the first termination signal.
///
/// The context is a child of the bridge's token: it does not inherit any
/// other cancellation ancestry, cancelling it never cancels the bridge, and
/// dropping every clone unsubscribes it from the bridge.
#[derive(Debug, Clone)]
pub struct CancellableContext {
    token: CancellationToken,
}

impl CancellableContext {
    /// Derive a context from the shared bridge. Already cancelled if a signal
    /// arrived earlier.
    pub fn wrap(bridge: &SignalBridge) -> Self {
        Self {
            token: bridge.token().child_token(),
        }
    }

    /// Cancel this context. Further calls are no-ops.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Derived context cancelled together with this one.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Drive `future` until it completes or the context is cancelled.
    pub async fn run_until_cancelled<F>(&self, future: F) -> Option<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            output = future => Some(output),
        }
    }
}
