//! Per-watch state and the relevant-change filter.

use std::path::PathBuf;

use crate::watch::event::{ChangeEvent, ChangeKind};
use crate::watch::path::{resolve_real_path, WatchTarget};

/// What the event loop should do with a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Invoke the callback.
    Notify,
    /// The target itself was removed.
    Removed,
    Ignore,
}

/// State owned by a single watch's event loop.
#[derive(Debug)]
pub struct WatchSession {
    target: WatchTarget,
    real_path: Option<PathBuf>,
}

impl WatchSession {
    pub fn new(target: WatchTarget) -> Self {
        let real_path = resolve_real_path(&target.requested);
        Self { target, real_path }
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    pub fn real_path(&self) -> Option<&PathBuf> {
        self.real_path.as_ref()
    }

    /// Re-resolve the target and decide on `change`.
    pub fn observe(&mut self, change: &ChangeEvent) -> Decision {
        let current = resolve_real_path(&self.target.requested);
        self.decide(change, current)
    }

    /// A change is relevant when it writes or creates the target itself, or
    /// when the target now resolves somewhere other than before (symlink
    /// swapped underneath it).
    fn decide(&mut self, change: &ChangeEvent, current: Option<PathBuf>) -> Decision {
        let is_target = self.target.is_target(&change.path);
        let written = is_target && matches!(change.kind, ChangeKind::Write | ChangeKind::Create);
        let retargeted = current.is_some() && current != self.real_path;

        if written || retargeted {
            self.real_path = current;
            return Decision::Notify;
        }

        if is_target && change.kind == ChangeKind::Remove {
            return Decision::Removed;
        }

        Decision::Ignore
    }
}
