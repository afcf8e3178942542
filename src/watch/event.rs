//! Change events handed to watch callbacks.

use std::fmt;
use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind, RenameMode};

/// Coarse classification of a directory notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Write,
    Create,
    Remove,
    Other,
}

impl ChangeKind {
    /// Classify a notify event kind. Renames onto a path count as creates.
    pub fn classify(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => ChangeKind::Create,
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => ChangeKind::Create,
            EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Other,
            EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::Other,
            EventKind::Modify(_) => ChangeKind::Write,
            EventKind::Remove(_) => ChangeKind::Remove,
            _ => ChangeKind::Other,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeKind::Write => "write",
            ChangeKind::Create => "create",
            ChangeKind::Remove => "remove",
            ChangeKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// A single path-level change observed in the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Split a notify event into one change per affected path.
    pub fn from_notify(event: notify::Event) -> Vec<ChangeEvent> {
        let notify::Event { kind, paths, .. } = event;

        match kind {
            // paths = [from, to]. The separate From/To events already carry
            // the direction, so the paired event adds nothing.
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => paths
                .into_iter()
                .map(|path| ChangeEvent::new(path, ChangeKind::Other))
                .collect(),
            // Backends that can't tell the rename direction (FSEvents).
            EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => paths
                .into_iter()
                .map(|path| {
                    let kind = if exists(&path) {
                        ChangeKind::Create
                    } else {
                        ChangeKind::Remove
                    };
                    ChangeEvent::new(path, kind)
                })
                .collect(),
            kind => {
                let kind = ChangeKind::classify(&kind);
                paths
                    .into_iter()
                    .map(|path| ChangeEvent::new(path, kind))
                    .collect()
            }
        }
    }
}

fn exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}
