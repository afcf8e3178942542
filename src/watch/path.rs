//! Path handling for single-file watches.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::watch::WatchError;

/// Lexically normalise a path: drop `.`, fold `..` into its parent.
///
/// Does not touch the filesystem, so symlinks are left alone.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Current symlink target of `path`, or `None` when it can't be resolved
/// (missing file, broken link).
pub fn resolve_real_path(path: &Path) -> Option<PathBuf> {
    fs::canonicalize(path).ok()
}

/// The file being watched and the directory the watch is registered on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    /// Absolute, cleaned path as given by the caller. Symlinks are resolved
    /// through this path.
    pub requested: PathBuf,
    /// Path that directory events for the target are reported under.
    pub file: PathBuf,
    /// Parent directory that is actually watched.
    pub dir: PathBuf,
}

impl WatchTarget {
    pub fn new(path: &Path) -> Result<Self, WatchError> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let requested = clean_path(&absolute);

        let name = requested
            .file_name()
            .ok_or_else(|| WatchError::NoFileName(requested.clone()))?
            .to_owned();
        let parent = requested
            .parent()
            .ok_or_else(|| WatchError::NoFileName(requested.clone()))?;

        // Backends report events under the real directory path.
        let dir = fs::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf());
        let file = dir.join(name);

        Ok(Self {
            requested,
            file,
            dir,
        })
    }

    /// Whether a reported event path refers to the watched file.
    pub fn is_target(&self, event_path: &Path) -> bool {
        clean_path(event_path) == self.file
    }
}
