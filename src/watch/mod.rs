//! Single-file change watching.
//!
//! # Data Flow
//! ```text
//! notify backend thread
//!     → unbounded channel
//!     → event loop task (watcher.rs)
//!     → event.rs (one ChangeEvent per path)
//!     → session.rs (re-resolve symlinks, relevant-change filter)
//!     → caller's callback
//! ```
//!
//! # Design Decisions
//! - The parent directory is watched, never the file: rename-based atomic
//!   updates replace the inode and direct file watches lose track of it
//! - Symlinks are re-resolved on every event so a swapped link target
//!   (mounted config/secret volumes) is seen even without an event on the link
//! - One file and one callback per watch
//! - A failed watcher is not restarted

pub mod event;
pub mod path;
pub mod session;
pub mod watcher;

pub use event::{ChangeEvent, ChangeKind};
pub use watcher::{
    watch_file, watch_file_with, RemovePolicy, WatchError, WatchExit, WatchHandle, WatchOptions,
};
