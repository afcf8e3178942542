//! Directory-level watcher for a single file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::watch::event::ChangeEvent;
use crate::watch::path::WatchTarget;
use crate::watch::session::{Decision, WatchSession};

/// Errors surfaced while arming a watch.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("path has no file name: {0:?}")]
    NoFileName(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to create file system watcher: {0}")]
    Notify(#[from] notify::Error),

    #[error("watch task ended before the watch was armed")]
    Aborted,
}

/// What happens when the watched file itself is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovePolicy {
    /// End the watch unless the file reappears within the grace period.
    #[default]
    Stop,
    /// Keep watching the directory for the file to come back.
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    pub on_remove: RemovePolicy,
    /// How long a removed file has to reappear before the watch ends.
    /// Zero ends the watch on the removal event itself.
    pub remove_grace: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            on_remove: RemovePolicy::Stop,
            remove_grace: Duration::from_millis(100),
        }
    }
}

/// Why a watch's event loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchExit {
    /// The watched file was removed and did not come back.
    Removed,
    /// Stopped through [`WatchHandle::stop`].
    Stopped,
    /// The underlying watcher reported an error.
    Failed(String),
    /// The notification source went away.
    Closed,
}

/// Handle to a running watch.
///
/// Dropping the handle does not stop the watch.
#[derive(Debug)]
pub struct WatchHandle {
    path: PathBuf,
    cancel: CancellationToken,
    task: JoinHandle<WatchExit>,
}

impl WatchHandle {
    /// The file being watched, as reported by the directory watcher.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ask the event loop to end. It releases the watch as it exits.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Token that stops the watch when cancelled; usable from sync hooks.
    pub fn stopper(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the event loop to end.
    pub async fn join(self) -> WatchExit {
        match self.task.await {
            Ok(exit) => exit,
            Err(err) => WatchExit::Failed(err.to_string()),
        }
    }
}

/// Watch `path` with default options. See [`watch_file_with`].
pub async fn watch_file<P, F>(path: P, on_change: F) -> Result<WatchHandle, WatchError>
where
    P: AsRef<Path>,
    F: FnMut(ChangeEvent) + Send + 'static,
{
    watch_file_with(path, WatchOptions::default(), on_change).await
}

/// Watch a single file by watching its parent directory.
///
/// Returns once the directory watch is registered; events are then handled
/// on a background task. `on_change` runs on that task, so a slow callback
/// delays later events for this watch.
///
/// The callback fires when the file is written or created (including being
/// renamed into place), or when its symlink target changes without an event
/// on the link itself.
///
/// Callbacks follow OS notifications one to one, so a single logical save
/// may fire more than once (`fs::write` on an existing file truncates and
/// then writes).
pub async fn watch_file_with<P, F>(
    path: P,
    options: WatchOptions,
    on_change: F,
) -> Result<WatchHandle, WatchError>
where
    P: AsRef<Path>,
    F: FnMut(ChangeEvent) + Send + 'static,
{
    let target = WatchTarget::new(path.as_ref())?;
    let watched = target.file.clone();
    let cancel = CancellationToken::new();
    let (ready_tx, ready_rx) = oneshot::channel();

    let task = tokio::spawn(run_watch(target, options, on_change, cancel.clone(), ready_tx));

    match ready_rx.await {
        Ok(Ok(())) => Ok(WatchHandle {
            path: watched,
            cancel,
            task,
        }),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(WatchError::Aborted),
    }
}

fn arm(
    dir: &Path,
    tx: mpsc::UnboundedSender<notify::Result<Event>>,
) -> Result<RecommendedWatcher, WatchError> {
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        },
        Config::default(),
    )?;
    // Watch the directory, not the file: atomic saves replace the inode.
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

async fn run_watch<F>(
    target: WatchTarget,
    options: WatchOptions,
    on_change: F,
    cancel: CancellationToken,
    ready: oneshot::Sender<Result<(), WatchError>>,
) -> WatchExit
where
    F: FnMut(ChangeEvent) + Send + 'static,
{
    let session = WatchSession::new(target);
    let (tx, rx) = mpsc::unbounded_channel();

    let watcher = match arm(&session.target().dir, tx) {
        Ok(watcher) => watcher,
        Err(err) => {
            tracing::error!(dir = ?session.target().dir, error = %err, "Creating file system watcher failed");
            let exit = WatchExit::Failed(err.to_string());
            let _ = ready.send(Err(err));
            return exit;
        }
    };

    tracing::info!(
        path = ?session.target().file,
        real_path = ?session.real_path(),
        "File watch armed"
    );
    let _ = ready.send(Ok(()));

    let exit = event_loop(session, rx, options, on_change, cancel).await;

    drop(watcher);
    tracing::info!(?exit, "File watch ended");
    exit
}

async fn event_loop<F>(
    mut session: WatchSession,
    mut rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    options: WatchOptions,
    mut on_change: F,
    cancel: CancellationToken,
) -> WatchExit
where
    F: FnMut(ChangeEvent),
{
    let mut removal_deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => return WatchExit::Stopped,

            _ = removal_elapsed(removal_deadline) => {
                tracing::info!(path = ?session.target().file, "Watched file removed");
                return WatchExit::Removed;
            }

            msg = rx.recv() => match msg {
                None => return WatchExit::Closed,
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "Watcher error");
                    return WatchExit::Failed(err.to_string());
                }
                Some(Ok(event)) => {
                    for change in ChangeEvent::from_notify(event) {
                        match session.observe(&change) {
                            Decision::Notify => {
                                if removal_deadline.take().is_some() {
                                    tracing::debug!(path = ?change.path, "Watched file reappeared");
                                }
                                tracing::debug!(path = ?change.path, kind = %change.kind, "Relevant change");
                                on_change(change);
                            }
                            Decision::Removed => match options.on_remove {
                                RemovePolicy::Stop if options.remove_grace.is_zero() => {
                                    tracing::info!(path = ?session.target().file, "Watched file removed");
                                    return WatchExit::Removed;
                                }
                                RemovePolicy::Stop => {
                                    removal_deadline.get_or_insert_with(|| Instant::now() + options.remove_grace);
                                }
                                RemovePolicy::Keep => {
                                    tracing::debug!(path = ?change.path, "Watched file removed, waiting for it to return");
                                }
                            },
                            Decision::Ignore => {}
                        }
                    }
                }
            },
        }
    }
}

async fn removal_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
