//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::FoundationConfig;
use crate::watch::{watch_file_with, WatchError, WatchHandle, WatchOptions};

/// A watcher that reloads the configuration file whenever it changes.
pub struct ConfigWatcher {
    path: PathBuf,
    options: WatchOptions,
}

impl ConfigWatcher {
    pub fn new(path: &Path, options: WatchOptions) -> Self {
        Self {
            path: path.to_path_buf(),
            options,
        }
    }

    /// Start watching.
    ///
    /// Every successful reload is sent on the returned receiver. A file that
    /// fails to load is logged and skipped, so consumers keep their current
    /// configuration. The receiver closes when the watch ends.
    pub async fn spawn(
        self,
    ) -> Result<(WatchHandle, mpsc::UnboundedReceiver<FoundationConfig>), WatchError> {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let path = self.path.clone();

        let handle = watch_file_with(&self.path, self.options, move |event| {
            tracing::info!(path = ?event.path, kind = %event.kind, "Config file change detected, reloading...");
            match load_config(&path) {
                Ok(config) => {
                    let _ = update_tx.send(config);
                }
                Err(e) => {
                    tracing::error!("Failed to reload config: {}. Keeping current configuration.", e);
                }
            }
        })
        .await?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok((handle, update_rx))
    }
}
