//! `foundation`: watch files until SIGTERM/SIGINT, then shut down gracefully.
//!
//! ```text
//! foundation --config foundation.toml --watch /etc/secrets/token
//! ```
//!
//! Every `--watch` file gets its own watcher that logs relevant changes.
//! With `--config`, the config file is hot-reloaded as well. On the first
//! termination signal the watchers are stopped by shutdown hooks and the
//! process exits once the reload task has drained.

use std::path::PathBuf;

use clap::Parser;

use service_foundation::config::{load_config, ConfigWatcher, FoundationConfig};
use service_foundation::health::Probes;
use service_foundation::observability::init_logging;
use service_foundation::watch::{watch_file_with, WatchOptions};
use service_foundation::ShutdownCoordinator;

#[derive(Parser)]
#[command(name = "foundation")]
#[command(about = "Watch files for changes until a termination signal arrives", long_about = None)]
struct Cli {
    /// TOML configuration file; reloaded when it changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File to watch. May be given more than once.
    #[arg(short, long = "watch")]
    watch: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FoundationConfig::default(),
    };

    init_logging(&config.observability.log_filter)?;
    tracing::info!("foundation v{} starting", env!("CARGO_PKG_VERSION"));

    let probes = Probes::new();
    let mut coordinator = ShutdownCoordinator::init()?
        .with_config(config.shutdown.clone())
        .with_probes(probes.clone());
    let options = WatchOptions::from(&config.watcher);

    let mut handles = Vec::with_capacity(cli.watch.len());
    for path in &cli.watch {
        let handle = watch_file_with(path, options.clone(), |event| {
            tracing::info!(path = ?event.path, kind = %event.kind, "Watched file changed");
        })
        .await?;

        let stop = handle.stopper();
        coordinator.on_shutdown(move || stop.cancel());
        handles.push(handle);
    }

    if let Some(path) = &cli.config {
        let (handle, mut updates) = ConfigWatcher::new(path, options.clone()).spawn().await?;

        // Ends once the watch is stopped and the update channel closes.
        let probes = probes.clone();
        coordinator.pending_work().spawn(async move {
            while let Some(new_config) = updates.recv().await {
                probes.notify_alive();
                tracing::info!(
                    on_remove = ?new_config.watcher.on_remove,
                    remove_grace_ms = new_config.watcher.remove_grace_ms,
                    log_filter = %new_config.observability.log_filter,
                    "Configuration reloaded"
                );
            }
        });

        let stop = handle.stopper();
        coordinator.on_shutdown(move || stop.cancel());
        handles.push(handle);
    }

    probes.mark_ready();
    let report = coordinator.run_until_shutdown().await;

    for handle in handles {
        let path = handle.path().to_path_buf();
        let exit = handle.join().await;
        tracing::debug!(?path, ?exit, "Watcher finished");
    }

    tracing::info!(
        signal = %report.signal,
        hooks_failed = report.hooks_failed,
        drained = report.drained,
        "Shutdown complete"
    );
    Ok(())
}
