//! Shared utilities for integration tests.

use std::path::Path;
use std::time::Duration;

use service_foundation::ChangeEvent;
use tokio::sync::mpsc;

/// Time allowed for a change to reach a callback.
#[allow(dead_code)]
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Quiet period used to assert that nothing (more) arrives.
#[allow(dead_code)]
pub const SETTLE: Duration = Duration::from_millis(500);

/// A watch callback that forwards every change into a channel.
#[allow(dead_code)]
pub fn recorder() -> (
    impl FnMut(ChangeEvent) + Send + 'static,
    mpsc::UnboundedReceiver<ChangeEvent>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback = move |event: ChangeEvent| {
        let _ = tx.send(event);
    };
    (callback, rx)
}

/// Wait for the next change, or `None` on timeout/close.
#[allow(dead_code)]
pub async fn next_change(rx: &mut mpsc::UnboundedReceiver<ChangeEvent>) -> Option<ChangeEvent> {
    tokio::time::timeout(EVENT_TIMEOUT, rx.recv()).await.ok().flatten()
}

/// Collect everything that arrives within the settle window.
#[allow(dead_code)]
pub async fn drain(rx: &mut mpsc::UnboundedReceiver<ChangeEvent>) -> Vec<ChangeEvent> {
    let mut seen = Vec::new();
    while let Ok(Some(event)) = tokio::time::timeout(SETTLE, rx.recv()).await {
        seen.push(event);
    }
    seen
}

/// Append to an existing file with a single write.
#[allow(dead_code)]
pub fn append(path: &Path, text: &str) {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
}

/// Replace `path` by writing a sibling temp file and renaming it into place.
#[allow(dead_code)]
pub fn atomic_replace(path: &Path, text: &str) {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, text).unwrap();
    std::fs::rename(&tmp, path).unwrap();
}
