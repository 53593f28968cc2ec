//! Watcher state file monitoring.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::watcher::source::load_watchers;
use crate::watcher::WatcherView;

/// Monitors the watcher state file and forwards every successfully loaded
/// watcher set.
pub struct StateWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<Vec<WatcherView>>,
}

impl StateWatcher {
    /// Create a new StateWatcher.
    ///
    /// Returns the watcher and a receiver for watcher set updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<Vec<WatcherView>>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::debug!(path = ?path, "Watcher state change detected");
                        match load_watchers(&path) {
                            Ok(watchers) => {
                                let _ = tx.send(watchers);
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    "Failed to reload watcher state, keeping previous state"
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Watcher state monitor started");
        Ok(watcher)
    }
}
