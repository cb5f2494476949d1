use std::path::{Path, PathBuf};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher, recommended_watcher};
use tokio::sync::mpsc;

use super::WatchEvent;
use crate::{ConfigError, Result};

/// Message delivered by the notification source: an event or a source failure.
pub type SourceMessage = std::result::Result<WatchEvent, notify::Error>;

/// Directory watcher over the platform notification primitive.
///
/// Provides an async interface over the notify crate, converting raw events into
/// [`WatchEvent`]s on a Tokio channel. Dropping the watcher ends the subscription.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    watched_dir: Option<PathBuf>,
}

impl FileWatcher {
    /// Creates a new watcher and returns it with the receiver for its messages.
    ///
    /// Uses an unbounded channel since file events are typically infrequent but bursty.
    ///
    /// # Errors
    /// Returns `ConfigError::WatcherInit` if the underlying watcher cannot be created.
    pub fn new() -> Result<(Self, mpsc::UnboundedReceiver<SourceMessage>)> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let watcher = recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for watch_event in WatchEvent::from_notify(event) {
                    let _ = event_tx.send(Ok(watch_event));
                }
            }
            Err(e) => {
                let _ = event_tx.send(Err(e));
            }
        })
        .map_err(|e| ConfigError::WatcherInit {
            details: e.to_string(),
        })?;

        Ok((
            Self {
                watcher,
                watched_dir: None,
            },
            event_rx,
        ))
    }

    /// Subscribes to changes of the entries directly inside `dir`.
    ///
    /// Any directory watched before is released first.
    ///
    /// # Errors
    /// Returns `ConfigError::FileWatch` if the directory cannot be watched.
    pub fn watch_dir(&mut self, dir: &Path) -> Result<()> {
        if let Some(previous) = self.watched_dir.take() {
            let _ = self.watcher.unwatch(&previous);
        }

        self.watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::FileWatch {
                path: dir.to_path_buf(),
                details: e.to_string(),
            })?;

        self.watched_dir = Some(dir.to_path_buf());
        Ok(())
    }
}
