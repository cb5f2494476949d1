use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::watch::{ConfigEvent, WatchHandle};

/// A loaded configuration that stays in sync with its file.
///
/// Cloning is cheap; all clones share the same value and watch engine. Reads always
/// see a fully loaded value because the engine swaps in complete replacements. The
/// engine stops when [`LiveConfig::stop`] is called or the last clone is dropped.
pub struct LiveConfig<T> {
    value: Arc<RwLock<T>>,
    path: PathBuf,
    events: broadcast::Sender<ConfigEvent>,
    watch: Option<Arc<WatchHandle>>,
}

impl<T> Clone for LiveConfig<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            path: self.path.clone(),
            events: self.events.clone(),
            watch: self.watch.clone(),
        }
    }
}

impl<T: Clone> LiveConfig<T> {
    pub(crate) fn new(
        value: Arc<RwLock<T>>,
        path: PathBuf,
        events: broadcast::Sender<ConfigEvent>,
        watch: Option<WatchHandle>,
    ) -> Self {
        Self {
            value,
            path,
            events,
            watch: watch.map(Arc::new),
        }
    }

    /// Returns a clone of the current configuration, handling poisoned locks gracefully
    pub fn get(&self) -> T {
        snapshot(&self.value)
    }

    /// Runs `f` against the current configuration without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self.value.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    /// The configured file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true while the file is being watched.
    pub fn is_watching(&self) -> bool {
        self.watch.as_ref().is_some_and(|watch| watch.is_running())
    }

    /// Subscribes to reload and recovery notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.events.subscribe()
    }

    /// Creates a stream of reload and recovery notifications.
    ///
    /// Notifications missed by a slow consumer are skipped. The stream ends once the
    /// watch engine and every clone of this handle are gone.
    pub fn changes(&self) -> impl Stream<Item = ConfigEvent> + use<T> {
        let receiver = self.events.subscribe();

        futures::stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => return Some((event, receiver)),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => return None,
                }
            }
        })
    }

    /// Stops watching the file and waits for the engine to exit.
    ///
    /// The current value stays readable. Does nothing if watching was disabled.
    pub async fn stop(&self) {
        if let Some(watch) = &self.watch {
            watch.stop().await;
        }
    }
}

/// Clones the value behind the lock, recovering from poisoning.
pub(crate) fn snapshot<T: Clone>(value: &RwLock<T>) -> T {
    match value.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replaces the value behind the lock, recovering from poisoning.
pub(crate) fn replace<T>(value: &RwLock<T>, next: T) {
    match value.write() {
        Ok(mut guard) => *guard = next,
        Err(poisoned) => *poisoned.into_inner() = next,
    }
}
