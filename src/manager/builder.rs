use std::{path::PathBuf, sync::Arc, time::Duration};

use serde::{Serialize, de::DeserializeOwned};
use toml::Value;

use super::Manager;
use crate::{
    defaults::{DefaultStore, Decoder, TomlDecoder},
    loader::Loader,
    watch::{ChangeCallback, WatchEvent},
};

/// Window in which bursts of file events are gathered before reacting.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Builder for [`Manager`].
///
/// Options are applied in call order, and later calls override earlier ones. Because
/// defaults are split when they are registered, [`ManagerBuilder::key_delim`] must be
/// called before the defaults it should apply to.
pub struct ManagerBuilder<T> {
    loader: Arc<dyn Loader<T>>,
    decoder: Arc<dyn Decoder<T>>,
    path: PathBuf,
    defaults: DefaultStore,
    auto_create: bool,
    recover_if_removed: bool,
    watch_config_file: bool,
    debounce: Duration,
    on_change: Option<ChangeCallback>,
}

impl<T> ManagerBuilder<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub(super) fn new(loader: impl Loader<T>, path: impl Into<PathBuf>) -> Self {
        Self {
            loader: Arc::new(loader),
            decoder: Arc::new(TomlDecoder),
            path: path.into(),
            defaults: DefaultStore::new(),
            auto_create: true,
            recover_if_removed: true,
            watch_config_file: true,
            debounce: DEFAULT_DEBOUNCE,
            on_change: None,
        }
    }
}

impl<T> ManagerBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Registers a callback invoked with the triggering event after each reload or
    /// recovery. It is not called for ignored events, failed reloads, or the
    /// notifications caused by the engine rewriting a removed file.
    pub fn on_config_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&WatchEvent) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    /// Enables or disables watching the file after it is read. Default: `true`.
    pub fn watch_config_file(mut self, watch: bool) -> Self {
        self.watch_config_file = watch;
        self
    }

    /// Sets the delimiter used to split default keys. Default: `"."`.
    ///
    /// Must be called before registering the defaults it should apply to.
    pub fn key_delim(mut self, delim: impl Into<String>) -> Self {
        self.defaults.set_key_delim(delim);
        self
    }

    /// Creates the file from the defaults when it does not exist. Default: `true`.
    pub fn create_if_not_exists(mut self, create: bool) -> Self {
        self.auto_create = create;
        self
    }

    /// Recreates the file from memory when it is renamed or removed. Default: `true`.
    pub fn recover_if_removed(mut self, recover: bool) -> Self {
        self.recover_if_removed = recover;
        self
    }

    /// Sets the window in which bursts of file events are handled together.
    ///
    /// `Duration::ZERO` reacts to every event on its own.
    pub fn debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    /// Replaces the decoder that merges defaults into the target.
    pub fn decoder(mut self, decoder: impl Decoder<T> + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Registers a default value at a delimited key.
    pub fn with_default(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.defaults.set_default(key, value);
        self
    }

    /// Registers several default values, in iteration order.
    pub fn with_defaults<K, V>(mut self, defaults: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in defaults {
            self.defaults.set_default(key.as_ref(), value);
        }
        self
    }

    /// Builds the manager.
    pub fn build(self) -> Manager<T> {
        Manager {
            loader: self.loader,
            decoder: self.decoder,
            path: self.path,
            defaults: self.defaults,
            auto_create: self.auto_create,
            recover_if_removed: self.recover_if_removed,
            watch_config_file: self.watch_config_file,
            debounce: self.debounce,
            on_change: self.on_change,
        }
    }
}
