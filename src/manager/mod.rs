//! Configuration manager: defaults, initial load and live reload.
//!
//! # Data Flow
//! ```text
//! ManagerBuilder (loader, path, options, defaults)
//!     → Manager::read_config(target)
//!         defaults decoded into target
//!         → file created from target if missing (auto-create)
//!         → loader reads file into target
//!         → watch engine started, subscription confirmed
//!     → LiveConfig<T> (shared, updated on file events)
//! ```

mod builder;
mod file_creation;
pub(crate) mod live;

pub use builder::{DEFAULT_DEBOUNCE, ManagerBuilder};
pub use live::LiveConfig;

use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::Duration,
};

use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::{
    ConfigError, Result,
    defaults::{DefaultStore, Decoder},
    loader::Loader,
    watch::{self, ChangeCallback, EngineContext, WatchSession},
};

use file_creation::create_config_dir;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Reads a configuration file on top of defaults and keeps it live.
///
/// Built with [`Manager::builder`]; immutable afterwards.
pub struct Manager<T> {
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

impl<T> Manager<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Starts building a manager for the file at `path`, read and written by `loader`.
    pub fn builder(loader: impl Loader<T>, path: impl Into<PathBuf>) -> ManagerBuilder<T> {
        ManagerBuilder::new(loader, path)
    }
}

impl<T> Manager<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Populates `target` from the defaults and the file, then keeps it up to date.
    ///
    /// Steps, in order:
    /// 1. decode the defaults into `target`;
    /// 2. if the file is missing and auto-create is on, create its directory and save
    ///    `target` to it;
    /// 3. load the file into `target`;
    /// 4. if watching is on, start the watch engine and wait for its subscription.
    ///
    /// # Errors
    /// * `ConfigError::Decode` - If the defaults do not fit the target
    /// * `ConfigError::NotFound` - If the file is missing and auto-create is off
    /// * `ConfigError::Io` - If the file or its directory cannot be inspected or created
    /// * `ConfigError::Save` / `ConfigError::Load` - If the loader fails
    /// * `ConfigError::WatcherInit` / `ConfigError::FileWatch` - If watching cannot start
    pub async fn read_config(&self, mut target: T) -> Result<LiveConfig<T>> {
        self.defaults.decode_into(self.decoder.as_ref(), &mut target)?;

        let exists = self
            .path
            .try_exists()
            .map_err(|e| ConfigError::io(e, &self.path))?;

        if !exists {
            if !self.auto_create {
                return Err(ConfigError::NotFound {
                    path: self.path.clone(),
                });
            }

            create_config_dir(&self.path)?;
            self.loader.save(&self.path, &target)?;
            info!(path = %self.path.display(), "created config file from defaults");
        }

        let session = if self.watch_config_file {
            Some(WatchSession::new(&self.path)?)
        } else {
            None
        };

        self.loader.load(&self.path, &mut target)?;
        debug!(path = %self.path.display(), "loaded config file");

        let value = Arc::new(RwLock::new(target));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let handle = match session {
            Some(session) => {
                let ctx = EngineContext {
                    loader: Arc::clone(&self.loader),
                    target: Arc::clone(&value),
                    on_change: self.on_change.clone(),
                    events: events.clone(),
                    recover_if_removed: self.recover_if_removed,
                    debounce: self.debounce,
                };
                Some(watch::start(ctx, session).await?)
            }
            None => None,
        };

        Ok(LiveConfig::new(value, self.path.clone(), events, handle))
    }

    /// The configured file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The registered defaults.
    pub fn defaults(&self) -> &DefaultStore {
        &self.defaults
    }
}
