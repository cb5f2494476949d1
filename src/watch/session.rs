use std::{
    collections::hash_map::DefaultHasher,
    fs,
    hash::{Hash, Hasher},
    path::{Path, PathBuf},
};

use super::{Op, WatchEvent};
use crate::{Result, paths};

/// Reaction the engine takes for a classified event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Load the file again into the target.
    Reload,
    /// Recreate the file from the in-memory target.
    Recover,
}

/// State of one watch session, owned by the engine task.
#[derive(Debug)]
pub struct WatchSession {
    config_file: PathBuf,
    resolved_file: Option<PathBuf>,
    config_dir: PathBuf,
    real_config_file: Option<PathBuf>,
    recovered_digest: Option<u64>,
}

impl WatchSession {
    /// Starts a session for the configuration file at `path`.
    ///
    /// Records the symlink resolution of the path, which later events are compared
    /// against.
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if the path cannot be made absolute.
    pub fn new(path: &Path) -> Result<Self> {
        let config_file = paths::absolute(path)?;
        let config_dir = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config_file.clone());

        Ok(Self {
            resolved_file: paths::resolve_parent(&config_file),
            real_config_file: paths::resolve_symlinks(&config_file),
            config_file,
            config_dir,
            recovered_digest: None,
        })
    }

    /// The cleaned absolute path of the configuration file.
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// The directory subscribed to for notifications.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// The last known symlink resolution of the configuration file.
    pub fn real_config_file(&self) -> Option<&Path> {
        self.real_config_file.as_deref()
    }

    /// Decides how to react to `event`.
    ///
    /// In priority order:
    /// 1. a write or create of the configuration file, or a change of the file's
    ///    symlink target, reloads;
    /// 2. a rename or removal of the configuration file recovers;
    /// 3. anything else is ignored.
    pub fn classify(&mut self, event: &WatchEvent) -> Option<Action> {
        let is_config_file = self.is_config_path(&event.path);
        let current_real = paths::resolve_symlinks(&self.config_file);
        let link_changed = self.is_new_link_target(current_real.as_deref());

        if (is_config_file && event.op.intersects(Op::WRITE | Op::CREATE)) || link_changed {
            if current_real.is_some() {
                self.real_config_file = current_real;
            }
            return Some(Action::Reload);
        }

        if is_config_file && event.op.intersects(Op::RENAME_OR_REMOVE) {
            return Some(Action::Recover);
        }

        None
    }

    /// Returns true if `event` can lead to an action: it names the configuration
    /// file, or the file's symlink target has changed since it was last seen.
    ///
    /// Does not update any state; [`WatchSession::classify`] does that.
    pub fn is_relevant(&self, event: &WatchEvent) -> bool {
        self.is_config_path(&event.path)
            || self.is_new_link_target(paths::resolve_symlinks(&self.config_file).as_deref())
    }

    fn is_new_link_target(&self, current_real: Option<&Path>) -> bool {
        current_real.is_some() && current_real != self.real_config_file.as_deref()
    }

    /// Returns true if `path` names the configuration file.
    pub fn is_config_path(&self, path: &Path) -> bool {
        let path = paths::clean(path);
        path == self.config_file || Some(&path) == self.resolved_file.as_ref()
    }

    /// Hashes the current contents of the configuration file.
    ///
    /// Returns `None` if the file cannot be read.
    pub fn read_digest(&self) -> Option<u64> {
        let bytes = fs::read(&self.config_file).ok()?;
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Some(hasher.finish())
    }

    /// Returns true if `digest` matches the contents the engine wrote while
    /// recovering the file, which no reload since has replaced.
    pub fn is_own_write(&self, digest: Option<u64>) -> bool {
        digest.is_some() && digest == self.recovered_digest
    }

    /// Records the digest of contents the engine just wrote during recovery, so
    /// the notifications caused by that write do not reload.
    pub fn remember_own_write(&mut self, digest: Option<u64>) {
        self.recovered_digest = digest;
    }

    /// Clears the recovery marker after a reload of other contents.
    pub fn forget_own_write(&mut self) {
        self.recovered_digest = None;
    }
}
