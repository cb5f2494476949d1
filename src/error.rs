use std::{
    fmt,
    path::{Path, PathBuf},
    result,
};

use thiserror::Error;

/// Errors that can occur while reading, reloading or watching a configuration file.
///
/// Errors raised inside the watch engine never reach the caller; they are logged and
/// the engine either keeps the previous value or stops watching.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The defaults could not be decoded into the target structure.
    #[error("failed to decode defaults into target: {details}")]
    Decode {
        /// Decoder error details
        details: String,
    },

    /// The configuration file does not exist and creating it is disabled.
    #[error("config file '{path}' does not exist")]
    NotFound {
        /// Path of the missing configuration file
        path: PathBuf,
    },

    /// Error occurred during file or directory I/O.
    #[error("I/O error on '{path}': {details}")]
    Io {
        /// Path where the I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// The loader failed to read the configuration file into the target.
    #[error("failed to load config from '{path}': {details}")]
    Load {
        /// Path of the file being loaded
        path: PathBuf,
        /// Loader error details
        details: String,
    },

    /// The loader failed to write the target to the configuration file.
    #[error("failed to save config to '{path}': {details}")]
    Save {
        /// Path of the file being written
        path: PathBuf,
        /// Loader error details
        details: String,
    },

    /// The file notification source could not be created.
    #[error("failed to initialize file watcher: {details}")]
    WatcherInit {
        /// File watcher initialization error details
        details: String,
    },

    /// The file notification source could not subscribe to a path.
    #[error("file watcher error for '{path}': {details}")]
    FileWatch {
        /// Path being watched when the error occurred
        path: PathBuf,
        /// File watcher error details
        details: String,
    },
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = result::Result<T, ConfigError>;

impl ConfigError {
    /// Creates a load error with file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parse or read error
    /// * `path` - Path to the file that failed to load
    pub fn load(error: impl fmt::Display, path: &Path) -> Self {
        ConfigError::Load {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }

    /// Creates a save error with file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying serialization or write error
    /// * `path` - Path to the file that failed to save
    pub fn save(error: impl fmt::Display, path: &Path) -> Self {
        ConfigError::Save {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }

    /// Creates an I/O error with file path context.
    pub fn io(error: impl fmt::Display, path: &Path) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }

    pub(crate) fn decode(error: impl fmt::Display) -> Self {
        ConfigError::Decode {
            details: error.to_string(),
        }
    }
}
