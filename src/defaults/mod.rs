//! Default configuration values.
//!
//! Defaults are kept as a generic tree of tables and leaf values, addressed through
//! delimited keys such as `"mysql.port"`. The tree is decoded into the caller's target
//! by a [`Decoder`] before the configuration file is read.

mod decode;
pub(crate) mod merging;
mod path_ops;

#[cfg(test)]
mod tests;

pub use decode::{Decoder, TomlDecoder};

use toml::{Table, Value};

use crate::Result;

use path_ops::{insert_at_path, navigate_path, split_key};

/// Key delimiter used unless the manager is configured otherwise.
pub const DEFAULT_KEY_DELIM: &str = ".";

/// Nested store of default values.
///
/// Intermediate path segments are always tables. Registering a path that runs through
/// an existing leaf replaces that leaf with a table, and the last registration for a
/// given path wins.
#[derive(Debug, Clone)]
pub struct DefaultStore {
    tree: Table,
    key_delim: String,
}

impl Default for DefaultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultStore {
    /// Creates an empty store using [`DEFAULT_KEY_DELIM`].
    pub fn new() -> Self {
        Self {
            tree: Table::new(),
            key_delim: DEFAULT_KEY_DELIM.to_string(),
        }
    }

    /// Returns the delimiter used to split keys.
    pub fn key_delim(&self) -> &str {
        &self.key_delim
    }

    /// Changes the delimiter used to split keys.
    ///
    /// Entries registered earlier keep the structure they were stored with, so the
    /// delimiter should be set before any default is added.
    pub fn set_key_delim(&mut self, delim: impl Into<String>) {
        self.key_delim = delim.into();
    }

    /// Registers a default value at a delimited key.
    ///
    /// Table values are stored as nested tables, so later keys can extend them.
    pub fn set_default(&mut self, key: &str, value: impl Into<Value>) {
        let segments = split_key(key, &self.key_delim);
        insert_at_path(&mut self.tree, &segments, value.into());
    }

    /// Looks up a registered default by delimited key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let segments = split_key(key, &self.key_delim);
        navigate_path(&self.tree, &segments)
    }

    /// Returns the whole default tree.
    pub fn tree(&self) -> &Table {
        &self.tree
    }

    /// Returns true if no default has been registered.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Decodes the defaults into `target` with the given decoder.
    ///
    /// # Errors
    /// Returns `ConfigError::Decode` if the target's shape does not fit the defaults.
    pub fn decode_into<T>(&self, decoder: &dyn Decoder<T>, target: &mut T) -> Result<()> {
        decoder.decode(&self.tree, target)
    }
}
