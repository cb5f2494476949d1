//! File format capability used by the manager.
//!
//! The manager never parses or writes the configuration file itself. It delegates
//! to a [`Loader`], which decides the on-disk format.

use std::{fs, path::Path};

use serde::{Serialize, de::DeserializeOwned};
use toml::{Table, Value};

use crate::{ConfigError, Result, defaults::merging::overlay_onto};

/// Reads and writes a configuration target in a concrete file format.
///
/// A manager never issues two loader calls at the same time: the initial calls happen
/// inside `read_config`, later ones only from the watch task.
pub trait Loader<T>: Send + Sync + 'static {
    /// Parses the file at `path` and writes its values into `target`.
    ///
    /// `target` may already hold defaults or a previous load; values present in the
    /// file overwrite them.
    ///
    /// # Errors
    /// Returns `ConfigError::Load` if the file cannot be read or parsed.
    fn load(&self, path: &Path, target: &mut T) -> Result<()>;

    /// Serializes `target` to `path`, creating or truncating the file.
    ///
    /// # Errors
    /// Returns `ConfigError::Save` if the target cannot be serialized or written.
    fn save(&self, path: &Path, target: &T) -> Result<()>;
}

/// Loader for TOML files.
///
/// Keys in the file are matched to fields ignoring case, and fields the file does not
/// mention keep their current values.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlLoader;

impl<T> Loader<T> for TomlLoader
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self, path: &Path, target: &mut T) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::load(e, path))?;
        let file_table: Table = toml::from_str(&content).map_err(|e| ConfigError::load(e, path))?;

        *target =
            overlay_onto(target, Value::Table(file_table)).map_err(|e| ConfigError::load(e, path))?;
        Ok(())
    }

    fn save(&self, path: &Path, target: &T) -> Result<()> {
        let content = toml::to_string_pretty(target).map_err(|e| ConfigError::save(e, path))?;
        fs::write(path, content).map_err(|e| ConfigError::save(e, path))
    }
}

/// Loader for JSON files.
///
/// Loads follow the same layering as [`TomlLoader`]. `null` values in the file are
/// treated as absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLoader;

impl<T> Loader<T> for JsonLoader
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self, path: &Path, target: &mut T) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::load(e, path))?;
        let json: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::load(e, path))?;

        let overlay = json_to_toml(json).ok_or_else(|| {
            ConfigError::load("top-level JSON value must be an object", path)
        })?;
        if !overlay.is_table() {
            return Err(ConfigError::load("top-level JSON value must be an object", path));
        }

        *target = overlay_onto(target, overlay).map_err(|e| ConfigError::load(e, path))?;
        Ok(())
    }

    fn save(&self, path: &Path, target: &T) -> Result<()> {
        let content =
            serde_json::to_string_pretty(target).map_err(|e| ConfigError::save(e, path))?;
        fs::write(path, content).map_err(|e| ConfigError::save(e, path))
    }
}

fn json_to_toml(value: serde_json::Value) -> Option<Value> {
    use serde_json::Value as Json;

    match value {
        Json::Null => None,
        Json::Bool(b) => Some(Value::Boolean(b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .or_else(|| n.as_f64().map(Value::Float)),
        Json::String(s) => Some(Value::String(s)),
        Json::Array(items) => Some(Value::Array(
            items.into_iter().filter_map(json_to_toml).collect(),
        )),
        Json::Object(map) => Some(Value::Table(
            map.into_iter()
                .filter_map(|(k, v)| json_to_toml(v).map(|v| (k, v)))
                .collect(),
        )),
    }
}
