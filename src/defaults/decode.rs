use serde::{Serialize, de::DeserializeOwned};
use toml::{Table, Value};

use crate::{ConfigError, Result};

use super::merging::overlay_onto;

/// Translates a tree of defaults into a concrete target type.
///
/// Implementations follow a structure-decode contract: keys are matched to fields by
/// name, nested tables are matched to nested structures, and fields the tree does not
/// mention are left untouched.
pub trait Decoder<T>: Send + Sync {
    /// Decodes `tree` into `target`, overriding the fields it names.
    ///
    /// # Errors
    /// Returns `ConfigError::Decode` if the tree does not fit the shape of `T`.
    fn decode(&self, tree: &Table, target: &mut T) -> Result<()>;
}

/// Decoder for any serde-compatible target, going through a TOML value tree.
///
/// Key matching is case-insensitive.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlDecoder;

impl<T> Decoder<T> for TomlDecoder
where
    T: Serialize + DeserializeOwned,
{
    fn decode(&self, tree: &Table, target: &mut T) -> Result<()> {
        if tree.is_empty() {
            return Ok(());
        }

        *target = overlay_onto(target, Value::Table(tree.clone())).map_err(ConfigError::decode)?;
        Ok(())
    }
}
