use std::error;

use serde::{Serialize, de::DeserializeOwned};
use toml::Value;

/// Deep merges `overlay` onto `base`, with overlay values taking precedence.
///
/// Tables are merged key by key. An overlay key merges into the base key of the same
/// name. Failing that, it merges into a base key equal to it ignoring ASCII case, and
/// the merged table keeps the base's spelling so that `Mysql.Port` in an overlay lands
/// on a `mysql.port` field. Each base key is matched at most once, so overlay keys that
/// differ only in case stay distinct. For non-table values the overlay replaces the
/// base completely.
pub fn merge_two_toml_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Table(mut merged_table), Value::Table(overlay_table)) => {
            let mut unclaimed: Vec<String> = merged_table
                .keys()
                .filter(|key| !overlay_table.contains_key(key.as_str()))
                .cloned()
                .collect();

            for (key, overlay_value) in overlay_table {
                let key = if merged_table.contains_key(&key) {
                    key
                } else {
                    match unclaimed.iter().position(|k| k.eq_ignore_ascii_case(&key)) {
                        Some(index) => unclaimed.swap_remove(index),
                        None => key,
                    }
                };

                let merged_value = match merged_table.remove(&key) {
                    None => overlay_value,
                    Some(base_value) => merge_two_toml_values(base_value, overlay_value),
                };
                merged_table.insert(key, merged_value);
            }

            Value::Table(merged_table)
        }
        (_, overlay) => overlay,
    }
}

/// Layers `overlay` over the serialized form of `target` and decodes the result.
///
/// Fields of `target` that the overlay does not mention keep their current values.
///
/// # Errors
/// Returns error if `target` cannot be represented as TOML or if the merged tree does
/// not fit the shape of `T`.
pub fn overlay_onto<T>(target: &T, overlay: Value) -> Result<T, Box<dyn error::Error + Send + Sync>>
where
    T: Serialize + DeserializeOwned,
{
    let current = Value::try_from(target)?;
    let merged = merge_two_toml_values(current, overlay);

    Ok(T::deserialize(merged)?)
}
