//! Unit tests for the default store and decoder.
//! No filesystem or timing dependencies.

#![allow(clippy::unwrap_used)]

use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use super::{DefaultStore, TomlDecoder, merging::merge_two_toml_values, path_ops::search};
use crate::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Mysql {
    host: String,
    port: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct AppConfig {
    mysql: Mysql,
    item: String,
}

#[test]
fn set_default_creates_nested_tables() {
    let mut store = DefaultStore::new();
    store.set_default("mysql.port", 3306);

    let mysql = store.tree().get("mysql").unwrap().as_table().unwrap();
    assert_eq!(mysql.get("port"), Some(&Value::Integer(3306)));
}

#[test]
fn last_registration_for_a_path_wins() {
    let mut store = DefaultStore::new();
    store.set_default("mysql.port", 3306);
    store.set_default("mysql.port", 3307);

    assert_eq!(store.get("mysql.port"), Some(&Value::Integer(3307)));
}

#[test]
fn leaf_on_the_path_is_replaced_by_a_table() {
    let mut store = DefaultStore::new();
    store.set_default("mysql", "localhost");
    store.set_default("mysql.port", 3306);

    assert!(store.get("mysql").unwrap().is_table());
    assert_eq!(store.get("mysql.port"), Some(&Value::Integer(3306)));
}

#[test]
fn table_default_can_be_extended_by_later_keys() {
    let mut mysql = Table::new();
    mysql.insert("port".to_string(), Value::Integer(3306));

    let mut store = DefaultStore::new();
    store.set_default("mysql", mysql);
    store.set_default("mysql.host", "db.local");

    assert_eq!(store.get("mysql.port"), Some(&Value::Integer(3306)));
    assert_eq!(
        store.get("mysql.host"),
        Some(&Value::String("db.local".to_string()))
    );
}

#[test]
fn custom_delimiter_splits_keys() {
    let mut store = DefaultStore::new();
    store.set_key_delim("::");
    store.set_default("mysql::port", 3306);

    assert_eq!(store.key_delim(), "::");
    assert_eq!(store.get("mysql::port"), Some(&Value::Integer(3306)));
    assert!(store.tree().get("mysql::port").is_none());
}

#[test]
fn entries_keep_the_delimiter_they_were_registered_with() {
    let mut store = DefaultStore::new();
    store.set_default("a/b", 1);
    store.set_key_delim("/");

    assert!(store.tree().contains_key("a/b"));
    assert_eq!(store.get("a/b"), None);
}

#[test]
fn empty_delimiter_keeps_the_whole_key() {
    let mut store = DefaultStore::new();
    store.set_key_delim("");
    store.set_default("mysql.port", 3306);

    assert_eq!(
        store.tree().get("mysql.port"),
        Some(&Value::Integer(3306))
    );
}

#[test]
fn decode_sets_values_at_nested_fields() {
    let mut store = DefaultStore::new();
    store.set_default("mysql.port", 3306);
    store.set_default("mysql.host", "127.0.0.1");

    let mut config = AppConfig::default();
    store.decode_into(&TomlDecoder, &mut config).unwrap();

    assert_eq!(config.mysql.port, 3306);
    assert_eq!(config.mysql.host, "127.0.0.1");
}

#[test]
fn decode_keeps_fields_without_defaults() {
    let mut store = DefaultStore::new();
    store.set_default("mysql.port", 3306);

    let mut config = AppConfig {
        item: "cfgItem".to_string(),
        ..AppConfig::default()
    };
    store.decode_into(&TomlDecoder, &mut config).unwrap();

    assert_eq!(config.item, "cfgItem");
    assert_eq!(config.mysql.port, 3306);
}

#[test]
fn decode_matches_keys_ignoring_case() {
    let mut store = DefaultStore::new();
    store.set_default("Mysql.Port", 3306);
    store.set_default("ITEM", "upper");

    let mut config = AppConfig::default();
    store.decode_into(&TomlDecoder, &mut config).unwrap();

    assert_eq!(config.mysql.port, 3306);
    assert_eq!(config.item, "upper");
}

#[test]
fn decode_into_generic_table() {
    let mut store = DefaultStore::new();
    store.set_default("mysql.port", 3306);

    let mut table = Table::new();
    table.insert("item".to_string(), Value::String("kept".to_string()));
    store.decode_into(&TomlDecoder, &mut table).unwrap();

    assert_eq!(table.get("item"), Some(&Value::String("kept".to_string())));
    assert_eq!(
        table["mysql"].as_table().unwrap().get("port"),
        Some(&Value::Integer(3306))
    );
}

#[test]
fn decode_reports_shape_mismatch() {
    let mut store = DefaultStore::new();
    store.set_default("item.nested", 1);

    let mut config = AppConfig::default();
    let result = store.decode_into(&TomlDecoder, &mut config);

    assert!(matches!(result, Err(ConfigError::Decode { .. })));
}

#[test]
fn empty_store_leaves_target_untouched() {
    let store = DefaultStore::new();
    let mut config = AppConfig {
        item: "x".to_string(),
        ..AppConfig::default()
    };

    store.decode_into(&TomlDecoder, &mut config).unwrap();

    assert!(store.is_empty());
    assert_eq!(config.item, "x");
}

#[test]
fn search_replaces_leaves_and_returns_the_nested_table() {
    let mut tree = Table::new();
    tree.insert("mysql".to_string(), Value::Integer(1));

    let nested = search(&mut tree, &["mysql", "pool"]).unwrap();
    nested.insert("size".to_string(), Value::Integer(4));

    assert_eq!(
        tree["mysql"]["pool"].as_table().unwrap().get("size"),
        Some(&Value::Integer(4))
    );
}

mod merging {
    use super::*;

    fn table(entries: &[(&str, Value)]) -> Value {
        Value::Table(
            entries
                .iter()
                .map(|(key, value)| ((*key).to_string(), value.clone()))
                .collect(),
        )
    }

    #[test]
    fn overlay_keys_differing_only_in_case_stay_distinct() {
        let overlay = table(&[
            ("name", Value::String("lower".to_string())),
            ("Name", Value::String("upper".to_string())),
        ]);

        let merged = merge_two_toml_values(table(&[]), overlay);
        let merged = merged.as_table().unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged["name"].as_str(), Some("lower"));
        assert_eq!(merged["Name"].as_str(), Some("upper"));
    }

    #[test]
    fn exact_match_wins_over_case_insensitive_match() {
        let base = table(&[("port", Value::Integer(1))]);
        let overlay = table(&[("Port", Value::Integer(2)), ("port", Value::Integer(3))]);

        let merged = merge_two_toml_values(base, overlay);
        let merged = merged.as_table().unwrap();

        assert_eq!(merged["port"].as_integer(), Some(3));
        assert_eq!(merged["Port"].as_integer(), Some(2));
    }

    #[test]
    fn case_insensitive_match_keeps_base_spelling() {
        let base = table(&[("port", Value::Integer(1))]);
        let overlay = table(&[("PORT", Value::Integer(2))]);

        let merged = merge_two_toml_values(base, overlay);
        let merged = merged.as_table().unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged["port"].as_integer(), Some(2));
    }
}
