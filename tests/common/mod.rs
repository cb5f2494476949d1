#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use toml::{Table, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mysql {
    pub db_name: String,
    pub host: String,
    pub user_name: String,
    pub pass: String,
    pub port: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MyConfig {
    pub mysql: Mysql,
    pub item: String,
}

impl MyConfig {
    pub fn with_item(item: &str) -> Self {
        Self {
            item: item.to_string(),
            ..Self::default()
        }
    }
}

pub fn setup_test_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    (temp_dir, config_path)
}

/// Defaults equivalent to `{"mysql": {"port": 3306}}`.
pub fn mysql_defaults() -> Vec<(&'static str, Value)> {
    let mut mysql = Table::new();
    mysql.insert("port".to_string(), Value::Integer(3306));
    vec![("mysql", Value::Table(mysql))]
}

pub fn read_toml(path: &Path) -> Table {
    toml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

pub fn mysql_port(table: &Table) -> Option<i64> {
    table.get("mysql")?.as_table()?.get("port")?.as_integer()
}
