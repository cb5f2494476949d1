//! cfg-manager - Defaulted configuration files that stay live.
//!
//! A [`Manager`] merges caller-supplied defaults into a configuration structure,
//! reads the backing file on top of them, and keeps the result up to date:
//!
//! - Defaults registered under delimited keys (`"mysql.port"`)
//! - Missing files created from the defaults
//! - Reload when the file is written or its symlink target changes
//! - Recovery of the file from memory when it is renamed or removed
//! - Pluggable file formats through the [`Loader`] trait
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cfg_manager::{Manager, TomlLoader};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct Mysql {
//!     port: u32,
//! }
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct AppConfig {
//!     mysql: Mysql,
//! }
//!
//! # async fn run() -> cfg_manager::Result<()> {
//! let manager = Manager::builder(TomlLoader, "config.toml")
//!     .with_default("mysql.port", 3306)
//!     .on_config_change(|event| println!("config changed: {event}"))
//!     .build();
//!
//! let config = manager.read_config(AppConfig::default()).await?;
//! println!("port: {}", config.get().mysql.port);
//! # Ok(())
//! # }
//! ```

/// Default value store and decoding into targets.
pub mod defaults;

/// Error types and result alias.
pub mod error;

/// File format capability.
pub mod loader;

/// Configuration manager and live configuration handle.
pub mod manager;

/// Path normalization helpers.
pub mod paths;

/// Tracing subscriber setup for binaries.
pub mod tracing_config;

/// File watching, event classification and the reload engine.
pub mod watch;

/// Re-exported core types for convenience.
pub use defaults::{DefaultStore, Decoder, TomlDecoder};
pub use error::{ConfigError, Result};
pub use loader::{JsonLoader, Loader, TomlLoader};
pub use manager::{LiveConfig, Manager, ManagerBuilder};
pub use watch::{ChangeKind, ConfigEvent, Op, WatchEvent};
