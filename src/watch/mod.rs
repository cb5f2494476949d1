//! Live reload and recovery of the configuration file.
//!
//! The engine subscribes to the directory containing the configuration file rather
//! than the file itself: editors often replace a file by renaming over it, and a
//! symlinked configuration can be swapped atomically, both of which a watch on the
//! file alone would miss.
//!
//! # Event handling
//! ```text
//! notify event
//!     → WatchEvent per path (event.rs)
//!     → WatchSession::classify (session.rs)
//!         write/create of the file, or new symlink target → Reload
//!         rename/remove of the file                      → Recover
//!         anything else                                  → ignored
//!     → engine applies the action, then calls the change callback
//!       and broadcasts a ConfigEvent (engine.rs)
//! ```
//!
//! Load and save failures inside the engine are logged and leave the target as it
//! was. An error from the notification source ends the engine.

mod engine;
mod event;
mod file_watcher;
mod session;

#[cfg(test)]
mod tests;

pub(crate) use engine::{EngineContext, start};

pub use engine::{ChangeCallback, WatchHandle};
pub use event::{ChangeKind, ConfigEvent, Op, WatchEvent};
pub use file_watcher::{FileWatcher, SourceMessage};
pub use session::{Action, WatchSession};
