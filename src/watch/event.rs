use std::{fmt, path::PathBuf, time::Instant};

use bitflags::bitflags;
use notify::{
    Event, EventKind,
    event::{ModifyKind, RenameMode},
};

bitflags! {
    /// File operations reported for a path in the watched directory.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Op: u32 {
        /// A file appeared, including a rename into the path.
        const CREATE = 0x01;
        /// File contents were written.
        const WRITE = 0x02;
        /// A file was deleted.
        const REMOVE = 0x04;
        /// A file was renamed away from the path.
        const RENAME = 0x08;
        /// File metadata changed.
        const CHMOD = 0x10;
    }
}

impl Op {
    /// Operations that make the configured path disappear.
    pub const RENAME_OR_REMOVE: Op = Op::RENAME.union(Op::REMOVE);
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        write!(f, "{}", names.join("|"))
    }
}

/// A file system event for one path in the configuration directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// The path the event refers to
    pub path: PathBuf,
    /// The operation that occurred
    pub op: Op,
}

impl WatchEvent {
    /// Creates a new event.
    pub fn new(path: impl Into<PathBuf>, op: Op) -> Self {
        Self {
            path: path.into(),
            op,
        }
    }

    /// Splits a `notify` event into one event per affected path.
    ///
    /// Access events and events without a known operation are dropped. A rename that
    /// reports both ends yields `RENAME` for the old path and `CREATE` for the new one.
    pub fn from_notify(event: Event) -> Vec<WatchEvent> {
        let op = match event.kind {
            EventKind::Create(_) => Op::CREATE,
            EventKind::Remove(_) => Op::REMOVE,
            EventKind::Modify(ModifyKind::Metadata(_)) => Op::CHMOD,
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Op::CREATE,
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                let mut paths = event.paths.into_iter();
                return paths
                    .next()
                    .map(|from| WatchEvent::new(from, Op::RENAME))
                    .into_iter()
                    .chain(paths.map(|to| WatchEvent::new(to, Op::CREATE)))
                    .collect();
            }
            EventKind::Modify(ModifyKind::Name(_)) => Op::RENAME,
            EventKind::Modify(_) => Op::WRITE,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => return Vec::new(),
        };

        event
            .paths
            .into_iter()
            .map(|path| WatchEvent::new(path, op))
            .collect()
    }
}

impl fmt::Display for WatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.op, self.path.display())
    }
}

/// What the watch engine did in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The file was loaded again into the target.
    Reloaded,
    /// The file was recreated from the in-memory target.
    Recovered,
}

/// Notification broadcast to subscribers after a reload or recovery.
#[derive(Debug, Clone)]
pub struct ConfigEvent {
    /// The file system event that triggered the change
    pub trigger: WatchEvent,
    /// The action taken
    pub kind: ChangeKind,
    /// When the action completed
    pub timestamp: Instant,
}

impl ConfigEvent {
    pub(crate) fn new(trigger: WatchEvent, kind: ChangeKind) -> Self {
        Self {
            trigger,
            kind,
            timestamp: Instant::now(),
        }
    }
}
