//! Path helpers used to compare event paths against the configured file.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use crate::{ConfigError, Result};

/// Lexically normalizes a path, removing `.` segments and resolving `..`.
///
/// The file system is not consulted, so symbolic links are left in place.
pub fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }

    cleaned
}

/// Returns the cleaned absolute form of `path`.
///
/// # Errors
/// Returns `ConfigError::Io` if the current directory cannot be determined.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| ConfigError::io(e, path))?;
    Ok(clean(&absolute))
}

/// Resolves every symbolic link in `path`, or `None` if it does not resolve.
pub fn resolve_symlinks(path: &Path) -> Option<PathBuf> {
    fs::canonicalize(path).ok()
}

/// Returns `path` with its parent directory resolved but the file name kept as is.
///
/// Some notification backends report event paths with the directory resolved; this
/// gives the form to compare them against.
pub fn resolve_parent(path: &Path) -> Option<PathBuf> {
    let parent = path.parent()?;
    let file_name = path.file_name()?;

    Some(fs::canonicalize(parent).ok()?.join(file_name))
}
