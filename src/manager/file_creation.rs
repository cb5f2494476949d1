use std::{fs::DirBuilder, path::Path};

use crate::{ConfigError, Result};

/// Permission bits for directories created for a new configuration file.
#[cfg(unix)]
const CONFIG_DIR_MODE: u32 = 0o775;

/// Creates the parent directories of the configuration file if they don't exist
pub fn create_config_dir(path: &Path) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    let mut builder = DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(CONFIG_DIR_MODE);
    }

    builder.create(parent).map_err(|e| ConfigError::Io {
        path: parent.to_path_buf(),
        details: format!("Failed to create config directory: {e}"),
    })
}
