use std::path::{Path, PathBuf};

use crate::error::{Result, VitalsError};

/// Default data directory name
const DATA_DIR_NAME: &str = "vitals";

/// Get the data directory path
/// Returns ~/.local/share/vitals on Unix, ~/Library/Application Support/vitals on macOS
pub fn data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|p| p.join(DATA_DIR_NAME))
        .ok_or_else(|| VitalsError::config("Could not determine data directory"))
}

/// Get the default database file path
pub fn default_db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("vitals.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
