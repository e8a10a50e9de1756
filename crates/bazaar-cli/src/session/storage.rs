//! Location of the session file.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use bazaar_file::FileTokenStore;

/// Get the session file path.
pub fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "bazaar").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// The credential store backing the CLI session.
pub fn token_store() -> Result<FileTokenStore> {
    Ok(FileTokenStore::new(session_path()?))
}
