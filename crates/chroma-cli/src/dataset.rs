//! Dataset directory listing.
//!
//! The core treats identifiers as opaque; this is the piece that turns a
//! directory into the identifier list an `InstanceSource` consumes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chroma_core::config::CONFIG_FILE_NAME;
use tracing::debug;

/// List instance files directly inside `dir`, sorted by path.
///
/// Subdirectories, dotfiles and the dataset's `chroma.toml` are skipped.
pub fn list_instance_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') || name == CONFIG_FILE_NAME {
            continue;
        }
        if entry.file_type().is_ok_and(|t| t.is_file()) {
            files.push(entry.path());
        }
    }
    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "listed dataset");
    Ok(files)
}
