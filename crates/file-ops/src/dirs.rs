//! Directory preparation.

use std::path::Path;

/// Ensures `path` exists as a directory, creating missing parents.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path)?;
    tracing::debug!(path = %path.display(), "created directory");
    Ok(())
}

/// Ensures the directory that will contain `file` exists.
///
/// A bare file name (no parent component) refers to the current directory
/// and needs nothing created.
pub fn ensure_parent_dir(file: &Path) -> std::io::Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
