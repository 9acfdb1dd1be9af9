//! File removal.

use std::io::ErrorKind;
use std::path::Path;

/// Removes `path` if it exists.
///
/// Returns `Ok(true)` when a file was removed and `Ok(false)` when there
/// was nothing to remove. Any other failure is returned to the caller.
pub fn remove_file_if_exists(path: &Path) -> std::io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed file");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
