//! Open modes used by the ledger codec.

use std::fs::{File, OpenOptions};
use std::path::Path;

/// Opens an existing file for reading.
///
/// Fails with [`std::io::ErrorKind::NotFound`] when the file is missing.
pub fn open_read(path: &Path) -> std::io::Result<File> {
    File::open(path)
}

/// Opens `path` for writing, creating it or truncating previous content.
pub fn open_write_truncate(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}
