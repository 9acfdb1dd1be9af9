//! Filesystem operations backing ledger persistence.
//!
//! Thin wrappers over `std::fs` with the open modes and "already gone"
//! semantics the ledger codec relies on. All functions return
//! [`std::io::Result`] so callers can propagate OS errors unchanged.

mod delete;
mod dirs;
mod open;

pub use delete::remove_file_if_exists;
pub use dirs::{ensure_dir, ensure_parent_dir};
pub use open::{open_read, open_write_truncate};
