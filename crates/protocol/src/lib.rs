//! Shared slice types for planning and ledger persistence.
//!
//! A [`Slice`] is one contiguous byte range of a file together with its
//! transfer progress. [`SliceStatus`] codes are persisted on disk and must
//! never be reused or reordered.

pub mod types;

pub use types::{Slice, SliceStatus};

/// Errors produced when constructing a [`Slice`] from raw parts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SliceError {
    #[error("{field} must not be negative (got {value})")]
    NegativeField { field: &'static str, value: i64 },

    #[error("done size {done} out of range 0..={total}")]
    DoneOutOfRange { done: i64, total: i64 },
}
