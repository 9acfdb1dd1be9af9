//! Slice planning and ledger persistence for resumable chunked transfers.
//!
//! The planner splits a file into fixed-size [`Slice`]s under a maximum
//! slice count. The ledger codec writes a slice list to a compact binary
//! sidecar file and restores it after a restart. [`SliceLedger`] ties the
//! two together for a single file transfer.

mod config;
mod ledger;
mod planner;
mod progress;
mod session;

pub use config::PlanConfig;
pub use ledger::{
    RECORD_FIXED_LEN, decode_slice_list, delete_slice_file, encode_slice_list, read_slice,
    read_slice_list, restore_slice_list, save_slice_list, validate_slice_list, write_slice,
    write_slice_list,
};
pub use planner::{calculate_slice_size, ceil_div, create_slice_list, plan_slices};
pub use progress::LedgerProgress;
pub use session::SliceLedger;
pub use sliceledger_protocol::{Slice, SliceError, SliceStatus};

/// Default minimum slice size: 4 MiB.
pub const DEFAULT_MIN_SLICE_SIZE: i64 = 4 * 1024 * 1024;

/// Default cap on the number of slices for one file.
pub const DEFAULT_MAX_SLICE_COUNT: i64 = 10_000;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("corrupt ledger: {0}")]
    CorruptLedger(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} slice(s) not done")]
    Incomplete(usize),
}
