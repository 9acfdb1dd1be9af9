use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sliceledger_protocol::{Slice, SliceStatus};

use crate::ledger::{delete_slice_file, restore_slice_list, save_slice_list, validate_slice_list};
use crate::{LedgerProgress, PlanConfig, TransferError, plan_slices};

/// A slice list bound to its ledger file for one file transfer.
///
/// The ledger is only written on [`checkpoint`](Self::checkpoint); callers
/// must not share one ledger path between two sessions.
#[derive(Debug)]
pub struct SliceLedger {
    path: PathBuf,
    file_size: i64,
    slices: Vec<Slice>,
    resumed: bool,
}

impl SliceLedger {
    /// Resumes the ledger at `path` or plans a fresh slice list.
    ///
    /// An existing ledger is reused when it restores cleanly and covers
    /// exactly `file_size` bytes. Slices that were in flight or failed when
    /// the ledger was written go back to `NotStarted`, keeping their byte
    /// progress. A corrupt or mismatched ledger is discarded in favour of a
    /// fresh plan; other I/O errors are returned.
    pub fn open(path: &Path, file_size: i64, config: &PlanConfig) -> Result<Self, TransferError> {
        config.validate()?;

        match restore_slice_list(path) {
            Ok(mut slices) => match validate_slice_list(&slices, Some(file_size)) {
                Ok(()) => {
                    let reset = reset_interrupted(&mut slices);
                    tracing::info!(
                        path = %path.display(),
                        slices = slices.len(),
                        reset,
                        "resuming from slice ledger"
                    );
                    return Ok(Self {
                        path: path.to_path_buf(),
                        file_size,
                        slices,
                        resumed: true,
                    });
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "slice ledger does not match file, replanning");
                }
            },
            Err(TransferError::Io(e)) if e.kind() == ErrorKind::NotFound => {}
            Err(TransferError::CorruptLedger(reason)) => {
                tracing::warn!(path = %path.display(), %reason, "slice ledger is corrupt, replanning");
            }
            Err(e) => return Err(e),
        }

        let slices = plan_slices(file_size, config)?;
        Ok(Self {
            path: path.to_path_buf(),
            file_size,
            slices,
            resumed: false,
        })
    }

    /// Ledger file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_size(&self) -> i64 {
        self.file_size
    }

    /// `true` if the slices came from an existing ledger.
    pub fn was_resumed(&self) -> bool {
        self.resumed
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn slice(&self, index: i32) -> Option<&Slice> {
        self.slices.get(usize::try_from(index).ok()?)
    }

    /// Mutable access for the transfer engine to record progress.
    pub fn slice_mut(&mut self, index: i32) -> Option<&mut Slice> {
        self.slices.get_mut(usize::try_from(index).ok()?)
    }

    /// Slices that still need transferring, in order.
    pub fn pending(&self) -> impl Iterator<Item = &Slice> {
        self.slices.iter().filter(|s| !s.is_done())
    }

    pub fn is_complete(&self) -> bool {
        self.slices.iter().all(Slice::is_done)
    }

    pub fn progress(&self) -> LedgerProgress {
        LedgerProgress::from_slices(&self.slices)
    }

    /// Persists the current slice list, replacing the ledger file.
    pub fn checkpoint(&self) -> Result<(), TransferError> {
        save_slice_list(&self.path, &self.slices)
    }

    /// Deletes the ledger after a successful transfer.
    ///
    /// Fails with [`TransferError::Incomplete`] while any slice is not done;
    /// the ledger is left in place in that case.
    pub fn finish(&self) -> Result<(), TransferError> {
        let pending = self.pending().count();
        if pending > 0 {
            return Err(TransferError::Incomplete(pending));
        }
        delete_slice_file(&self.path)?;
        tracing::info!(path = %self.path.display(), "transfer complete, slice ledger removed");
        Ok(())
    }

    /// Deletes the ledger regardless of progress.
    pub fn discard(&self) -> Result<(), TransferError> {
        delete_slice_file(&self.path)
    }
}

fn reset_interrupted(slices: &mut [Slice]) -> usize {
    let mut reset = 0;
    for slice in slices
        .iter_mut()
        .filter(|s| matches!(s.status(), SliceStatus::InProgress | SliceStatus::Failed))
    {
        slice.set_status(SliceStatus::NotStarted);
        reset += 1;
    }
    reset
}
