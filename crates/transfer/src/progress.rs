use sliceledger_protocol::{Slice, SliceStatus};

/// Aggregate progress over one slice list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerProgress {
    pub total_bytes: i64,
    pub done_bytes: i64,
    pub not_started: usize,
    pub in_progress: usize,
    pub done: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl LedgerProgress {
    /// Summarizes `slices`.
    pub fn from_slices(slices: &[Slice]) -> Self {
        let mut p = LedgerProgress::default();
        for slice in slices {
            p.total_bytes += slice.total_size();
            p.done_bytes += slice.done_size();
            match slice.status() {
                SliceStatus::NotStarted => p.not_started += 1,
                SliceStatus::InProgress => p.in_progress += 1,
                SliceStatus::Done => p.done += 1,
                SliceStatus::Failed => p.failed += 1,
                SliceStatus::Cancelled => p.cancelled += 1,
            }
        }
        p
    }

    /// Number of slices summarized.
    pub fn slice_count(&self) -> usize {
        self.not_started + self.in_progress + self.done + self.failed + self.cancelled
    }

    pub fn remaining_bytes(&self) -> i64 {
        self.total_bytes - self.done_bytes
    }

    /// Returns progress as a percentage (0-100).
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.done_bytes as f64 / self.total_bytes as f64 * 100.0
    }

    /// `true` when every slice is done (vacuously true for no slices).
    pub fn is_complete(&self) -> bool {
        self.done == self.slice_count()
    }
}
