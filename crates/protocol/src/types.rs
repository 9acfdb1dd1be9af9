use serde::{Deserialize, Serialize};

use crate::SliceError;

/// Transfer state of a slice.
///
/// The numeric codes are written to ledger files as 4-byte signed integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
    Failed,
    Cancelled,
}

impl SliceStatus {
    /// Returns the on-disk code for this status.
    pub fn code(self) -> i32 {
        match self {
            SliceStatus::NotStarted => 0,
            SliceStatus::InProgress => 1,
            SliceStatus::Done => 2,
            SliceStatus::Failed => 3,
            SliceStatus::Cancelled => 4,
        }
    }

    /// Maps an on-disk code back to a status. Returns `None` for unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(SliceStatus::NotStarted),
            1 => Some(SliceStatus::InProgress),
            2 => Some(SliceStatus::Done),
            3 => Some(SliceStatus::Failed),
            4 => Some(SliceStatus::Cancelled),
            _ => None,
        }
    }
}

impl TryFrom<i32> for SliceStatus {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        SliceStatus::from_code(code).ok_or(code)
    }
}

/// One contiguous byte range of a file plus its transfer progress.
///
/// Fields are private so that `0 <= done_size <= total_size` holds after
/// every mutation. Deserialization goes through [`Slice::from_parts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SliceParts")]
pub struct Slice {
    index: i32,
    start: i64,
    total_size: i64,
    done_size: i64,
    status: SliceStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    md5: String,
}

/// Unchecked wire shape of a [`Slice`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SliceParts {
    index: i32,
    start: i64,
    total_size: i64,
    #[serde(default)]
    done_size: i64,
    #[serde(default)]
    status: SliceStatus,
    #[serde(default)]
    md5: String,
}

impl TryFrom<SliceParts> for Slice {
    type Error = SliceError;

    fn try_from(p: SliceParts) -> Result<Self, Self::Error> {
        Slice::from_parts(p.index, p.start, p.total_size, p.done_size, p.status, &p.md5)
    }
}

impl Slice {
    /// Creates a fresh, not-started slice.
    ///
    /// Arguments must not be negative. Debug builds assert this; release
    /// builds clamp to zero. Use [`Slice::from_parts`] when the values come
    /// from an untrusted source.
    pub fn new(index: i32, start: i64, total_size: i64) -> Self {
        debug_assert!(index >= 0, "slice index must not be negative (got {index})");
        debug_assert!(start >= 0, "slice start must not be negative (got {start})");
        debug_assert!(
            total_size >= 0,
            "slice size must not be negative (got {total_size})"
        );
        Self {
            index: index.max(0),
            start: start.max(0),
            total_size: total_size.max(0),
            done_size: 0,
            status: SliceStatus::NotStarted,
            md5: String::new(),
        }
    }

    /// Builds a slice from raw field values, rejecting anything that breaks
    /// the slice invariants.
    pub fn from_parts(
        index: i32,
        start: i64,
        total_size: i64,
        done_size: i64,
        status: SliceStatus,
        md5: &str,
    ) -> Result<Self, SliceError> {
        if index < 0 {
            return Err(SliceError::NegativeField {
                field: "index",
                value: index as i64,
            });
        }
        if start < 0 {
            return Err(SliceError::NegativeField {
                field: "start",
                value: start,
            });
        }
        if total_size < 0 {
            return Err(SliceError::NegativeField {
                field: "total_size",
                value: total_size,
            });
        }
        if !(0..=total_size).contains(&done_size) {
            return Err(SliceError::DoneOutOfRange {
                done: done_size,
                total: total_size,
            });
        }
        Ok(Self {
            index,
            start,
            total_size,
            done_size,
            status,
            md5: normalize_md5(md5),
        })
    }

    /// Zero-based position among the slices of one file.
    pub fn index(&self) -> i32 {
        self.index
    }

    /// Byte offset of the first byte of this slice.
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Number of bytes covered by this slice.
    pub fn total_size(&self) -> i64 {
        self.total_size
    }

    /// Bytes already transferred.
    pub fn done_size(&self) -> i64 {
        self.done_size
    }

    pub fn status(&self) -> SliceStatus {
        self.status
    }

    /// Stored content digest (empty until set by the caller).
    pub fn md5(&self) -> &str {
        &self.md5
    }

    /// Offset one past the last byte of this slice.
    pub fn end(&self) -> i64 {
        self.start + self.total_size
    }

    /// Bytes still to transfer.
    pub fn remaining(&self) -> i64 {
        self.total_size - self.done_size
    }

    pub fn is_done(&self) -> bool {
        self.status == SliceStatus::Done
    }

    /// Sets the transferred byte count, clamped to `0..=total_size`.
    pub fn set_done_size(&mut self, done: i64) {
        self.done_size = done.clamp(0, self.total_size);
    }

    /// Adds `bytes` to the transferred count, clamped to `0..=total_size`.
    pub fn add_done_size(&mut self, bytes: i64) {
        self.set_done_size(self.done_size.saturating_add(bytes));
    }

    pub fn set_status(&mut self, status: SliceStatus) {
        self.status = status;
    }

    /// Stores a digest. Surrounding NUL padding and whitespace are dropped.
    pub fn set_md5(&mut self, md5: &str) {
        self.md5 = normalize_md5(md5);
    }

    /// Marks the whole slice as transferred.
    pub fn mark_done(&mut self) {
        self.done_size = self.total_size;
        self.status = SliceStatus::Done;
    }

    /// Forgets all progress on this slice.
    pub fn reset(&mut self) {
        self.done_size = 0;
        self.status = SliceStatus::NotStarted;
        self.md5.clear();
    }
}

/// Older writers padded digests with NULs; strip them along with whitespace.
///
/// Both are stripped in one pass, so `"abc\0 "` becomes `"abc"`. A two-step
/// trim (NULs, then whitespace) would leave `"abc\0"`, which a second pass
/// would shorten again; one pass keeps the result stable across
/// save/restore cycles.
fn normalize_md5(md5: &str) -> String {
    md5.trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}
