//! Binary slice ledger: one fixed-width little-endian record per slice.
//!
//! Record layout:
//!
//! ```text
//! [4: index i32][8: start i64][8: total_size i64][8: done_size i64]
//! [4: status i32][4: md5_len i32][md5_len: md5 UTF-8 bytes]
//! ```
//!
//! A ledger file is a bare concatenation of records; end-of-file is the only
//! terminator. `md5_len == 0` means no digest is stored.

use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use sliceledger_protocol::{Slice, SliceStatus};

use crate::TransferError;

/// Length of the fixed part of a record (everything except the md5 bytes).
pub const RECORD_FIXED_LEN: usize = 4 + 8 + 8 + 8 + 4 + 4;

// ---------------------------------------------------------------------------
// Record codec
// ---------------------------------------------------------------------------

/// Writes one slice record.
pub fn write_slice<W: Write>(w: &mut W, slice: &Slice) -> std::io::Result<()> {
    let md5 = slice.md5().as_bytes();
    let md5_len = i32::try_from(md5.len()).map_err(|_| {
        std::io::Error::new(ErrorKind::InvalidInput, "md5 too long for ledger record")
    })?;

    let mut fixed = [0u8; RECORD_FIXED_LEN];
    fixed[0..4].copy_from_slice(&slice.index().to_le_bytes());
    fixed[4..12].copy_from_slice(&slice.start().to_le_bytes());
    fixed[12..20].copy_from_slice(&slice.total_size().to_le_bytes());
    fixed[20..28].copy_from_slice(&slice.done_size().to_le_bytes());
    fixed[28..32].copy_from_slice(&slice.status().code().to_le_bytes());
    fixed[32..36].copy_from_slice(&md5_len.to_le_bytes());

    w.write_all(&fixed)?;
    if md5_len > 0 {
        w.write_all(md5)?;
    }
    Ok(())
}

/// Reads one slice record.
///
/// Returns `Ok(None)` when the stream is exhausted exactly at a record
/// boundary. A stream ending anywhere inside a record is a
/// [`TransferError::CorruptLedger`].
pub fn read_slice<R: Read>(r: &mut R) -> Result<Option<Slice>, TransferError> {
    let mut fixed = [0u8; RECORD_FIXED_LEN];
    let got = read_full(r, &mut fixed)?;
    if got == 0 {
        return Ok(None);
    }
    if got < RECORD_FIXED_LEN {
        return Err(TransferError::CorruptLedger(format!(
            "truncated record: expected {RECORD_FIXED_LEN} bytes, got {got}"
        )));
    }

    let index = le_i32(&fixed, 0);
    let start = le_i64(&fixed, 4);
    let total_size = le_i64(&fixed, 12);
    let done_size = le_i64(&fixed, 20);
    let status_code = le_i32(&fixed, 28);
    let md5_len = le_i32(&fixed, 32);

    let status = SliceStatus::from_code(status_code).ok_or_else(|| {
        TransferError::CorruptLedger(format!(
            "slice {index}: unknown status code {status_code}"
        ))
    })?;

    if md5_len < 0 {
        return Err(TransferError::CorruptLedger(format!(
            "slice {index}: negative md5 length {md5_len}"
        )));
    }

    let md5 = if md5_len > 0 {
        // `take` bounds the allocation by what the stream actually holds.
        let mut buf = Vec::new();
        r.by_ref().take(md5_len as u64).read_to_end(&mut buf)?;
        if buf.len() < md5_len as usize {
            return Err(TransferError::CorruptLedger(format!(
                "slice {index}: md5 declares {md5_len} bytes, only {} remain",
                buf.len()
            )));
        }
        String::from_utf8(buf).map_err(|e| {
            TransferError::CorruptLedger(format!("slice {index}: md5 is not UTF-8: {e}"))
        })?
    } else {
        String::new()
    };

    let slice = Slice::from_parts(index, start, total_size, done_size, status, &md5)
        .map_err(|e| TransferError::CorruptLedger(format!("slice {index}: {e}")))?;
    Ok(Some(slice))
}

/// Writes every slice in order.
pub fn write_slice_list<W: Write>(w: &mut W, slices: &[Slice]) -> std::io::Result<()> {
    for slice in slices {
        write_slice(w, slice)?;
    }
    Ok(())
}

/// Reads records until end of stream, keeping stream order.
///
/// No structural validation is done here; see [`validate_slice_list`].
pub fn read_slice_list<R: Read>(r: &mut R) -> Result<Vec<Slice>, TransferError> {
    let mut slices = Vec::new();
    while let Some(slice) = read_slice(r)? {
        slices.push(slice);
    }
    Ok(slices)
}

/// Encodes a slice list into an in-memory ledger image.
///
/// Fails only when a slice cannot be represented in a record.
pub fn encode_slice_list(slices: &[Slice]) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(slices.len() * RECORD_FIXED_LEN);
    write_slice_list(&mut buf, slices)?;
    Ok(buf)
}

/// Decodes an in-memory ledger image.
pub fn decode_slice_list(data: &[u8]) -> Result<Vec<Slice>, TransferError> {
    let mut cursor = data;
    read_slice_list(&mut cursor)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Checks that `slices` form a gapless sequence starting at offset 0 with
/// indices `0..N-1` in order.
///
/// With `file_size`, also checks that the slices end exactly at the file size.
pub fn validate_slice_list(slices: &[Slice], file_size: Option<i64>) -> Result<(), TransferError> {
    let mut expected_start = 0i64;
    for (pos, slice) in slices.iter().enumerate() {
        if slice.index() as i64 != pos as i64 {
            return Err(TransferError::CorruptLedger(format!(
                "slice at position {pos} has index {}",
                slice.index()
            )));
        }
        if slice.start() != expected_start {
            return Err(TransferError::CorruptLedger(format!(
                "slice {pos} starts at {}, expected {expected_start}",
                slice.start()
            )));
        }
        if slice.total_size() <= 0 {
            return Err(TransferError::CorruptLedger(format!(
                "slice {pos} is empty"
            )));
        }
        expected_start = slice.start().checked_add(slice.total_size()).ok_or_else(|| {
            TransferError::CorruptLedger(format!("slice {pos} extends past the offset range"))
        })?;
    }

    if let Some(file_size) = file_size {
        if expected_start != file_size {
            return Err(TransferError::CorruptLedger(format!(
                "slices cover {expected_start} bytes, file has {file_size}"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ledger files
// ---------------------------------------------------------------------------

/// Writes `slices` to `path`, replacing any previous ledger.
///
/// Missing parent directories are created.
pub fn save_slice_list(path: &Path, slices: &[Slice]) -> Result<(), TransferError> {
    sliceledger_file_ops::ensure_parent_dir(path)?;
    let file = sliceledger_file_ops::open_write_truncate(path)?;
    let mut w = BufWriter::new(file);
    write_slice_list(&mut w, slices)?;
    w.flush()?;

    tracing::debug!(path = %path.display(), slices = slices.len(), "saved slice ledger");
    Ok(())
}

/// Reads the ledger at `path` back into a slice list in file order.
///
/// Fails with an I/O error of kind `NotFound` when the ledger is missing
/// and with [`TransferError::CorruptLedger`] when a record is truncated or
/// the slices do not form a gapless, in-order sequence.
pub fn restore_slice_list(path: &Path) -> Result<Vec<Slice>, TransferError> {
    let file = sliceledger_file_ops::open_read(path)?;
    let mut r = BufReader::new(file);
    let slices = read_slice_list(&mut r)?;
    validate_slice_list(&slices, None)?;

    tracing::debug!(path = %path.display(), slices = slices.len(), "restored slice ledger");
    Ok(slices)
}

/// Removes the ledger at `path`. A missing ledger is not an error.
pub fn delete_slice_file(path: &Path) -> Result<(), TransferError> {
    if sliceledger_file_ops::remove_file_if_exists(path)? {
        tracing::debug!(path = %path.display(), "deleted slice ledger");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fills `buf` as far as the stream allows and returns the byte count.
fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn le_i32(buf: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn le_i64(buf: &[u8], at: usize) -> i64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[at..at + 8]);
    i64::from_le_bytes(b)
}
