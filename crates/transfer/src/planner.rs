use sliceledger_protocol::Slice;

use crate::{PlanConfig, TransferError};

/// Integer ceiling division for non-negative `a` and positive `b`.
///
/// Truncating division plus one when there is a remainder; never goes
/// through floating point, so it stays exact for very large sizes.
pub fn ceil_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 { q + 1 } else { q }
}

/// Chooses a slice size so that a file of `file_size` bytes is split into at
/// most `max_slice_count` slices.
///
/// Returns `min_slice_size` unchanged when it already satisfies the cap.
/// Otherwise a single corrective pass returns `ceil(file_size / max_slice_count)`;
/// no search for a tighter size is made.
pub fn calculate_slice_size(
    file_size: i64,
    min_slice_size: i64,
    max_slice_count: i64,
) -> Result<i64, TransferError> {
    if file_size < 0 {
        return Err(TransferError::InvalidInput(format!(
            "file size must not be negative (got {file_size})"
        )));
    }
    if min_slice_size <= 0 {
        return Err(TransferError::InvalidInput(format!(
            "minimum slice size must be positive (got {min_slice_size})"
        )));
    }
    if max_slice_count <= 0 {
        return Err(TransferError::InvalidInput(format!(
            "maximum slice count must be positive (got {max_slice_count})"
        )));
    }

    let count = ceil_div(file_size, min_slice_size);
    if count <= max_slice_count {
        return Ok(min_slice_size);
    }

    let slice_size = ceil_div(file_size, max_slice_count);
    let adjusted_count = ceil_div(file_size, slice_size);
    tracing::info!(
        file_size,
        min_slice_size,
        max_slice_count,
        slice_size,
        slice_count = adjusted_count,
        "minimum slice size exceeds slice cap, enlarging slices"
    );
    Ok(slice_size)
}

/// Splits a file of `file_size` bytes into consecutive slices of
/// `slice_size` bytes. The last slice is clamped to end at `file_size`.
///
/// An empty file yields an empty list.
pub fn create_slice_list(file_size: i64, slice_size: i64) -> Result<Vec<Slice>, TransferError> {
    if file_size < 0 {
        return Err(TransferError::InvalidInput(format!(
            "file size must not be negative (got {file_size})"
        )));
    }
    if slice_size <= 0 {
        return Err(TransferError::InvalidInput(format!(
            "slice size must be positive (got {slice_size})"
        )));
    }

    let count = ceil_div(file_size, slice_size);
    // Ledger records store the index as a 4-byte integer.
    let count = i32::try_from(count).map_err(|_| {
        TransferError::InvalidInput(format!(
            "{count} slices exceed the ledger index range; use a larger slice size"
        ))
    })?;

    let mut slices = Vec::with_capacity(count as usize);
    let mut offset = 0i64;
    for index in 0..count {
        let size = slice_size.min(file_size - offset);
        slices.push(Slice::new(index, offset, size));
        offset = offset.saturating_add(slice_size);
    }
    Ok(slices)
}

/// Plans slices for `file_size` using the limits in `config`.
pub fn plan_slices(file_size: i64, config: &PlanConfig) -> Result<Vec<Slice>, TransferError> {
    let slice_size =
        calculate_slice_size(file_size, config.min_slice_size, config.max_slice_count)?;
    create_slice_list(file_size, slice_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sliceledger_protocol::SliceStatus;

    fn assert_covers(slices: &[Slice], file_size: i64) {
        let mut expected_start = 0;
        for (i, s) in slices.iter().enumerate() {
            assert_eq!(s.index(), i as i32);
            assert_eq!(s.start(), expected_start);
            assert!(s.total_size() > 0);
            assert_eq!(s.done_size(), 0);
            assert_eq!(s.status(), SliceStatus::NotStarted);
            assert!(s.md5().is_empty());
            expected_start = s.end();
        }
        assert_eq!(expected_start, file_size);
        let sum: i64 = slices.iter().map(Slice::total_size).sum();
        assert_eq!(sum, file_size);
    }

    #[test]
    fn ceil_div_rounds_up_only_on_remainder() {
        assert_eq!(ceil_div(0, 7), 0);
        assert_eq!(ceil_div(7, 7), 1);
        assert_eq!(ceil_div(8, 7), 2);
        assert_eq!(ceil_div(1000, 100), 10);
        assert_eq!(ceil_div(250, 100), 3);
    }

    #[test]
    fn ceil_div_exact_for_huge_values() {
        // f64 cannot represent i64::MAX - 1 exactly; integer math must.
        assert_eq!(ceil_div(i64::MAX - 1, i64::MAX - 1), 1);
        assert_eq!(ceil_div(i64::MAX, 2), i64::MAX / 2 + 1);
    }

    #[test]
    fn slice_size_enlarged_when_too_many_slices() {
        assert_eq!(calculate_slice_size(1000, 100, 5).unwrap(), 200);
    }

    #[test]
    fn slice_size_minimum_kept_when_under_cap() {
        assert_eq!(calculate_slice_size(250, 100, 10).unwrap(), 100);
    }

    #[test]
    fn slice_size_for_empty_file() {
        assert_eq!(calculate_slice_size(0, 100, 1).unwrap(), 100);
    }

    #[test]
    fn slice_size_single_slice_cap() {
        assert_eq!(calculate_slice_size(12345, 10, 1).unwrap(), 12345);
    }

    #[test]
    fn slice_size_rejects_invalid_input() {
        assert!(matches!(
            calculate_slice_size(100, 0, 5),
            Err(TransferError::InvalidInput(_))
        ));
        assert!(matches!(
            calculate_slice_size(100, -1, 5),
            Err(TransferError::InvalidInput(_))
        ));
        assert!(matches!(
            calculate_slice_size(100, 10, 0),
            Err(TransferError::InvalidInput(_))
        ));
        assert!(matches!(
            calculate_slice_size(-1, 10, 5),
            Err(TransferError::InvalidInput(_))
        ));
    }

    #[test]
    fn slice_size_respects_cap_across_ranges() {
        for file_size in (0..5_000).step_by(37) {
            for min in [1, 3, 64, 100, 999] {
                for max in [1, 2, 7, 50, 1000] {
                    let size = calculate_slice_size(file_size, min, max).unwrap();
                    assert!(
                        ceil_div(file_size, size) <= max,
                        "file={file_size} min={min} max={max} size={size}"
                    );
                }
            }
        }
    }

    #[test]
    fn slice_size_respects_cap_for_large_files() {
        let file_size = 1_i64 << 50;
        let size = calculate_slice_size(file_size, 4 * 1024 * 1024, 10_000).unwrap();
        assert!(ceil_div(file_size, size) <= 10_000);
    }

    #[test]
    fn create_list_clamps_last_slice() {
        let slices = create_slice_list(250, 100).unwrap();
        assert_eq!(slices.len(), 3);
        assert_eq!((slices[0].index(), slices[0].start(), slices[0].total_size()), (0, 0, 100));
        assert_eq!((slices[1].index(), slices[1].start(), slices[1].total_size()), (1, 100, 100));
        assert_eq!((slices[2].index(), slices[2].start(), slices[2].total_size()), (2, 200, 50));
        assert_covers(&slices, 250);
    }

    #[test]
    fn create_list_exact_multiple() {
        let slices = create_slice_list(300, 100).unwrap();
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[2].total_size(), 100);
        assert_covers(&slices, 300);
    }

    #[test]
    fn create_list_empty_file() {
        assert!(create_slice_list(0, 100).unwrap().is_empty());
    }

    #[test]
    fn create_list_file_smaller_than_slice() {
        let slices = create_slice_list(10, 4096).unwrap();
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].total_size(), 10);
    }

    #[test]
    fn create_list_rejects_invalid_input() {
        assert!(matches!(
            create_slice_list(100, 0),
            Err(TransferError::InvalidInput(_))
        ));
        assert!(matches!(
            create_slice_list(-5, 10),
            Err(TransferError::InvalidInput(_))
        ));
        assert!(matches!(
            create_slice_list(i64::MAX, 1),
            Err(TransferError::InvalidInput(_))
        ));
    }

    #[test]
    fn create_list_covers_file_across_ranges() {
        for file_size in (1..3_000).step_by(41) {
            for slice_size in [1, 2, 7, 128, 1000, 4096] {
                let slices = create_slice_list(file_size, slice_size).unwrap();
                assert_eq!(slices.len() as i64, ceil_div(file_size, slice_size));
                assert_covers(&slices, file_size);
            }
        }
    }

    #[test]
    fn plan_slices_uses_config() {
        let config = PlanConfig {
            min_slice_size: 100,
            max_slice_count: 5,
        };
        let slices = plan_slices(1000, &config).unwrap();
        assert_eq!(slices.len(), 5);
        assert!(slices.iter().all(|s| s.total_size() == 200));
    }
}
