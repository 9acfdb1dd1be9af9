fn main() {
    println!("Run `cargo test -p ledger-compat` to execute ledger format compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use sliceledger_protocol::{Slice, SliceStatus};
    use sliceledger_transfer::{
        TransferError, decode_slice_list, encode_slice_list, restore_slice_list,
        save_slice_list,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a hand-built ledger image in the legacy record layout.
    fn load_fixture(name: &str) -> Vec<u8> {
        let path = fixtures_dir().join(name);
        fs::read(&path).unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    fn slice(
        index: i32,
        start: i64,
        total: i64,
        done: i64,
        status: SliceStatus,
        md5: &str,
    ) -> Slice {
        Slice::from_parts(index, start, total, done, status, md5).unwrap()
    }

    /// Decodes a fixture, compares it with `expected`, then checks that
    /// re-encoding reproduces the fixture byte for byte.
    fn roundtrip_test(name: &str, expected: &[Slice]) {
        let fixture = load_fixture(name);
        let decoded = decode_slice_list(&fixture)
            .unwrap_or_else(|e| panic!("failed to decode {name}: {e}"));
        assert_eq!(decoded, expected, "decoded slices differ for {name}");

        let reencoded = encode_slice_list(&decoded)
            .unwrap_or_else(|e| panic!("failed to encode {name}: {e}"));
        assert_eq!(
            reencoded, fixture,
            "re-encoded bytes differ for {name}"
        );
    }

    #[test]
    fn fixture_mid_transfer() {
        roundtrip_test(
            "ledger_mid_transfer.bin",
            &[
                slice(0, 0, 100, 100, SliceStatus::Done, "6cd3556deb0da54bca060b4c39479839"),
                slice(1, 100, 100, 42, SliceStatus::InProgress, ""),
                slice(2, 200, 50, 0, SliceStatus::NotStarted, ""),
            ],
        );
    }

    #[test]
    fn fixture_unicode_md5_and_large_offsets() {
        roundtrip_test(
            "ledger_unicode_md5.bin",
            &[slice(0, 0, 5_000_000_000, 5_000_000_000, SliceStatus::Done, "摘要-ü")],
        );
    }

    #[test]
    fn fixture_empty() {
        roundtrip_test("ledger_empty.bin", &[]);
    }

    #[test]
    fn fixture_padded_md5_is_trimmed() {
        let decoded = decode_slice_list(&load_fixture("ledger_padded_md5.bin")).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].md5(), "abc");
        // Re-encoding writes the trimmed digest.
        assert_eq!(encode_slice_list(&decoded).unwrap().len(), load_fixture("ledger_padded_md5.bin").len() - 3);
    }

    #[test]
    fn fixture_truncated_is_corrupt() {
        let result = decode_slice_list(&load_fixture("ledger_truncated.bin"));
        assert!(matches!(result, Err(TransferError::CorruptLedger(_))));
    }

    #[test]
    fn saved_file_matches_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.slices");
        let expected = load_fixture("ledger_mid_transfer.bin");

        let slices = decode_slice_list(&expected).unwrap();
        save_slice_list(&path, &slices).unwrap();
        assert_eq!(fs::read(&path).unwrap(), expected);
        assert_eq!(restore_slice_list(&path).unwrap(), slices);
    }
}
