use blobpack_core::error::PackError;
use blobpack_core::prelude::*;
use blobpack_core::verify::{byte_differences, decode_pixels, write_reconstructed};

fn alpha_record(payload: Vec<u8>, width: u32, height: u32, decompressed_size: usize) -> CompressedRecord {
    CompressedRecord {
        name: "r.png".into(),
        payload,
        width,
        height,
        decompressed_size,
        is_raw_encoding: false,
        is_alpha_only: true,
    }
}

#[test]
fn alpha_record_expands_to_rgba() {
    let r = alpha_record(vec![2, 4, 200], 2, 2, 4);
    let px = decode_pixels(&r).expect("decode");
    assert_eq!(px.len(), 16);
    assert!(px.chunks(4).all(|p| p == [255, 255, 255, 200]));
}

#[test]
fn wrong_dimensions_are_a_size_mismatch() {
    let r = alpha_record(vec![2, 4, 200], 3, 2, 4);
    match reconstruct(&r) {
        Err(PackError::SizeMismatch {
            expected, actual, ..
        }) => {
            assert_eq!(expected, 24);
            assert_eq!(actual, 16);
        }
        other => panic!("expected SizeMismatch, got {:?}", other),
    }
}

#[test]
fn wrong_decompressed_size_is_a_size_mismatch() {
    let r = alpha_record(vec![2, 4, 200], 2, 2, 5);
    assert!(matches!(
        verify_table(&{
            let mut t = Table::new();
            t.push(r).expect("push");
            t
        }),
        Err(PackError::SizeMismatch { expected: 5, actual: 4, .. })
    ));
}

#[test]
fn truncated_payload_is_malformed() {
    let r = alpha_record(vec![7, 2, 4], 1, 1, 1);
    assert!(matches!(
        reconstruct(&r),
        Err(PackError::MalformedStream { offset: 1 })
    ));
}

#[test]
fn raw_records_pass_through() {
    let r = CompressedRecord {
        name: "raw.png".into(),
        payload: vec![1, 2, 3],
        width: 100,
        height: 100,
        decompressed_size: 40_000,
        is_raw_encoding: true,
        is_alpha_only: false,
    };
    assert_eq!(
        reconstruct(&r).expect("reconstruct"),
        Reconstructed::Encoded(vec![1, 2, 3])
    );
}

#[test]
fn writes_png_and_raw_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut rle = alpha_record(vec![0, 10], 2, 1, 2);
    rle.name = "nested/mask.png".into();
    let path = write_reconstructed(dir.path(), &rle).expect("write");
    let img = image::open(&path).expect("reopen").to_rgba8();
    assert_eq!(img.into_raw(), vec![255, 255, 255, 0, 255, 255, 255, 10]);

    let raw = CompressedRecord {
        name: "raw.bin".into(),
        payload: vec![9, 8, 7],
        width: 0,
        height: 0,
        decompressed_size: 0,
        is_raw_encoding: true,
        is_alpha_only: false,
    };
    let path = write_reconstructed(dir.path(), &raw).expect("write");
    assert_eq!(std::fs::read(path).expect("read"), vec![9, 8, 7]);
}

#[test]
fn byte_diff_report() {
    let d = byte_differences(&[1, 2, 3], &[1, 1, 3, 4]);
    assert!(!d.is_identical());
    assert_eq!(d.differences.len(), 1);
    assert_eq!(d.differences[0].index, 1);
    let text = d.to_string();
    assert!(text.contains("Length differs: 3 != 4"));
    assert!(text.contains("Difference at index 1: 0x02 != 0x01"));

    assert_eq!(byte_differences(&[5], &[5]).to_string(), "No differences found!");
}
