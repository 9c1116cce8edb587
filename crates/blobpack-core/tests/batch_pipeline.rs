use blobpack_core::error::PackError;
use blobpack_core::prelude::*;
use blobpack_core::source::encode_png;
use image::{DynamicImage, Rgba, RgbaImage};

fn input(key: &str, img: RgbaImage) -> InputImage {
    let image = DynamicImage::ImageRgba8(img);
    let encoded = encode_png(&image).expect("encode");
    InputImage {
        key: key.into(),
        image,
        encoded,
    }
}

fn mask(w: u32, h: u32, alpha: u8) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, alpha]))
}

fn noise(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        let v = (x * 31 + y * 17) as u8;
        Rgba([v, v.wrapping_add(1), v.wrapping_add(3), v.wrapping_add(5)])
    })
}

#[test]
fn batch_builds_table_in_input_order() {
    let inputs = vec![
        input("c.png", mask(16, 16, 0)),
        input("a.png", mask(8, 8, 200)),
        input("b.png", mask(4, 4, 50)),
    ];
    let cfg = PackConfig::builder().no_resize().build();
    let out = pack_images(inputs, &cfg).expect("pack");
    let names: Vec<&str> = out.table.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["c.png", "a.png", "b.png"]);
    assert!(out.failures.is_empty());
    assert!(out.table.iter().all(|r| r.is_alpha_only && !r.is_raw_encoding));

    // 256 identical alpha bytes: one full run plus one literal.
    assert_eq!(out.table.get("c.png").expect("c").payload, vec![2, 255, 0, 0]);
}

#[test]
fn name_order_sorts_records() {
    let inputs = vec![
        input("c.png", mask(2, 2, 1)),
        input("a.png", mask(2, 2, 1)),
        input("b.png", mask(2, 2, 1)),
    ];
    let cfg = PackConfig::builder().order(RecordOrder::NameAsc).build();
    let out = pack_images(inputs, &cfg).expect("pack");
    let names: Vec<&str> = out.table.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
}

#[test]
fn failures_do_not_abort_the_batch() {
    let inputs = vec![
        input("ok.png", mask(4, 4, 9)),
        input("bad\"name.png", mask(4, 4, 9)),
        input("ok.png", mask(2, 2, 9)),
        input("also_ok.png", mask(4, 4, 90)),
    ];
    let out = pack_images(inputs, &PackConfig::default()).expect("pack");
    assert_eq!(out.table.len(), 2);
    assert_eq!(out.failures.len(), 2);
    assert!(matches!(out.failures[0].error, PackError::InvalidName(_)));
    assert!(matches!(out.failures[1].error, PackError::DuplicateName(_)));
    assert_eq!(out.stats.num_records, 2);
}

#[test]
fn stats_sum_per_record_savings() {
    let mut raw_fallback = input("noise.png", noise(8, 8));
    raw_fallback.encoded = vec![0u8; 10];
    // Keep the RLE stream for the mask regardless of how well PNG compresses it.
    let mut rle = input("m.png", mask(8, 8, 3));
    rle.encoded = vec![0u8; 1024];
    let inputs = vec![rle, raw_fallback];
    let cfg = PackConfig::builder().alpha_only(false).build();
    let out = pack_images(inputs, &cfg).expect("pack");

    let noise_rec = out.table.get("noise.png").expect("noise");
    assert!(noise_rec.is_raw_encoding);
    assert_eq!(noise_rec.payload.len(), 10);

    let s = out.stats;
    assert_eq!(s.num_records, 2);
    assert_eq!(s.num_raw, 1);
    assert_eq!(s.num_rgba, 1);
    assert_eq!(s.num_alpha_only, 0);
    assert_eq!(s.original_size, 2 * 8 * 8 * 4);
    let payload: u64 = out.table.iter().map(|r| r.payload.len() as u64).sum();
    assert_eq!(s.payload_size, payload);
    assert_eq!(s.bytes_saved, s.original_size as i64 - payload as i64);
    assert!(s.summary().contains("raw: 1"));
}

#[test]
fn parallel_flag_does_not_change_output() {
    let make = || {
        (0..12)
            .map(|i| input(&format!("img_{:02}.png", i), mask(8, 8 + i, (i * 20) as u8)))
            .collect::<Vec<_>>()
    };
    let seq = pack_images(make(), &PackConfig::builder().parallel(false).build()).expect("seq");
    let par = pack_images(make(), &PackConfig::builder().parallel(true).build()).expect("par");
    assert_eq!(seq.table, par.table);
    assert_eq!(seq.stats, par.stats);
}

#[test]
fn packed_table_survives_serialization() {
    let inputs = vec![input("m.png", mask(8, 8, 3)), input("n.png", noise(4, 4))];
    let out = pack_images(inputs, &PackConfig::default()).expect("pack");
    let back = deserialize_table(&serialize_table(&out.table)).expect("parse");
    assert_eq!(back, out.table);
    verify_table(&back).expect("verify");
}

#[test]
fn empty_batch_is_an_empty_table() {
    let out = pack_images(Vec::new(), &PackConfig::default()).expect("pack");
    assert!(out.table.is_empty());
    assert_eq!(out.stats.saved_percentage(), 0.0);
}
