use blobpack_core::error::PackError;
use blobpack_core::prelude::*;
use blobpack_core::table::{POSTAMBLE, PREAMBLE};

fn rec(name: &str, payload: Vec<u8>, raw: bool, alpha: bool) -> CompressedRecord {
    CompressedRecord {
        name: name.into(),
        decompressed_size: payload.len() * 2,
        payload,
        width: 64,
        height: 32,
        is_raw_encoding: raw,
        is_alpha_only: alpha,
    }
}

fn sample_table() -> Table {
    let mut t = Table::new();
    t.push(rec("bug.png", vec![0, 92, 0, 0, 2, 255, 1, 0, 4], false, true))
        .expect("push");
    t.push(rec("logo.png", vec![137, 80, 78, 71, 13, 10, 26, 10], true, false))
        .expect("push");
    t.push(rec("icons/empty.png", vec![], false, false)).expect("push");
    t
}

#[test]
fn roundtrip_preserves_fields_and_order() {
    let t = sample_table();
    let text = serialize_table(&t);
    let back = deserialize_table(&text).expect("parse");
    assert_eq!(back, t);
    let names: Vec<&str> = back.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["bug.png", "logo.png", "icons/empty.png"]);
}

#[test]
fn empty_table_roundtrip() {
    let text = serialize_table(&Table::new());
    assert_eq!(text, format!("{}{}", PREAMBLE, POSTAMBLE));
    assert!(deserialize_table(&text).expect("parse").is_empty());
}

#[test]
fn header_layout() {
    let text = serialize_table(&sample_table());
    assert!(text.starts_with("#pragma once\n\n#include <map>\n"));
    assert!(text.contains("std::map<std::string, ImageData> imageMap = {\n"));
    assert!(text.contains(
        "{ \"logo.png\", { new unsigned char[8] { 137,80,78,71,13,10,26,10 }, 8, 64, 32, 16, true, false } },\n"
    ));
    assert!(text.ends_with("\n};"));
}

#[test]
fn bad_line_reports_line_number() {
    let text = serialize_table(&sample_table());
    let corrupted = text.replacen("logo.png\", { new", "logo.png\", { old", 1);
    let first_record_line = PREAMBLE.lines().count() + 1;
    match deserialize_table(&corrupted) {
        Err(PackError::GrammarParse { line, .. }) => assert_eq!(line, first_record_line + 1),
        other => panic!("expected GrammarParse, got {:?}", other),
    }
}

#[test]
fn bad_byte_value_is_an_error() {
    let text = serialize_table(&sample_table()).replacen("0,92,", "0,920,", 1);
    assert!(matches!(
        deserialize_table(&text),
        Err(PackError::GrammarParse { .. })
    ));
}

#[test]
fn missing_preamble_or_postamble() {
    let text = serialize_table(&sample_table());
    assert!(matches!(
        deserialize_table(&text["#pragma once".len()..]),
        Err(PackError::GrammarParse { line: 1, .. })
    ));
    let truncated = text.trim_end_matches(POSTAMBLE);
    assert!(matches!(
        deserialize_table(truncated),
        Err(PackError::GrammarParse { .. })
    ));
}

#[test]
fn duplicate_names_are_rejected() {
    let mut t = Table::new();
    t.push(rec("a.png", vec![1], false, false)).expect("push");
    assert!(matches!(
        t.push(rec("a.png", vec![3], false, false)),
        Err(PackError::DuplicateName(_))
    ));

    let line = blobpack_core::table::serialize_record(&rec("a.png", vec![1], false, false));
    let text = format!("{}{}\n{}\n{}", PREAMBLE, line, line, POSTAMBLE);
    assert!(matches!(
        deserialize_table(&text),
        Err(PackError::GrammarParse { .. })
    ));
}

#[test]
fn blank_lines_and_trailing_newline_are_tolerated() {
    let t = sample_table();
    let text = serialize_table(&t).replace("},\n{", "},\n\n{") + "\n";
    assert_eq!(deserialize_table(&text).expect("parse"), t);
}
