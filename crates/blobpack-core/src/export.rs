use crate::model::Table;
use serde_json::{json, Value};

/// Describe the table as JSON without payload bytes.
/// Shape: `{ records: [ { name, payloadSize, width, height, decompressedSize, isRawEncoding, isAlphaOnly } ], stats, meta }`.
/// Useful for diffing packaging decisions between runs.
pub fn to_json_manifest(table: &Table) -> Value {
    let records: Vec<Value> = table
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "payloadSize": r.payload.len(),
                "width": r.width,
                "height": r.height,
                "decompressedSize": r.decompressed_size,
                "isRawEncoding": r.is_raw_encoding,
                "isAlphaOnly": r.is_alpha_only,
            })
        })
        .collect();
    json!({
        "records": records,
        "stats": table.stats(),
        "meta": {
            "app": "blobpack",
            "version": env!("CARGO_PKG_VERSION"),
            "format": "rle-escape-2",
        },
    })
}
