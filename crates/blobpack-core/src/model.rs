use crate::error::{PackError, Result};
use serde::{Deserialize, Serialize};

/// Packaged form of a single image.
///
/// `payload` is either the RLE stream of the (possibly alpha-only) pixel buffer or,
/// when `is_raw_encoding` is set, a verbatim copy of the encoded source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedRecord {
    /// Unique key, usually the source file name.
    pub name: String,
    pub payload: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Length of the buffer before compression; sizes the reconstruction buffer.
    pub decompressed_size: usize,
    /// Payload is the original encoded file, not an RLE stream.
    pub is_raw_encoding: bool,
    /// Decompressed buffer holds alpha values only. Never set together with `is_raw_encoding`.
    pub is_alpha_only: bool,
}

impl CompressedRecord {
    /// Expected RGBA length once fully reconstructed (`width * height * 4`).
    pub fn rgba_len(&self) -> usize {
        self.width as usize * self.height as usize * crate::alpha::RGBA_STRIDE
    }
}

/// Rejects names that would break the table grammar (quotes, braces, line breaks).
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['"', '{', '}', '\n', '\r']) {
        return Err(PackError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Ordered name -> record mapping. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    records: Vec<CompressedRecord>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record`, rejecting invalid names and names already present.
    pub fn push(&mut self, record: CompressedRecord) -> Result<()> {
        validate_name(&record.name)?;
        if self.get(&record.name).is_some() {
            return Err(PackError::DuplicateName(record.name));
        }
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CompressedRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompressedRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[CompressedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CompressedRecord> {
        self.records
    }

    /// Computes size statistics for the table alone.
    /// Decoded sizes are estimated from record dimensions.
    pub fn stats(&self) -> PackStats {
        let mut stats = PackStats::default();
        for r in &self.records {
            stats.record(r, r.rgba_len());
        }
        stats
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a CompressedRecord;
    type IntoIter = std::slice::Iter<'a, CompressedRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Aggregate size accounting for a packaging run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackStats {
    /// Number of records in the table.
    pub num_records: usize,
    /// Records stored as the original encoded file.
    pub num_raw: usize,
    /// Records stored as alpha-only RLE.
    pub num_alpha_only: usize,
    /// Records stored as full RGBA RLE.
    pub num_rgba: usize,
    /// Sum of decoded RGBA buffer sizes.
    pub original_size: u64,
    /// Sum of payload sizes.
    pub payload_size: u64,
    /// `original_size - payload_size`; negative when packaging grew the data.
    pub bytes_saved: i64,
}

impl PackStats {
    /// Folds one record into the totals. `original_size` is the decoded RGBA length.
    pub fn record(&mut self, record: &CompressedRecord, original_size: usize) {
        self.num_records += 1;
        if record.is_raw_encoding {
            self.num_raw += 1;
        } else if record.is_alpha_only {
            self.num_alpha_only += 1;
        } else {
            self.num_rgba += 1;
        }
        self.original_size += original_size as u64;
        self.payload_size += record.payload.len() as u64;
        self.bytes_saved += original_size as i64 - record.payload.len() as i64;
    }

    /// Saved bytes as a percentage of the original size (0.0 when nothing was packed).
    pub fn saved_percentage(&self) -> f64 {
        if self.original_size > 0 {
            self.bytes_saved as f64 / self.original_size as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Records: {} (rle rgba: {}, rle alpha: {}, raw: {}), Original: {} B, Payload: {} B, Saved: {} B ({:.3}%)",
            self.num_records,
            self.num_rgba,
            self.num_alpha_only,
            self.num_raw,
            self.original_size,
            self.payload_size,
            self.bytes_saved,
            self.saved_percentage(),
        )
    }
}
