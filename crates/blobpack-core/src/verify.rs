//! Reconstruction of packaged records and byte-level comparison helpers.

use crate::alpha::expand_alpha;
use crate::error::{PackError, Result};
use crate::model::{CompressedRecord, Table};
use crate::rle;
use image::{ImageFormat, RgbaImage};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// A record turned back into something usable.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconstructed {
    /// Decoded RGBA pixels (from an RLE payload).
    Rgba(RgbaImage),
    /// The original encoded file (from a raw payload).
    Encoded(Vec<u8>),
}

/// Decompresses an RLE record into RGBA bytes, re-expanding alpha-only data.
///
/// Fails with [`PackError::SizeMismatch`] when the decompressed length differs from
/// `decompressed_size`, or the RGBA length differs from `width * height * 4`.
/// Must not be called on raw records.
pub fn decode_pixels(record: &CompressedRecord) -> Result<Vec<u8>> {
    debug_assert!(!record.is_raw_encoding);
    let data = rle::decompress(&record.payload)?;
    if data.len() != record.decompressed_size {
        return Err(PackError::SizeMismatch {
            name: record.name.clone(),
            expected: record.decompressed_size,
            actual: data.len(),
        });
    }
    let rgba = if record.is_alpha_only {
        expand_alpha(&data)
    } else {
        data
    };
    let expected = record.rgba_len();
    if rgba.len() != expected {
        return Err(PackError::SizeMismatch {
            name: record.name.clone(),
            expected,
            actual: rgba.len(),
        });
    }
    Ok(rgba)
}

/// Rebuilds the image a record describes.
pub fn reconstruct(record: &CompressedRecord) -> Result<Reconstructed> {
    if record.is_raw_encoding {
        return Ok(Reconstructed::Encoded(record.payload.clone()));
    }
    let rgba = decode_pixels(record)?;
    let actual = rgba.len();
    RgbaImage::from_raw(record.width, record.height, rgba)
        .map(Reconstructed::Rgba)
        .ok_or_else(|| PackError::SizeMismatch {
            name: record.name.clone(),
            expected: record.rgba_len(),
            actual,
        })
}

/// Checks that an RLE record reconstructs to the advertised size. Raw records pass.
pub fn verify_record(record: &CompressedRecord) -> Result<()> {
    if !record.is_raw_encoding {
        decode_pixels(record)?;
    }
    Ok(())
}

#[instrument(skip_all, fields(records = table.len()))]
/// Verifies every record in `table`, stopping at the first failure.
pub fn verify_table(table: &Table) -> Result<()> {
    for record in table {
        verify_record(record)?;
    }
    Ok(())
}

/// Writes a reconstructed record under `dir`, named after the record.
///
/// Raw records are written byte-for-byte; RLE records are saved as PNG.
/// Parent directories in the record name are created as needed.
pub fn write_reconstructed(dir: &Path, record: &CompressedRecord) -> Result<PathBuf> {
    let path = dir.join(&record.name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match reconstruct(record)? {
        Reconstructed::Encoded(bytes) => std::fs::write(&path, bytes)?,
        Reconstructed::Rgba(img) => img.save_with_format(&path, ImageFormat::Png)?,
    }
    debug!(?path, "wrote reconstructed image");
    Ok(path)
}

/// One position where two buffers disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteDifference {
    pub index: usize,
    pub left: u8,
    pub right: u8,
}

/// Result of [`byte_differences`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteDiff {
    pub left_len: usize,
    pub right_len: usize,
    /// Differences over the common prefix of both buffers.
    pub differences: Vec<ByteDifference>,
}

impl ByteDiff {
    pub fn is_identical(&self) -> bool {
        self.left_len == self.right_len && self.differences.is_empty()
    }
}

impl fmt::Display for ByteDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identical() {
            return write!(f, "No differences found!");
        }
        if self.left_len != self.right_len {
            writeln!(f, "Length differs: {} != {}", self.left_len, self.right_len)?;
        }
        writeln!(f, "{} differences found:", self.differences.len())?;
        for d in &self.differences {
            writeln!(
                f,
                "Difference at index {}: {:#04x} != {:#04x}",
                d.index, d.left, d.right
            )?;
        }
        Ok(())
    }
}

/// Compares two buffers byte by byte.
pub fn byte_differences(left: &[u8], right: &[u8]) -> ByteDiff {
    let differences = left
        .iter()
        .zip(right)
        .enumerate()
        .filter(|(_, (l, r))| l != r)
        .map(|(index, (&left, &right))| ByteDifference { index, left, right })
        .collect();
    ByteDiff {
        left_len: left.len(),
        right_len: right.len(),
        differences,
    }
}
