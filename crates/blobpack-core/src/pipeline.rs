use crate::alpha::extract_alpha;
use crate::config::{PackConfig, RecordOrder};
use crate::error::{PackError, Result};
use crate::model::{CompressedRecord, PackStats, Table, validate_name};
use crate::resolve::resolve_conflicts;
use crate::rle;
use image::DynamicImage;
use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Image to package: key, decoded pixels and the encoded bytes they came from.
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
    /// Encoded file contents (PNG etc.) used as the raw fallback candidate.
    pub encoded: Vec<u8>,
}

/// A record plus the size bookkeeping produced while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedImage {
    pub record: CompressedRecord,
    /// Decoded RGBA length of the source image.
    pub original_size: usize,
    /// `original_size - payload.len()`; may be negative.
    pub bytes_saved: i64,
}

/// An input that could not be packaged; the rest of the batch is unaffected.
#[derive(Debug)]
pub struct PackFailure {
    pub key: String,
    pub error: PackError,
}

/// Output of a batch run: the table, its statistics and per-image failures.
#[derive(Debug)]
pub struct PackOutput {
    pub table: Table,
    pub stats: PackStats,
    pub failures: Vec<PackFailure>,
}

/// Packages one image.
///
/// The pixel buffer (alpha-only when `alpha_only` is set) is conflict-resolved and
/// run-length encoded. If `raw_encoded` is strictly shorter than that stream it is
/// stored verbatim instead, and the alpha-only flag is cleared.
pub fn package_image(
    name: &str,
    rgba: &[u8],
    width: u32,
    height: u32,
    raw_encoded: &[u8],
    alpha_only: bool,
) -> Result<PackagedImage> {
    validate_name(name)?;
    let expected = width as usize * height as usize * crate::alpha::RGBA_STRIDE;
    if rgba.len() != expected {
        return Err(PackError::SizeMismatch {
            name: name.to_string(),
            expected,
            actual: rgba.len(),
        });
    }

    let resolved = if alpha_only {
        resolve_conflicts(&extract_alpha(rgba))
    } else {
        resolve_conflicts(rgba)
    };
    let decompressed_size = resolved.len();
    let compressed = rle::compress(&resolved);

    let (payload, is_raw_encoding, is_alpha_only) = if raw_encoded.len() < compressed.len() {
        (raw_encoded.to_vec(), true, false)
    } else {
        (compressed, false, alpha_only)
    };
    debug!(
        name,
        decompressed_size,
        payload = payload.len(),
        raw = raw_encoded.len(),
        is_raw_encoding,
        is_alpha_only,
        "packaged image"
    );

    let bytes_saved = rgba.len() as i64 - payload.len() as i64;
    Ok(PackagedImage {
        record: CompressedRecord {
            name: name.to_string(),
            payload,
            width,
            height,
            decompressed_size,
            is_raw_encoding,
            is_alpha_only,
        },
        original_size: rgba.len(),
        bytes_saved,
    })
}

/// Packages a decoded input, converting it to RGBA8 first.
pub fn package_input(input: &InputImage, alpha_only: bool) -> Result<PackagedImage> {
    let rgba = input.image.to_rgba8();
    let (w, h) = rgba.dimensions();
    package_image(&input.key, rgba.as_raw(), w, h, &input.encoded, alpha_only)
}

#[instrument(skip_all, fields(inputs = inputs.len()))]
/// Packages `inputs` into a table using configuration `cfg`.
///
/// Notes:
/// - Records follow `cfg.order`; parallel runs produce the same table as sequential ones.
/// - Inputs that fail to package are reported in `failures` and left out of the table.
/// - Every RLE record is reconstructed before returning; a failure there is a codec
///   defect and aborts the whole run.
pub fn pack_images(mut inputs: Vec<InputImage>, cfg: &PackConfig) -> Result<PackOutput> {
    cfg.validate()?;

    if matches!(cfg.order, RecordOrder::NameAsc) {
        inputs.sort_by(|a, b| a.key.cmp(&b.key));
    }

    let results = package_all(&inputs, cfg);

    let mut table = Table::new();
    let mut stats = PackStats::default();
    let mut failures = Vec::new();
    for (input, result) in inputs.iter().zip(results) {
        let packaged = match result {
            Ok(p) => p,
            Err(error) => {
                warn!(key = %input.key, %error, "skip image");
                failures.push(PackFailure {
                    key: input.key.clone(),
                    error,
                });
                continue;
            }
        };
        crate::verify::verify_record(&packaged.record)?;
        if table.get(&packaged.record.name).is_some() {
            let error = PackError::DuplicateName(packaged.record.name);
            warn!(key = %input.key, %error, "skip image");
            failures.push(PackFailure {
                key: input.key.clone(),
                error,
            });
            continue;
        }
        stats.record(&packaged.record, packaged.original_size);
        table.push(packaged.record)?;
    }
    Ok(PackOutput {
        table,
        stats,
        failures,
    })
}

fn package_all(inputs: &[InputImage], cfg: &PackConfig) -> Vec<Result<PackagedImage>> {
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return inputs
                .par_iter()
                .map(|inp| package_input(inp, cfg.alpha_only))
                .collect();
        }
    }
    inputs
        .iter()
        .map(|inp| package_input(inp, cfg.alpha_only))
        .collect()
}
