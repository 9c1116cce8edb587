//! Image I/O used around the packaging core: decoding, raw reads and resizing.

use crate::error::Result;
use crate::pipeline::InputImage;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Decodes `path` into RGBA8 pixels and returns them with the image dimensions.
pub fn decode_image(path: &Path) -> Result<(RgbaImage, u32, u32)> {
    let rgba = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_rgba8();
    let (w, h) = rgba.dimensions();
    Ok((rgba, w, h))
}

/// Reads the encoded file as-is.
pub fn read_raw_bytes(path: &Path) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

/// Encodes an image as PNG in memory.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Resizes `image` to exactly `size` with a Lanczos3 filter and re-encodes it as PNG.
///
/// The returned bytes stand in for the source file as the raw fallback candidate,
/// since the packaged pixels no longer match the original file.
pub fn resize_image(image: &DynamicImage, size: (u32, u32)) -> Result<(DynamicImage, Vec<u8>)> {
    let resized = image.resize_exact(size.0, size.1, FilterType::Lanczos3);
    let resized = DynamicImage::ImageRgba8(resized.to_rgba8());
    let encoded = encode_png(&resized)?;
    Ok((resized, encoded))
}

/// Loads one input file under `key`, resizing it when `target_size` is set.
pub fn load_input(path: &Path, key: String, target_size: Option<(u32, u32)>) -> Result<InputImage> {
    let encoded = read_raw_bytes(path)?;
    let image = image::load_from_memory(&encoded)?;
    let (image, encoded) = match target_size {
        Some(size) => resize_image(&image, size)?,
        None => (image, encoded),
    };
    Ok(InputImage {
        key,
        image,
        encoded,
    })
}
