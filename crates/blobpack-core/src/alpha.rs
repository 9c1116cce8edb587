//! Alpha-only projection of RGBA pixel data.

/// Bytes per RGBA pixel.
pub const RGBA_STRIDE: usize = 4;
/// RGB value used for every pixel when expanding alpha back to RGBA.
pub const EXPAND_FILL: u8 = 255;

/// Keeps only the alpha channel: every 4th byte starting at offset 3.
/// A trailing partial pixel is ignored.
pub fn extract_alpha(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(RGBA_STRIDE).map(|px| px[3]).collect()
}

/// Expands alpha values into opaque-white RGBA pixels `[255, 255, 255, a]`.
///
/// This only inverts [`extract_alpha`] for images whose RGB is already white;
/// it is meant for masks and other assets where alpha is the only signal.
pub fn expand_alpha(alpha: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(alpha.len() * RGBA_STRIDE);
    for &a in alpha {
        out.extend_from_slice(&[EXPAND_FILL, EXPAND_FILL, EXPAND_FILL, a]);
    }
    out
}
