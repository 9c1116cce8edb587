//! Escape-conflict resolution.
//!
//! [`rle::ESCAPE`](crate::rle::ESCAPE) doubles as a pixel value, so before
//! compression every occurrence of it is replaced by [`SUBSTITUTE`]. This is lossy:
//! after decompression an original `2` reads back as `1`. The table format depends
//! on this single-byte marker, so the loss is kept rather than widened.

use crate::rle::ESCAPE;

/// Value written in place of every escape byte found in pixel data.
pub const SUBSTITUTE: u8 = 1;

/// Returns a copy of `data` with every escape byte replaced by [`SUBSTITUTE`].
/// The output never contains the escape byte, so resolving twice changes nothing.
pub fn resolve_conflicts(data: &[u8]) -> Vec<u8> {
    data.iter()
        .map(|&b| if b == ESCAPE { SUBSTITUTE } else { b })
        .collect()
}

/// Number of bytes [`resolve_conflicts`] would rewrite.
pub fn conflict_count(data: &[u8]) -> usize {
    data.iter().filter(|&&b| b == ESCAPE).count()
}
