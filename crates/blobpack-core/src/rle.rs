//! Byte-level run-length codec.
//!
//! Runs of three or more identical bytes are written as `[ESCAPE, run_len, value]`;
//! everything else is copied through literally. The escape byte is also a valid
//! data value, so callers pass buffers through [`crate::resolve::resolve_conflicts`]
//! first (see that module for why this is lossy).

use crate::error::{PackError, Result};

/// Marker byte that introduces a run triple.
pub const ESCAPE: u8 = 2;
/// Shortest run that is worth encoding (a triple costs three bytes).
pub const MIN_RUN: usize = 3;
/// Longest run a single triple can describe.
pub const MAX_RUN: usize = 255;

/// Length of the run of `data[start]` beginning at `start`, capped at [`MAX_RUN`].
fn run_at(data: &[u8], start: usize) -> usize {
    let value = data[start];
    let max = MAX_RUN.min(data.len() - start);
    let mut count = 1;
    while count < max && data[start + count] == value {
        count += 1;
    }
    count
}

/// Compresses `data`, greedily emitting a run triple for every run of at least
/// [`MIN_RUN`] bytes and literal bytes otherwise.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let count = run_at(data, i);
        if count >= MIN_RUN {
            out.extend_from_slice(&[ESCAPE, count as u8, data[i]]);
        } else {
            out.extend_from_slice(&data[i..i + count]);
        }
        i += count;
    }
    out
}

/// Size `compress(data)` would produce, without allocating the output.
pub fn compressed_len(data: &[u8]) -> usize {
    let mut len = 0;
    let mut i = 0;
    while i < data.len() {
        let count = run_at(data, i);
        len += if count >= MIN_RUN { 3 } else { count };
        i += count;
    }
    len
}

/// Expands a stream produced by [`compress`].
///
/// Returns [`PackError::MalformedStream`] when an escape byte is not followed by
/// both a run length and a value.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut i = 0;
    while i < data.len() {
        if data[i] == ESCAPE {
            let Some(&[run_len, value]) = data.get(i + 1..i + 3) else {
                return Err(PackError::MalformedStream { offset: i });
            };
            out.resize(out.len() + run_len as usize, value);
            i += 3;
        } else {
            out.push(data[i]);
            i += 1;
        }
    }
    Ok(out)
}
