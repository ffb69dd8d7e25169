//! RAW10 bit packing (MIPI CSI-2 style, 4 samples in 5 bytes).
//!
//! Layout of one group:
//!
//! ```text
//! byte 0   byte 1   byte 2   byte 3   byte 4
//! P0[9:2]  P1[9:2]  P2[9:2]  P3[9:2]  P3[1:0] P2[1:0] P1[1:0] P0[1:0]
//! ```
//!
//! The low fragments are placed least-significant first: P0 owns bits 0-1 of
//! the fifth byte, P3 owns bits 6-7.

use crate::image_pipeline::common::error::{FrameError, Result};

/// Bytes in one packed group.
pub const GROUP_BYTES: usize = 5;

/// Samples in one packed group.
pub const GROUP_SAMPLES: usize = 4;

/// Largest value a 10-bit sample can take.
pub const RAW10_MAX: u16 = 1023;

pub const RAW10_BITS: u32 = 10;

/// Packed bytes occupied by a row of `width` pixels.
///
/// Rows are made of whole groups, so a width that is not a multiple of four
/// still consumes a full trailing group.
pub fn packed_row_bytes(width: usize) -> usize {
    width.div_ceil(GROUP_SAMPLES) * GROUP_BYTES
}

/// Row alignment applied by the Pi CSI-2 receiver (2592 pixels → 3264 bytes).
pub const DEFAULT_STRIDE_ALIGNMENT: usize = 32;

/// Packed row size rounded up to the receiver's row alignment.
pub fn aligned_row_bytes(width: usize, alignment: usize) -> usize {
    packed_row_bytes(width).next_multiple_of(alignment.max(1))
}

/// Unpacks `packed` into freshly allocated samples.
pub fn unpack_raw10(packed: &[u8]) -> Result<Vec<u16>> {
    let mut out = Vec::with_capacity(packed.len() / GROUP_BYTES * GROUP_SAMPLES);
    unpack_raw10_into(packed, &mut out)?;
    Ok(out)
}

/// Appends the samples encoded in `packed` to `out`.
///
/// Fails without touching `out` when `packed` is not made of whole groups.
pub fn unpack_raw10_into(packed: &[u8], out: &mut Vec<u16>) -> Result<()> {
    if packed.len() % GROUP_BYTES != 0 {
        return Err(FrameError::PackedLengthMisaligned { len: packed.len() }.into());
    }

    out.reserve(packed.len() / GROUP_BYTES * GROUP_SAMPLES);
    for group in packed.chunks_exact(GROUP_BYTES) {
        let low = u16::from(group[4]);
        out.extend(
            group[..GROUP_SAMPLES]
                .iter()
                .enumerate()
                .map(|(i, &high)| (u16::from(high) << 2) | ((low >> (2 * i)) & 0x03)),
        );
    }
    Ok(())
}

/// Packs 10-bit samples into RAW10 groups. Inverse of [`unpack_raw10`].
///
/// A trailing partial group is zero-filled; bits above the tenth are ignored.
pub fn pack_raw10(samples: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(packed_row_bytes(samples.len()));
    for group in samples.chunks(GROUP_SAMPLES) {
        let mut low = 0u8;
        for i in 0..GROUP_SAMPLES {
            let sample = group.get(i).copied().unwrap_or(0) & RAW10_MAX;
            out.push((sample >> 2) as u8);
            low |= ((sample & 0x03) as u8) << (2 * i);
        }
        out.push(low);
    }
    out
}

/// Packs a row-major plane into a frame buffer with `stride` bytes per row.
///
/// Padding bytes are filled with `pad`, so tests can tell whether they leak
/// into decoded samples.
pub fn pack_frame(samples: &[u16], width: usize, stride: usize, pad: u8) -> Vec<u8> {
    if width == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(samples.len() / width * stride);
    for row in samples.chunks(width) {
        let packed = pack_raw10(row);
        let start = out.len();
        out.extend_from_slice(&packed);
        out.resize(start + stride.max(packed.len()), pad);
    }
    out
}
