//! Row padding removal.
//!
//! The capture bus rounds every row up to its burst alignment. Only the first
//! `packed_row_bytes(width)` bytes of each stride hold pixel data.

use std::slice::ChunksExact;

use crate::image_pipeline::common::error::{FrameError, PipelineError, Result};
use crate::image_pipeline::raw::packing::packed_row_bytes;

/// Iterator over the pixel-carrying part of each packed row, top to bottom.
#[derive(Debug, Clone)]
pub struct PackedRows<'a> {
    rows: ChunksExact<'a, u8>,
    row_bytes: usize,
}

impl<'a> Iterator for PackedRows<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| &row[..self.row_bytes])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for PackedRows<'_> {}

/// Splits `data` into `height` rows of `stride` bytes and trims the padding.
pub fn strip_row_padding(
    data: &[u8],
    width: usize,
    height: usize,
    stride: usize,
) -> Result<PackedRows<'_>> {
    if width == 0 || height == 0 {
        return Err(PipelineError::InvalidDimensions(width, height));
    }

    let row_bytes = packed_row_bytes(width);
    if stride < row_bytes {
        return Err(FrameError::StrideTooSmall { stride, min: row_bytes, width }.into());
    }

    let expected = stride
        .checked_mul(height)
        .ok_or(PipelineError::InvalidDimensions(width, height))?;
    if data.len() != expected {
        return Err(FrameError::BufferLength { expected, actual: data.len() }.into());
    }

    Ok(PackedRows {
        rows: data.chunks_exact(stride),
        row_bytes,
    })
}
