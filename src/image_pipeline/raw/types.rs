//! Packed and unpacked RAW frame types

use crate::image_pipeline::common::error::{FrameError, Result};
use crate::image_pipeline::raw::packing::{RAW10_MAX, aligned_row_bytes, packed_row_bytes};

/// A packed 10-bit frame as dumped by the capture subsystem.
///
/// Borrowed and read-only: the decoder never mutates the persisted bytes.
#[derive(Debug, Clone, Copy)]
pub struct PackedFrame<'a> {
    /// Width of the frame in pixels
    pub width: usize,
    /// Height of the frame in pixels
    pub height: usize,
    /// Byte distance between the starts of two consecutive rows
    pub stride: usize,
    /// Packed bytes, `stride * height` long
    pub data: &'a [u8],
}

impl<'a> PackedFrame<'a> {
    pub fn new(width: usize, height: usize, stride: usize, data: &'a [u8]) -> Self {
        Self { width, height, stride, data }
    }

    /// Builds a frame whose stride is derived from the buffer length.
    ///
    /// The capture bus only tells us the total size, so every row is assumed
    /// to carry the same amount of padding. The derived stride must be one the
    /// receiver can produce: the dense row, or the row rounded up to
    /// `alignment`. Anything else means bytes were lost or added.
    pub fn with_inferred_stride(
        width: usize,
        height: usize,
        alignment: usize,
        data: &'a [u8],
    ) -> Result<Self> {
        if height == 0 || data.len() % height != 0 {
            return Err(FrameError::UnevenRows { len: data.len(), height }.into());
        }

        let stride = data.len() / height;
        let dense = packed_row_bytes(width);
        let aligned = aligned_row_bytes(width, alignment);
        if stride != dense && stride != aligned {
            return Err(FrameError::UnexpectedStride { stride, dense, aligned }.into());
        }
        Ok(Self::new(width, height, stride, data))
    }

    /// Smallest legal stride for this width.
    pub fn min_stride(&self) -> usize {
        packed_row_bytes(self.width)
    }

    /// Alignment bytes at the end of each row (zero when the stride is too small).
    pub fn padding_per_row(&self) -> usize {
        self.stride.saturating_sub(self.min_stride())
    }
}

/// Dense single-channel Bayer plane, one sample per photosite in readout order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedPlane {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Samples, row-major, top-to-bottom and left-to-right
    pub data: Vec<u16>,
    /// Significant bits per sample (10 for packed RAW10 input)
    pub bits_per_sample: u32,
}

impl UnpackedPlane {
    pub fn get(&self, row: usize, col: usize) -> Option<u16> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[u16]> {
        if row >= self.height {
            return None;
        }
        self.data.get(row * self.width..(row + 1) * self.width)
    }

    pub fn stats(&self) -> PlaneStats {
        PlaneStats::from_samples(&self.data, RAW10_MAX)
    }
}

/// Sample statistics, the same diagnostics the capture tool stored next to each dump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneStats {
    pub min: u16,
    pub max: u16,
    pub mean: f64,
    /// Samples sitting at the ADC ceiling
    pub saturated: usize,
    pub count: usize,
}

impl PlaneStats {
    pub fn from_samples(samples: &[u16], ceiling: u16) -> Self {
        if samples.is_empty() {
            return Self { min: 0, max: 0, mean: 0.0, saturated: 0, count: 0 };
        }

        let mut min = u16::MAX;
        let mut max = 0;
        let mut sum = 0u64;
        let mut saturated = 0;
        for &s in samples {
            min = min.min(s);
            max = max.max(s);
            sum += u64::from(s);
            if s >= ceiling {
                saturated += 1;
            }
        }

        Self {
            min,
            max,
            mean: sum as f64 / samples.len() as f64,
            saturated,
            count: samples.len(),
        }
    }
}
