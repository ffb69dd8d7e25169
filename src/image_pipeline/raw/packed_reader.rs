//! Reader for headerless RAW10 dumps.
//!
//! The dump carries no metadata: geometry comes from configuration and the
//! row stride is either configured or derived from the file size.

use tracing::debug;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::decoder::decode;
use crate::image_pipeline::raw::packing::DEFAULT_STRIDE_ALIGNMENT;
use crate::image_pipeline::raw::reader::RawFrameReader;
use crate::image_pipeline::raw::types::{PackedFrame, UnpackedPlane};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedRaw10Reader {
    pub width: usize,
    pub height: usize,
    /// `None` infers the stride as `len / height`.
    pub stride: Option<usize>,
    /// Row alignment an inferred stride must agree with
    pub alignment: usize,
}

impl PackedRaw10Reader {
    pub fn new(width: usize, height: usize, stride: Option<usize>) -> Self {
        Self { width, height, stride, alignment: DEFAULT_STRIDE_ALIGNMENT }
    }

    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    /// Wraps `data` in a [`PackedFrame`] using the configured geometry.
    pub fn frame<'a>(&self, data: &'a [u8]) -> Result<PackedFrame<'a>> {
        match self.stride {
            Some(stride) => Ok(PackedFrame::new(self.width, self.height, stride, data)),
            None => PackedFrame::with_inferred_stride(self.width, self.height, self.alignment, data),
        }
    }
}

impl RawFrameReader for PackedRaw10Reader {
    fn read_raw(&self, data: &[u8]) -> Result<UnpackedPlane> {
        debug!("Reading RAW10 dump, {} bytes", data.len());
        let frame = self.frame(data)?;
        decode(&frame)
    }
}
