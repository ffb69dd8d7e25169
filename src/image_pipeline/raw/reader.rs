use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::types::UnpackedPlane;

/// Turns the bytes of one persisted frame into a Bayer plane.
pub trait RawFrameReader {
    fn read_raw(&self, data: &[u8]) -> Result<UnpackedPlane>;
}
