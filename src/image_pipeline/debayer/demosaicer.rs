use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::debayer::types::{BayerPattern, ColorImage};
use crate::image_pipeline::raw::types::UnpackedPlane;

/// Colour reconstruction backend.
///
/// Implementations receive the plane exactly as decoded and must return an
/// image of the same geometry. Plain closures work too, which is how tests
/// stub the interpolation out.
pub trait Demosaicer {
    fn demosaic(&self, plane: &UnpackedPlane, pattern: BayerPattern) -> Result<ColorImage>;
}

impl<F> Demosaicer for F
where
    F: Fn(&UnpackedPlane, BayerPattern) -> Result<ColorImage>,
{
    fn demosaic(&self, plane: &UnpackedPlane, pattern: BayerPattern) -> Result<ColorImage> {
        self(plane, pattern)
    }
}
