use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::debayer::types::ColorImage;
use crate::image_pipeline::tiff::types::TiffOptions;

pub trait TiffWriter {
    fn write_rgb_tiff(&self, image: &ColorImage, output: &mut dyn Write, options: &TiffOptions) -> Result<()>;
}
