use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::{debug, info};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::debayer::demosaicer::Demosaicer;
use crate::image_pipeline::debayer::types::{BayerPattern, ColorImage, DemosaicAlgorithm};
use crate::image_pipeline::raw::types::UnpackedPlane;

/// CPU demosaic backed by the `bayer` crate.
///
/// Samples go in as 16-bit little-endian words and come back at the same
/// scale, so a 10-bit plane yields a 10-bit RGB image.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuDebayer {
    algorithm: DemosaicAlgorithm,
}

impl CpuDebayer {
    pub fn new(algorithm: DemosaicAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> DemosaicAlgorithm {
        self.algorithm
    }
}

fn cfa(pattern: BayerPattern) -> CFA {
    match pattern {
        BayerPattern::Rggb => CFA::RGGB,
        BayerPattern::Bggr => CFA::BGGR,
        BayerPattern::Grbg => CFA::GRBG,
        BayerPattern::Gbrg => CFA::GBRG,
    }
}

fn interpolation(algorithm: DemosaicAlgorithm) -> Demosaic {
    match algorithm {
        DemosaicAlgorithm::None => Demosaic::None,
        DemosaicAlgorithm::NearestNeighbour => Demosaic::NearestNeighbour,
        DemosaicAlgorithm::Linear => Demosaic::Linear,
        DemosaicAlgorithm::Cubic => Demosaic::Cubic,
    }
}

impl Demosaicer for CpuDebayer {
    fn demosaic(&self, plane: &UnpackedPlane, pattern: BayerPattern) -> Result<ColorImage> {
        let width = plane.width;
        let height = plane.height;
        info!("Starting CPU debayering for image {}x{}", width, height);

        if plane.data.len() != width * height {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        let min = self.algorithm.min_dimension();
        if width < min || height < min {
            return Err(PipelineError::DemosaicError(format!(
                "{:?} needs at least {min}x{min} pixels, got {width}x{height}",
                self.algorithm
            )));
        }

        // Always hand the bayer crate 16-bit words; 10-bit samples do not fit in 8.
        let bayer_bytes: Vec<u8> = plane.data.iter()
            .flat_map(|&val| val.to_le_bytes())
            .collect();

        let bytes_per_pixel = 2;
        let mut output_buf = vec![0u8; width * height * 3 * bytes_per_pixel];

        debug!(
            "Running demosaic with CFA={}, algo={:?}, input bytes: {}, output buffer: {}",
            pattern.as_str(), self.algorithm, bayer_bytes.len(), output_buf.len()
        );

        {
            let mut cursor = Cursor::new(&bayer_bytes[..]);
            let mut output_raster = RasterMut::new(
                width,
                height,
                RasterDepth::Depth16,
                &mut output_buf,
            );

            bayer::run_demosaic(
                &mut cursor,
                BayerDepth::Depth16LE,
                cfa(pattern),
                interpolation(self.algorithm),
                &mut output_raster,
            ).map_err(|e| PipelineError::DemosaicError(format!("{:?}", e)))?;
        }

        // The output raster stores host-endian u16 words.
        let data: Vec<u16> = output_buf.chunks_exact(bytes_per_pixel)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]))
            .collect();

        Ok(ColorImage {
            width,
            height,
            data,
            bits_per_sample: plane.bits_per_sample,
        })
    }
}
