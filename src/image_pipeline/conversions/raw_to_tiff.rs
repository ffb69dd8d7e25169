use tracing::{debug, info, instrument};
use std::io::Write;
use std::path::Path;

use crate::image_pipeline::{
    common::error::{PipelineError, Result},
    config::ProcessingConfig,
    conversions::timing::PipelineTimings,
    debayer::{ColorImage, CpuDebayer, Demosaicer},
    raw::{PackedRaw10Reader, RawFrameReader, UnpackedPlane, packing::RAW10_BITS},
    tiff::{StandardTiffWriter, TiffWriter},
    tone::ToneCurve,
};

/// Output depth of every written image.
pub const OUTPUT_BITS: u32 = 16;

/// decode → demosaic → tone map → TIFF, for one frame at a time.
pub struct RawToTiffPipeline<R: RawFrameReader, D: Demosaicer, W: TiffWriter> {
    reader: R,
    demosaicer: D,
    writer: W,
    tone: ToneCurve,
    config: ProcessingConfig,
}

impl RawToTiffPipeline<PackedRaw10Reader, CpuDebayer, StandardTiffWriter> {
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        let reader = PackedRaw10Reader::new(config.width, config.height, config.stride)
            .with_alignment(config.stride_alignment);
        let demosaicer = CpuDebayer::new(config.demosaic);
        Self::with_custom(reader, demosaicer, StandardTiffWriter, config)
    }
}

impl<R: RawFrameReader, D: Demosaicer, W: TiffWriter> RawToTiffPipeline<R, D, W> {
    pub fn with_custom(reader: R, demosaicer: D, writer: W, config: ProcessingConfig) -> Result<Self> {
        config.validate()?;
        let tone = ToneCurve::new(RAW10_BITS, OUTPUT_BITS, config.active_transfer())?;
        Ok(Self {
            reader,
            demosaicer,
            writer,
            tone,
            config,
        })
    }

    fn validate_dimensions(&self, plane: &UnpackedPlane) -> Result<()> {
        if plane.width == 0 || plane.height == 0 || plane.data.len() != plane.width * plane.height {
            return Err(PipelineError::InvalidDimensions(plane.width, plane.height));
        }
        Ok(())
    }

    fn validate_reconstruction(&self, plane: &UnpackedPlane, image: &ColorImage) -> Result<()> {
        if image.width != plane.width
            || image.height != plane.height
            || image.data.len() != plane.width * plane.height * 3
        {
            return Err(PipelineError::DemosaicError(format!(
                "backend returned {}x{} ({} samples) for a {}x{} plane",
                image.width, image.height, image.data.len(), plane.width, plane.height
            )));
        }
        Ok(())
    }

    /// Runs everything up to, but not including, encoding.
    pub fn develop(&self, input_data: &[u8], timings: &mut PipelineTimings) -> Result<ColorImage> {
        let plane = {
            let _span = tracing::info_span!("decode_raw").entered();
            timings.time("decode_raw", || self.reader.read_raw(input_data))?
        };

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = plane.width,
                height = plane.height
            ).entered();
            self.validate_dimensions(&plane)?;
        }

        let linear = {
            let _span = tracing::info_span!("demosaic", pattern = self.config.pattern.as_str()).entered();
            timings.time("demosaic", || self.demosaicer.demosaic(&plane, self.config.pattern))?
        };
        self.validate_reconstruction(&plane, &linear)?;

        let _span = tracing::info_span!("tone_map", gamma = self.config.gamma).entered();
        timings.time("tone_map", || self.tone.apply(&linear))
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<PipelineTimings> {
        debug!("Starting RAW10 to TIFF conversion");
        let mut timings = PipelineTimings::new();

        let image = self.develop(input_data, &mut timings)?;

        {
            let _span = tracing::info_span!("encode_tiff").entered();
            let options = self.config.tiff_options();
            timings.time("encode_tiff", || self.writer.write_rgb_tiff(&image, output, &options))?;
        }

        timings.log_summary();
        debug!(
            width = image.width,
            height = image.height,
            "Conversion complete in {:.3}ms",
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok(timings)
    }

    /// Converts one file. The output appears complete or not at all.
    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<PipelineTimings> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                PipelineError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        let output_dir = output_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        // Staged next to the destination so the final rename stays on one filesystem.
        let mut staged = {
            let _span = tracing::info_span!("create_output_file").entered();
            tempfile::Builder::new()
                .prefix(".partial-")
                .suffix(".tiff")
                .tempfile_in(output_dir)
                .map_err(|e| {
                    PipelineError::OutputWriteError(format!("{}: {}", output_path.display(), e))
                })?
        };

        let timings = self.convert(&input_data, &mut staged)?;

        staged.persist(output_path).map_err(|e| {
            PipelineError::OutputWriteError(format!("{}: {}", output_path.display(), e.error))
        })?;

        Ok(timings)
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    pub fn tone_curve(&self) -> &ToneCurve {
        &self.tone
    }
}
