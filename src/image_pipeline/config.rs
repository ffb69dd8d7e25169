//! Batch processing configuration.
//!
//! Read once per run and passed explicitly; nothing in the pipeline consults
//! ambient state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::debayer::types::{BayerPattern, DemosaicAlgorithm};
use crate::image_pipeline::raw::packing::{DEFAULT_STRIDE_ALIGNMENT, aligned_row_bytes, packed_row_bytes};
use crate::image_pipeline::tiff::types::{TiffCompression, TiffOptions};
use crate::image_pipeline::tone::TransferFunction;

/// IMX335 full-resolution readout.
pub const DEFAULT_WIDTH: usize = 2592;
pub const DEFAULT_HEIGHT: usize = 1944;
/// Row stride the Pi receiver produces at full resolution.
pub const DEFAULT_STRIDE: usize = 3264;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Directory scanned for packed frames
    pub input_dir: PathBuf,
    /// Directory receiving the TIFFs, created if absent
    pub output_dir: PathBuf,
    /// Extension (without the dot) of files treated as frames
    pub input_extension: String,
    /// Frame width in pixels
    pub width: usize,
    /// Frame height in pixels
    pub height: usize,
    /// Bytes per packed row; inferred from the file size when absent
    pub stride: Option<usize>,
    /// Row alignment of the capture receiver, used to check inferred strides
    pub stride_alignment: usize,
    pub pattern: BayerPattern,
    pub demosaic: DemosaicAlgorithm,
    /// Apply the display transfer function after rescaling
    pub gamma: bool,
    pub transfer: TransferFunction,
    pub compression: TiffCompression,
    /// Predictor value for compression (typically 2 for horizontal differencing)
    pub predictor: Option<u16>,
    /// Worker threads for the batch loop, 1 runs sequentially
    pub jobs: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("processed"),
            input_extension: "raw".to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            stride: Some(DEFAULT_STRIDE),
            stride_alignment: DEFAULT_STRIDE_ALIGNMENT,
            pattern: BayerPattern::Rggb,
            demosaic: DemosaicAlgorithm::Linear,
            gamma: true,
            transfer: TransferFunction::Srgb,
            compression: TiffCompression::None,
            predictor: None,
            jobs: 1,
        }
    }
}

impl ProcessingConfig {
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder::default()
    }

    /// Loads and validates a TOML file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: ProcessingConfig =
            toml::from_str(content).map_err(|e| PipelineError::Config(e.to_string()))?;
        let keys: toml::Table =
            toml::from_str(content).map_err(|e| PipelineError::Config(e.to_string()))?;
        // The default stride only fits the default geometry.
        if !keys.contains_key("stride") && (config.width, config.height) != (DEFAULT_WIDTH, DEFAULT_HEIGHT) {
            config.stride = None;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::InvalidDimensions(self.width, self.height));
        }
        let min = self.demosaic.min_dimension();
        if self.width < min || self.height < min {
            return Err(PipelineError::Config(format!(
                "{}x{} is below the {min}x{min} minimum of {:?} demosaic",
                self.width, self.height, self.demosaic
            )));
        }
        if self.stride_alignment == 0 {
            return Err(PipelineError::Config("stride alignment must be at least 1".to_string()));
        }
        if let Some(stride) = self.stride {
            let min = packed_row_bytes(self.width);
            if stride < min {
                return Err(PipelineError::Config(format!(
                    "stride {stride} is below the {min} bytes a {}-pixel row needs",
                    self.width
                )));
            }
        }
        if self.jobs == 0 {
            return Err(PipelineError::Config("jobs must be at least 1".to_string()));
        }
        if self.input_extension.trim_start_matches('.').is_empty() {
            return Err(PipelineError::Config("input extension is empty".to_string()));
        }
        if let TransferFunction::Power(exponent) = self.transfer {
            if !(exponent.is_finite() && exponent > 0.0) {
                return Err(PipelineError::Config(format!(
                    "power transfer exponent must be positive, got {exponent}"
                )));
            }
        }
        Ok(())
    }

    /// Stride the receiver is expected to produce for this geometry.
    pub fn expected_stride(&self) -> usize {
        self.stride
            .unwrap_or_else(|| aligned_row_bytes(self.width, self.stride_alignment))
    }

    /// Transfer function to apply, `None` when gamma is disabled.
    pub fn active_transfer(&self) -> Option<TransferFunction> {
        self.gamma.then_some(self.transfer)
    }

    pub fn tiff_options(&self) -> TiffOptions {
        TiffOptions {
            compression: self.compression,
            predictor: self.predictor,
        }
    }

    /// True when `path` carries the configured frame extension (case-insensitive).
    pub fn matches_input(&self, path: &Path) -> bool {
        let wanted = self.input_extension.trim_start_matches('.');
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
    }
}

/// Builder for ProcessingConfig
#[derive(Default)]
pub struct ProcessingConfigBuilder {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    input_extension: Option<String>,
    width: Option<usize>,
    height: Option<usize>,
    stride: Option<Option<usize>>,
    stride_alignment: Option<usize>,
    pattern: Option<BayerPattern>,
    demosaic: Option<DemosaicAlgorithm>,
    gamma: Option<bool>,
    transfer: Option<TransferFunction>,
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
    jobs: Option<usize>,
}

impl ProcessingConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(dir.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn input_extension(mut self, extension: impl Into<String>) -> Self {
        self.input_extension = Some(extension.into());
        self
    }

    pub fn geometry(mut self, width: usize, height: usize) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn stride(mut self, stride: Option<usize>) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn stride_alignment(mut self, alignment: usize) -> Self {
        self.stride_alignment = Some(alignment);
        self
    }

    pub fn pattern(mut self, pattern: BayerPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn demosaic(mut self, algorithm: DemosaicAlgorithm) -> Self {
        self.demosaic = Some(algorithm);
        self
    }

    pub fn gamma(mut self, enable: bool) -> Self {
        self.gamma = Some(enable);
        self
    }

    pub fn transfer(mut self, transfer: TransferFunction) -> Self {
        self.transfer = Some(transfer);
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Fills unset fields from `base` instead of the defaults.
    ///
    /// A stride belongs to a geometry: setting new dimensions without a
    /// stride drops the base stride so it is inferred again.
    pub fn build_on(self, base: ProcessingConfig) -> ProcessingConfig {
        let geometry_changed = self.width.is_some() || self.height.is_some();
        let stride = match self.stride {
            Some(stride) => stride,
            None if geometry_changed => None,
            None => base.stride,
        };
        ProcessingConfig {
            input_dir: self.input_dir.unwrap_or(base.input_dir),
            output_dir: self.output_dir.unwrap_or(base.output_dir),
            input_extension: self.input_extension.unwrap_or(base.input_extension),
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            stride,
            stride_alignment: self.stride_alignment.unwrap_or(base.stride_alignment),
            pattern: self.pattern.unwrap_or(base.pattern),
            demosaic: self.demosaic.unwrap_or(base.demosaic),
            gamma: self.gamma.unwrap_or(base.gamma),
            transfer: self.transfer.unwrap_or(base.transfer),
            compression: self.compression.unwrap_or(base.compression),
            predictor: self.predictor.unwrap_or(base.predictor),
            jobs: self.jobs.unwrap_or(base.jobs),
        }
    }

    pub fn build(self) -> ProcessingConfig {
        self.build_on(ProcessingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_valid() {
        let config = ProcessingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.active_transfer(), Some(TransferFunction::Srgb));
        assert_eq!(config.stride, Some(DEFAULT_STRIDE));
        assert_eq!(aligned_row_bytes(config.width, config.stride_alignment), DEFAULT_STRIDE);
    }

    #[test]
    fn new_geometry_drops_inherited_stride() {
        let config = ProcessingConfig::builder().geometry(8, 4).build();
        assert_eq!(config.stride, None);
        assert_eq!(config.expected_stride(), 32);

        let config = ProcessingConfig::builder()
            .geometry(8, 4)
            .stride(Some(12))
            .build();
        assert_eq!(config.expected_stride(), 12);

        let config = ProcessingConfig::builder().jobs(2).build();
        assert_eq!(config.stride, Some(DEFAULT_STRIDE));
    }

    #[test]
    fn rejects_geometry_below_demosaic_minimum() {
        for (width, height) in [(1, 1), (2, 1), (1, 2)] {
            let config = ProcessingConfig::builder().geometry(width, height).build();
            assert!(matches!(config.validate(), Err(PipelineError::Config(_))), "{width}x{height}");
        }

        let linear = ProcessingConfig::builder().geometry(4, 2).build();
        assert!(linear.validate().is_ok());
        for (width, height) in [(4, 2), (3, 3), (5, 3)] {
            let cubic = ProcessingConfig::builder()
                .geometry(width, height)
                .demosaic(DemosaicAlgorithm::Cubic)
                .build();
            assert!(matches!(cubic.validate(), Err(PipelineError::Config(_))), "{width}x{height}");
        }
    }

    #[test]
    fn toml_geometry_without_stride_is_inferred() {
        let config = ProcessingConfig::from_toml("width = 8\nheight = 4").unwrap();
        assert_eq!(config.stride, None);

        let config = ProcessingConfig::from_toml("input_dir = \"/data\"").unwrap();
        assert_eq!(config.stride, Some(DEFAULT_STRIDE));
    }

    #[test]
    fn rejects_zero_alignment() {
        let err = ProcessingConfig::from_toml("stride_alignment = 0").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn config_builder() {
        let config = ProcessingConfig::builder()
            .geometry(4, 2)
            .stride(Some(7))
            .pattern(BayerPattern::Bggr)
            .gamma(false)
            .compression(TiffCompression::Lzw)
            .jobs(4)
            .build();

        assert_eq!((config.width, config.height), (4, 2));
        assert_eq!(config.stride, Some(7));
        assert_eq!(config.pattern, BayerPattern::Bggr);
        assert_eq!(config.active_transfer(), None);
        assert_eq!(config.tiff_options().compression, TiffCompression::Lzw);
        assert_eq!(config.jobs, 4);
        assert_eq!(config.input_extension, "raw");
    }

    #[test]
    fn parses_toml() {
        let config = ProcessingConfig::from_toml(
            r#"
            input_dir = "/home/user/Pictures"
            output_dir = "/home/user/Pictures/Processed"
            width = 2592
            height = 1944
            stride = 3264
            pattern = "bggr"
            demosaic = "nearest"
            transfer = { power = 2.2 }
            compression = "deflate-fast"
            "#,
        )
        .unwrap();

        assert_eq!(config.stride, Some(3264));
        assert_eq!(config.pattern, BayerPattern::Bggr);
        assert_eq!(config.demosaic, DemosaicAlgorithm::NearestNeighbour);
        assert_eq!(config.transfer, TransferFunction::Power(2.2));
        assert_eq!(config.compression, TiffCompression::DeflateFast);
        assert!(config.gamma);
    }

    #[test]
    fn rejects_short_stride() {
        let err = ProcessingConfig::from_toml("width = 8\nheight = 2\nstride = 9").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(ProcessingConfig::from_toml("widht = 8").is_err());
    }

    #[test]
    fn zero_dimensions_invalid() {
        let config = ProcessingConfig::builder().geometry(0, 10).build();
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidDimensions(0, 10))
        ));
    }

    #[test]
    fn extension_match_ignores_case() {
        let config = ProcessingConfig::builder().input_extension(".RAW").build();
        assert!(config.matches_input(Path::new("/tmp/imx335_20240101_120000.raw")));
        assert!(!config.matches_input(Path::new("/tmp/notes.txt")));
        assert!(!config.matches_input(Path::new("/tmp/raw")));
    }
}
