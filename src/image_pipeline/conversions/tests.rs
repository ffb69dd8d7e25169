use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use crate::image_pipeline::common::error::{FrameError, PipelineError, Result};
use crate::image_pipeline::config::ProcessingConfig;
use crate::image_pipeline::conversions::{BatchProcessor, RawToTiffPipeline};
use crate::image_pipeline::debayer::{BayerPattern, ColorImage};
use crate::image_pipeline::raw::{PackedRaw10Reader, RawFrameReader, UnpackedPlane, pack_frame};
use crate::image_pipeline::tiff::{TiffOptions, TiffWriter};
use crate::image_pipeline::tone::rescale;

struct MockReader {
    should_fail: bool,
    mock_data: Option<UnpackedPlane>,
}

impl RawFrameReader for MockReader {
    fn read_raw(&self, _data: &[u8]) -> Result<UnpackedPlane> {
        if self.should_fail {
            return Err(FrameError::PackedLengthMisaligned { len: 7 }.into());
        }
        Ok(self.mock_data.clone().unwrap_or(UnpackedPlane {
            width: 4,
            height: 2,
            data: vec![512; 8],
            bits_per_sample: 10,
        }))
    }
}

#[derive(Default)]
struct MockWriter {
    should_fail: bool,
    written_data: Arc<Mutex<Vec<ColorImage>>>,
}

impl TiffWriter for MockWriter {
    fn write_rgb_tiff(&self, image: &ColorImage, output: &mut dyn Write, _options: &TiffOptions) -> Result<()> {
        if self.should_fail {
            return Err(PipelineError::EncodeError("Mock encode error".to_string()));
        }
        output.write_all(b"TIFF")?;
        self.written_data.lock().unwrap().push(image.clone());
        Ok(())
    }
}

/// Stand-in for colour reconstruction: copies each photosite into all three channels.
fn grey_demosaic(plane: &UnpackedPlane, _pattern: BayerPattern) -> Result<ColorImage> {
    Ok(ColorImage {
        width: plane.width,
        height: plane.height,
        data: plane.data.iter().flat_map(|&v| [v, v, v]).collect(),
        bits_per_sample: plane.bits_per_sample,
    })
}

fn linear_config() -> ProcessingConfig {
    ProcessingConfig::builder().geometry(4, 2).gamma(false).build()
}

#[test]
fn test_successful_conversion() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let reader = MockReader { should_fail: false, mock_data: None };
    let writer = MockWriter { should_fail: false, written_data: written.clone() };

    let pipeline = RawToTiffPipeline::with_custom(reader, grey_demosaic, writer, linear_config()).unwrap();

    let mut output = Cursor::new(Vec::new());
    let timings = pipeline.convert(b"fake raw data", &mut output).unwrap();

    assert_eq!(output.into_inner(), b"TIFF");
    let written = written.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].bits_per_sample, 16);
    assert!(written[0].data.iter().all(|&v| v == 32800));
    for step in ["decode_raw", "demosaic", "tone_map", "encode_tiff"] {
        assert!(timings.get_step(step).is_some(), "missing step {step}");
    }
}

#[test]
fn test_reader_failure() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let reader = MockReader { should_fail: true, mock_data: None };
    let writer = MockWriter { should_fail: false, written_data: written.clone() };

    let pipeline = RawToTiffPipeline::with_custom(reader, grey_demosaic, writer, linear_config()).unwrap();

    let mut output = Cursor::new(Vec::new());
    let result = pipeline.convert(b"fake raw data", &mut output);

    assert!(result.unwrap_err().is_malformed_frame());
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_writer_failure() {
    let reader = MockReader { should_fail: false, mock_data: None };
    let writer = MockWriter { should_fail: true, ..MockWriter::default() };

    let pipeline = RawToTiffPipeline::with_custom(reader, grey_demosaic, writer, linear_config()).unwrap();

    let mut output = Cursor::new(Vec::new());
    let result = pipeline.convert(b"fake raw data", &mut output);

    assert!(matches!(result.unwrap_err(), PipelineError::EncodeError(_)));
}

#[test]
fn test_dimension_validation_failure() {
    let reader = MockReader {
        should_fail: false,
        mock_data: Some(UnpackedPlane {
            width: 100,
            height: 100,
            data: vec![0u16; 100],
            bits_per_sample: 10,
        }),
    };

    let pipeline = RawToTiffPipeline::with_custom(reader, grey_demosaic, MockWriter::default(), linear_config()).unwrap();

    let result = pipeline.convert(b"fake raw data", &mut Cursor::new(Vec::new()));
    assert!(matches!(result.unwrap_err(), PipelineError::InvalidDimensions(100, 100)));
}

#[test]
fn test_demosaic_geometry_is_checked() {
    let shrink = |plane: &UnpackedPlane, pattern: BayerPattern| -> Result<ColorImage> {
        let mut image = grey_demosaic(plane, pattern)?;
        image.width -= 1;
        Ok(image)
    };
    let reader = MockReader { should_fail: false, mock_data: None };
    let pipeline = RawToTiffPipeline::with_custom(reader, shrink, MockWriter::default(), linear_config()).unwrap();

    let result = pipeline.convert(b"fake raw data", &mut Cursor::new(Vec::new()));
    assert!(matches!(result.unwrap_err(), PipelineError::DemosaicError(_)));
}

#[test]
fn test_pattern_reaches_demosaicer() {
    let seen = Arc::new(Mutex::new(None));
    let seen_by_stub = seen.clone();
    let stub = move |plane: &UnpackedPlane, pattern: BayerPattern| {
        *seen_by_stub.lock().unwrap() = Some(pattern);
        grey_demosaic(plane, pattern)
    };

    let config = ProcessingConfig::builder().geometry(4, 2).pattern(BayerPattern::Gbrg).build();
    let reader = MockReader { should_fail: false, mock_data: None };
    let pipeline = RawToTiffPipeline::with_custom(reader, stub, MockWriter::default(), config).unwrap();
    pipeline.convert(b"fake raw data", &mut Cursor::new(Vec::new())).unwrap();

    assert_eq!(*seen.lock().unwrap(), Some(BayerPattern::Gbrg));
}

#[test]
fn test_gamma_toggle_is_a_bypass() {
    let plane = UnpackedPlane {
        width: 4,
        height: 2,
        data: vec![0, 1, 2, 100, 511, 512, 1000, 1023],
        bits_per_sample: 10,
    };

    let develop = |gamma: bool| {
        let config = ProcessingConfig::builder().geometry(4, 2).gamma(gamma).build();
        let reader = MockReader { should_fail: false, mock_data: Some(plane.clone()) };
        let pipeline = RawToTiffPipeline::with_custom(reader, grey_demosaic, MockWriter::default(), config).unwrap();
        pipeline.develop(b"", &mut Default::default()).unwrap()
    };

    let linear = develop(false);
    let expected: Vec<u16> = plane.data.iter().flat_map(|&v| [rescale(v, 10, 16); 3]).collect();
    assert_eq!(linear.data, expected);

    let encoded = develop(true);
    assert_ne!(encoded.data, expected);
    assert_eq!(encoded.data[0], 0);
    assert_eq!(encoded.data[encoded.data.len() - 1], 65535);
}

#[test]
fn test_real_reader_with_stub_demosaic() {
    let packed = pack_frame(&[512; 8], 4, 5, 0);
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter { should_fail: false, written_data: written.clone() };

    let pipeline = RawToTiffPipeline::with_custom(
        PackedRaw10Reader::new(4, 2, None),
        grey_demosaic,
        writer,
        linear_config(),
    ).unwrap();
    pipeline.convert(&packed, &mut Cursor::new(Vec::new())).unwrap();

    let written = written.lock().unwrap();
    assert_eq!(written[0].data.len(), 24);
    let mid_scale = (512.0f64 * 65535.0 / 1023.0).round() as u16;
    assert!(written[0].data.iter().all(|&v| v == mid_scale));
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let config = ProcessingConfig::builder().geometry(4, 2).jobs(0).build();
    let reader = MockReader { should_fail: false, mock_data: None };
    assert!(matches!(
        RawToTiffPipeline::with_custom(reader, grey_demosaic, MockWriter::default(), config),
        Err(PipelineError::Config(_))
    ));
}

#[test]
fn test_output_name_keeps_inner_dots() {
    let config = ProcessingConfig::builder().geometry(4, 2).output_dir("/out").build();
    let batch = BatchProcessor::new(config).unwrap();
    assert_eq!(
        batch.output_path_for(std::path::Path::new("/in/imx335_20240101_120000.v2.raw")),
        std::path::PathBuf::from("/out/imx335_20240101_120000.v2.tiff")
    );
}
