//! Image processing pipeline module
//!
//! Packed RAW10 decoding, colour reconstruction, tone mapping and TIFF
//! output, plus the batch orchestration that ties them together.

pub mod raw;
pub mod debayer;
pub mod tone;
pub mod tiff;
pub mod config;
pub mod conversions;
pub mod common;

pub use common::{
    FrameError,
    PipelineError,
    Result,
};

pub use raw::{
    decode,
    PackedFrame,
    PackedRaw10Reader,
    PlaneStats,
    RawFrameReader,
    UnpackedPlane,
};

pub use debayer::{
    BayerPattern,
    ColorImage,
    CpuDebayer,
    DemosaicAlgorithm,
    Demosaicer,
};

pub use tone::{
    rescale,
    ToneCurve,
    TransferFunction,
};

pub use self::tiff::{
    TiffCompression,
    TiffOptions,
    TiffWriter,
    StandardTiffWriter,
};

pub use config::{ProcessingConfig, ProcessingConfigBuilder};

pub use conversions::{
    BatchProcessor,
    BatchReport,
    PipelineTimings,
    RawToTiffPipeline,
};
