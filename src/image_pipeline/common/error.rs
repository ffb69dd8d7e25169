use thiserror::Error;

/// Structural defects in a packed frame. Fatal to the frame, never patched up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("packed length {len} is not a multiple of 5 bytes")]
    PackedLengthMisaligned { len: usize },

    #[error("row stride {stride} is below the {min} bytes required for {width} pixels")]
    StrideTooSmall { stride: usize, min: usize, width: usize },

    #[error("buffer holds {actual} bytes, expected {expected} (stride x height)")]
    BufferLength { expected: usize, actual: usize },

    #[error("{len} bytes cannot be split evenly into {height} rows")]
    UnevenRows { len: usize, height: usize },

    #[error("inferred stride {stride} is neither the dense row ({dense} bytes) nor the aligned row ({aligned} bytes)")]
    UnexpectedStride { stride: usize, dense: usize, aligned: usize },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] FrameError),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("Demosaic failed: {0}")]
    DemosaicError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Bit depth mismatch: expected {expected}-bit samples, got {actual}-bit")]
    BitDepthMismatch { expected: u32, actual: u32 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn is_malformed_frame(&self) -> bool {
        matches!(self, PipelineError::MalformedFrame(_))
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
