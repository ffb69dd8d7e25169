//! Pipeline conversions module
//!
//! Single-frame RAW10 → TIFF conversion and the directory batch around it.

mod raw_to_tiff;
mod batch;
mod timing;

#[cfg(test)]
mod tests;

pub use raw_to_tiff::{RawToTiffPipeline, OUTPUT_BITS};
pub use batch::{BatchProcessor, BatchReport, FileFailure, ProcessedFile, OUTPUT_EXTENSION};
pub use timing::{PipelineTimings, StepTiming, Timer};
