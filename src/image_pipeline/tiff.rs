//! TIFF writing module
//!
//! This module provides 16-bit RGB TIFF writing with various compression options.

mod writer;
mod standard_tiff_writer;
pub mod types;

pub use writer::TiffWriter;
pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{TiffCompression, TiffOptions};
