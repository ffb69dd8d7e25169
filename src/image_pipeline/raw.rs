//! RAW frame decoding module
//!
//! Packed RAW10 unpacking, row padding removal and frame assembly.

pub mod packing;
pub mod rows;
pub mod decoder;
mod reader;
mod packed_reader;
pub mod types;

pub use packing::{
    aligned_row_bytes, pack_frame, pack_raw10, packed_row_bytes, unpack_raw10, DEFAULT_STRIDE_ALIGNMENT,
    RAW10_MAX,
};
pub use rows::{strip_row_padding, PackedRows};
pub use decoder::decode;
pub use reader::RawFrameReader;
pub use packed_reader::PackedRaw10Reader;
pub use types::{PackedFrame, PlaneStats, UnpackedPlane};
