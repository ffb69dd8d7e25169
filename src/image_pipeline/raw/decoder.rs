//! Packed frame → Bayer plane.

use tracing::debug;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::packing::{RAW10_BITS, unpack_raw10_into};
use crate::image_pipeline::raw::rows::strip_row_padding;
use crate::image_pipeline::raw::types::{PackedFrame, UnpackedPlane};

/// Decodes a packed RAW10 frame into one 10-bit sample per photosite.
///
/// Rows are emitted in readout order (top to bottom, left to right), which is
/// what keeps each sample aligned with its colour filter. Pure: the same
/// frame always produces the same plane.
pub fn decode(frame: &PackedFrame<'_>) -> Result<UnpackedPlane> {
    let rows = strip_row_padding(frame.data, frame.width, frame.height, frame.stride)?;
    debug!(
        width = frame.width,
        height = frame.height,
        stride = frame.stride,
        padding = frame.padding_per_row(),
        "Decoding RAW10 frame"
    );

    let mut data = Vec::with_capacity(frame.width * frame.height);
    for (index, row) in rows.enumerate() {
        unpack_raw10_into(row, &mut data)?;
        // The last group of a row may carry samples past the declared width.
        data.truncate((index + 1) * frame.width);
    }

    Ok(UnpackedPlane {
        width: frame.width,
        height: frame.height,
        data,
        bits_per_sample: RAW10_BITS,
    })
}
