//! Tone pipeline: bit-depth rescale plus optional display transfer.

mod curve;
pub mod transfer;

pub use curve::{rescale, ToneCurve};
pub use transfer::TransferFunction;
