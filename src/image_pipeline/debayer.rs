//! Debayering module for converting Bayer pattern RAW images to RGB

pub mod cpu_debayer;
mod demosaicer;
pub mod types;

pub use cpu_debayer::CpuDebayer;
pub use demosaicer::Demosaicer;
pub use types::{BayerPattern, ColorImage, DemosaicAlgorithm};
