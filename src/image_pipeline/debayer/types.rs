//! Types for debayering operations

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// RGB image data after debayering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// RGB pixel data interleaved [R, G, B, R, G, B, ...]
    pub data: Vec<u16>,
    /// Significant bits per sample (10 straight out of demosaic, 16 after tone mapping)
    pub bits_per_sample: u32,
}

impl ColorImage {
    pub fn pixel(&self, row: usize, col: usize) -> Option<[u16; 3]> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let i = (row * self.width + col) * 3;
        match self.data.get(i..i + 3) {
            Some(&[r, g, b]) => Some([r, g, b]),
            _ => None,
        }
    }
}

/// Colour filter arrangement of the top-left 2x2 cell, read row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BayerPattern {
    #[default]
    Rggb,
    Bggr,
    Grbg,
    Gbrg,
}

impl BayerPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            BayerPattern::Rggb => "RGGB",
            BayerPattern::Bggr => "BGGR",
            BayerPattern::Grbg => "GRBG",
            BayerPattern::Gbrg => "GBRG",
        }
    }
}

/// Interpolation used by the demosaic backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DemosaicAlgorithm {
    /// Each pixel keeps only its own channel
    None,
    #[serde(rename = "nearest")]
    #[value(name = "nearest")]
    NearestNeighbour,
    #[default]
    Linear,
    Cubic,
}

impl DemosaicAlgorithm {
    /// Smallest width and height the backend will interpolate.
    pub fn min_dimension(self) -> usize {
        match self {
            DemosaicAlgorithm::Cubic => 4,
            _ => 2,
        }
    }
}
