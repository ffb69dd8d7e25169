//! Display transfer functions on normalised [0, 1] samples.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferFunction {
    /// IEC 61966-2-1 piecewise curve
    #[default]
    Srgb,
    /// Pure power law `x^(1/exponent)`
    Power(f64),
}

const SRGB_LINEAR_CUTOFF: f64 = 0.0031308;

impl TransferFunction {
    /// Encodes a linear sample. Input outside [0, 1] is clamped first.
    pub fn encode(self, linear: f64) -> f64 {
        let x = linear.clamp(0.0, 1.0);
        match self {
            TransferFunction::Srgb => {
                if x > SRGB_LINEAR_CUTOFF {
                    1.055 * x.powf(1.0 / 2.4) - 0.055
                } else {
                    12.92 * x
                }
            }
            TransferFunction::Power(exponent) => x.powf(1.0 / exponent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_end_points() {
        assert_eq!(TransferFunction::Srgb.encode(0.0), 0.0);
        assert!((TransferFunction::Srgb.encode(1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn srgb_linear_toe() {
        let x = 0.002;
        assert!((TransferFunction::Srgb.encode(x) - 12.92 * x).abs() < 1e-12);
    }

    #[test]
    fn srgb_mid_grey() {
        // 18% grey encodes to roughly 46%.
        let y = TransferFunction::Srgb.encode(0.18);
        assert!((y - 0.4614).abs() < 1e-3, "got {y}");
    }

    #[test]
    fn power_law() {
        let y = TransferFunction::Power(2.2).encode(0.5);
        assert!((y - 0.5f64.powf(1.0 / 2.2)).abs() < 1e-12);
    }
}
