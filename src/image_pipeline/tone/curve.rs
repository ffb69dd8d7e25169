use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::debayer::types::ColorImage;
use crate::image_pipeline::tone::transfer::TransferFunction;

const MAX_BITS: u32 = 16;

fn max_code(bits: u32) -> u32 {
    (1u32 << bits) - 1
}

/// Linear rescale between bit depths, rounded half up.
///
/// A multiply rather than a shift, so full scale maps to full scale
/// (1023 → 65535, not 65472). Input above the input ceiling is clamped.
///
/// # Panics
///
/// Both depths must lie in `1..=16`. `bits_in == 0` divides by zero; debug
/// builds also assert the upper bound.
pub fn rescale(value: u16, bits_in: u32, bits_out: u32) -> u16 {
    debug_assert!(
        (1..=MAX_BITS).contains(&bits_in) && (1..=MAX_BITS).contains(&bits_out),
        "bit depths must be within 1..=16, got {bits_in} -> {bits_out}"
    );
    let max_in = u64::from(max_code(bits_in));
    let max_out = u64::from(max_code(bits_out));
    let v = u64::from(value).min(max_in);
    ((v * max_out + max_in / 2) / max_in) as u16
}

/// Per-sample tone mapping, precomputed over every input code.
#[derive(Debug, Clone)]
pub struct ToneCurve {
    bits_in: u32,
    bits_out: u32,
    transfer: Option<TransferFunction>,
    lut: Vec<u16>,
}

impl ToneCurve {
    /// `transfer: None` keeps the output linear.
    pub fn new(bits_in: u32, bits_out: u32, transfer: Option<TransferFunction>) -> Result<Self> {
        if bits_in == 0 || bits_out > MAX_BITS || bits_in > bits_out {
            return Err(PipelineError::Config(format!(
                "unsupported tone mapping {bits_in}-bit -> {bits_out}-bit"
            )));
        }
        if let Some(TransferFunction::Power(exponent)) = transfer {
            if !(exponent.is_finite() && exponent > 0.0) {
                return Err(PipelineError::Config(format!(
                    "power transfer exponent must be positive, got {exponent}"
                )));
            }
        }

        let max_in = max_code(bits_in);
        let max_out = f64::from(max_code(bits_out));
        let lut = (0..=max_in)
            .map(|code| match transfer {
                None => rescale(code as u16, bits_in, bits_out),
                Some(tf) => {
                    let encoded = tf.encode(f64::from(code) / f64::from(max_in));
                    (encoded * max_out).round().clamp(0.0, max_out) as u16
                }
            })
            .collect();

        Ok(Self { bits_in, bits_out, transfer, lut })
    }

    pub fn bits_in(&self) -> u32 {
        self.bits_in
    }

    pub fn bits_out(&self) -> u32 {
        self.bits_out
    }

    pub fn transfer(&self) -> Option<TransferFunction> {
        self.transfer
    }

    pub fn map(&self, value: u16) -> u16 {
        let index = usize::from(value).min(self.lut.len() - 1);
        self.lut[index]
    }

    /// Maps every channel of `image` independently.
    pub fn apply(&self, image: &ColorImage) -> Result<ColorImage> {
        if image.bits_per_sample != self.bits_in {
            return Err(PipelineError::BitDepthMismatch {
                expected: self.bits_in,
                actual: image.bits_per_sample,
            });
        }
        debug!(
            bits_in = self.bits_in,
            bits_out = self.bits_out,
            transfer = ?self.transfer,
            "Tone mapping {}x{} image", image.width, image.height
        );

        Ok(ColorImage {
            width: image.width,
            height: image.height,
            data: image.data.iter().map(|&v| self.map(v)).collect(),
            bits_per_sample: self.bits_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn image(data: Vec<u16>) -> ColorImage {
        ColorImage { width: data.len() / 3, height: 1, data, bits_per_sample: 10 }
    }

    #[test]
    fn rescale_covers_whole_depth_range() {
        assert_eq!(rescale(1, 1, 16), 65535);
        assert_eq!(rescale(65535, 16, 16), 65535);
        assert_eq!(rescale(1023, 10, 8), 255);
    }

    #[test]
    #[should_panic]
    fn rescale_rejects_zero_input_depth() {
        rescale(1, 0, 16);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "bit depths must be within 1..=16")]
    fn rescale_rejects_oversized_depth() {
        rescale(1, 10, 32);
    }

    #[test]
    fn mid_scale_linear() {
        let expected = (512.0f64 * 65535.0 / 1023.0).round() as u16;
        assert_eq!(expected, 32800);
        assert_eq!(rescale(512, 10, 16), expected);

        let curve = ToneCurve::new(10, 16, None).unwrap();
        let out = curve.apply(&image(vec![512; 24])).unwrap();
        assert!(out.data.iter().all(|&v| v == expected));
        assert_eq!(out.bits_per_sample, 16);
    }

    #[test]
    fn full_scale_maps_to_full_scale() {
        assert_eq!(rescale(0, 10, 16), 0);
        assert_eq!(rescale(1023, 10, 16), 65535);
        assert_eq!(rescale(1023, 10, 10), 1023);
    }

    #[test]
    fn out_of_range_input_clamps() {
        let curve = ToneCurve::new(10, 16, Some(TransferFunction::Srgb)).unwrap();
        assert_eq!(curve.map(4000), curve.map(1023));
        assert_eq!(rescale(4000, 10, 16), 65535);
    }

    #[test]
    fn gamma_lifts_shadows() {
        let linear = ToneCurve::new(10, 16, None).unwrap();
        let srgb = ToneCurve::new(10, 16, Some(TransferFunction::Srgb)).unwrap();
        assert!(srgb.map(100) > linear.map(100));
        assert_eq!(srgb.map(0), 0);
        assert_eq!(srgb.map(1023), 65535);
    }

    #[test]
    fn rejects_wrong_bit_depth() {
        let curve = ToneCurve::new(10, 16, None).unwrap();
        let mut img = image(vec![1, 2, 3]);
        img.bits_per_sample = 16;
        assert!(matches!(
            curve.apply(&img),
            Err(PipelineError::BitDepthMismatch { expected: 10, actual: 16 })
        ));
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(ToneCurve::new(16, 10, None).is_err());
        assert!(ToneCurve::new(10, 17, None).is_err());
        assert!(ToneCurve::new(10, 16, Some(TransferFunction::Power(0.0))).is_err());
    }

    proptest! {
        #[test]
        fn linear_rescale_is_strictly_monotonic(a in 0u16..1023, delta in 1u16..=1023) {
            let b = a.saturating_add(delta).min(1023);
            prop_assume!(a < b);
            prop_assert!(rescale(a, 10, 16) < rescale(b, 10, 16));
        }

        #[test]
        fn gamma_off_is_exact_linear_rescale(data in prop::collection::vec(0u16..=1023, 3..60)) {
            let whole = data.len() / 3 * 3;
            let img = image(data[..whole].to_vec());
            let curve = ToneCurve::new(10, 16, None).unwrap();
            let out = curve.apply(&img).unwrap();
            let expected: Vec<u16> = img.data.iter().map(|&v| rescale(v, 10, 16)).collect();
            prop_assert_eq!(out.data, expected);
        }

        #[test]
        fn srgb_curve_is_strictly_monotonic(a in 0u16..1023) {
            let curve = ToneCurve::new(10, 16, Some(TransferFunction::Srgb)).unwrap();
            prop_assert!(curve.map(a) < curve.map(a + 1));
        }
    }
}
