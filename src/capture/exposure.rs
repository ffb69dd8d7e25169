//! Manual exposure limits and the readouts derived from sensor metadata.

use crate::capture::command::Step;

pub const EXPOSURE_STEP_US: u32 = 2_000;
pub const MIN_EXPOSURE_US: u32 = 100;
pub const MAX_EXPOSURE_US: u32 = 85_000;

/// Analogue gain is tracked in hundredths so repeated steps never drift.
pub const GAIN_STEP_CENTI: u32 = 10;
pub const MIN_GAIN_CENTI: u32 = 100;
pub const MAX_GAIN_CENTI: u32 = 960;

pub const FALLBACK_EXPOSURE_US: u32 = 1_000;

const ISO_MIN: f64 = 100.0;
const ISO_MAX: f64 = 6400.0;

pub const STANDARD_ISOS: &[u32] = &[
    100, 110, 125, 140, 160, 180, 200, 220, 250, 280, 320, 400, 500, 640, 800, 1000, 1250,
    1600, 2000, 2200, 2350, 2500, 2800, 3000, 3200, 3600, 4000, 4500, 5000, 5600, 6400,
];

/// What the sensor reported for the latest frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReading {
    pub exposure_us: u32,
    pub analogue_gain: f32,
    pub digital_gain: f32,
}

impl SensorReading {
    pub fn total_gain(&self) -> f32 {
        self.analogue_gain * self.digital_gain
    }
}

/// Operator-chosen exposure, always inside the sensor limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualExposure {
    exposure_us: u32,
    gain_centi: u32,
}

impl ManualExposure {
    pub fn new(exposure_us: u32, gain: f32) -> Self {
        Self {
            exposure_us: exposure_us.clamp(MIN_EXPOSURE_US, MAX_EXPOSURE_US),
            gain_centi: gain_to_centi(gain),
        }
    }

    /// Seeds manual mode from whatever auto exposure had settled on.
    pub fn from_reading(reading: &SensorReading) -> Self {
        let exposure = if reading.exposure_us == 0 {
            FALLBACK_EXPOSURE_US
        } else {
            reading.exposure_us
        };
        let gain = if reading.analogue_gain > 0.0 { reading.analogue_gain } else { 1.0 };
        Self::new(exposure, gain)
    }

    pub fn exposure_us(&self) -> u32 {
        self.exposure_us
    }

    pub fn gain(&self) -> f32 {
        self.gain_centi as f32 / 100.0
    }

    pub fn adjust_exposure(self, step: Step) -> Self {
        let exposure_us = match step {
            Step::Decrease => self.exposure_us.saturating_sub(EXPOSURE_STEP_US),
            Step::Increase => self.exposure_us.saturating_add(EXPOSURE_STEP_US),
        };
        Self {
            exposure_us: exposure_us.clamp(MIN_EXPOSURE_US, MAX_EXPOSURE_US),
            ..self
        }
    }

    pub fn adjust_gain(self, step: Step) -> Self {
        let gain_centi = match step {
            Step::Decrease => self.gain_centi.saturating_sub(GAIN_STEP_CENTI),
            Step::Increase => self.gain_centi.saturating_add(GAIN_STEP_CENTI),
        };
        Self {
            gain_centi: gain_centi.clamp(MIN_GAIN_CENTI, MAX_GAIN_CENTI),
            ..self
        }
    }
}

fn gain_to_centi(gain: f32) -> u32 {
    let centi = if gain.is_finite() { (gain * 100.0).round() } else { 0.0 };
    (centi.max(0.0) as u32).clamp(MIN_GAIN_CENTI, MAX_GAIN_CENTI)
}

/// Shutter speed the way cameras print it: `1/250`, `2.5s`, `12s`.
pub fn format_shutter(exposure_us: u32) -> String {
    if exposure_us == 0 {
        return "—".to_string();
    }
    let seconds = f64::from(exposure_us) / 1_000_000.0;
    if seconds < 1.0 {
        format!("1/{}", (1.0 / seconds).round() as u64)
    } else if seconds < 10.0 {
        format!("{:.1}s", seconds)
    } else {
        format!("{}s", seconds as u64)
    }
}

/// Maps sensor gain onto the nearest standard ISO stop.
///
/// Power law through (1.0, ISO 100) and (9.6, ISO 6400).
pub fn estimate_iso(gain: f32) -> u32 {
    let min_gain = f64::from(MIN_GAIN_CENTI) / 100.0;
    let max_gain = f64::from(MAX_GAIN_CENTI) / 100.0;
    let gain = f64::from(gain).clamp(min_gain, max_gain);

    let exponent = (ISO_MAX / ISO_MIN).ln() / (max_gain / min_gain).ln();
    let iso = ISO_MIN * (gain / min_gain).powf(exponent);

    STANDARD_ISOS
        .iter()
        .copied()
        .min_by(|&a, &b| (f64::from(a) - iso).abs().total_cmp(&(f64::from(b) - iso).abs()))
        .unwrap_or(STANDARD_ISOS[0])
}
