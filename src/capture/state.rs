//! Capture front-end state machine.
//!
//! The state space is {JPEG, RAW} x {auto, manual(exposure)}; manual settings
//! only exist while manual exposure is active, so a stale manual value can
//! never leak into an auto-exposed capture.

use crate::capture::command::CaptureCommand;
use crate::capture::exposure::{ManualExposure, SensorReading, estimate_iso, format_shutter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// Processed still encoded by the camera stack
    #[default]
    Jpeg,
    /// Packed Bayer dump for the decode pipeline
    Raw,
}

impl CaptureMode {
    pub fn toggled(self) -> Self {
        match self {
            CaptureMode::Jpeg => CaptureMode::Raw,
            CaptureMode::Raw => CaptureMode::Jpeg,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            CaptureMode::Jpeg => "jpg",
            CaptureMode::Raw => "raw",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CaptureMode::Jpeg => "JPEG",
            CaptureMode::Raw => "RAW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExposureMode {
    #[default]
    Auto,
    Manual(ManualExposure),
}

/// Control values to push to the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub ae_enable: bool,
    pub exposure_us: Option<u32>,
    pub analogue_gain: Option<f32>,
}

impl From<ExposureMode> for Controls {
    fn from(mode: ExposureMode) -> Self {
        match mode {
            ExposureMode::Auto => Controls {
                ae_enable: true,
                exposure_us: None,
                analogue_gain: None,
            },
            ExposureMode::Manual(manual) => Controls {
                ae_enable: false,
                exposure_us: Some(manual.exposure_us()),
                analogue_gain: Some(manual.gain()),
            },
        }
    }
}

/// Side effect the device layer has to carry out after a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Take a still in the given mode, using `controls` for the exposure
    Capture { mode: CaptureMode, controls: Controls },
    ApplyControls(Controls),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: CaptureState,
    pub effect: Option<Effect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureState {
    pub mode: CaptureMode,
    pub exposure: ExposureMode,
    pub show_hints: bool,
    pub running: bool,
}

impl Default for CaptureState {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Jpeg,
            exposure: ExposureMode::Auto,
            show_hints: false,
            running: true,
        }
    }
}

impl CaptureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controls(&self) -> Controls {
        self.exposure.into()
    }

    /// Next state for `command`. `reading` is the latest sensor metadata,
    /// used to seed manual exposure.
    pub fn apply(self, command: CaptureCommand, reading: &SensorReading) -> Transition {
        if !self.running {
            return Transition { state: self, effect: None };
        }

        let mut next = self;
        let effect = match (command, self.exposure) {
            (CaptureCommand::Quit, _) => {
                next.running = false;
                Some(Effect::Quit)
            }
            (CaptureCommand::ToggleHints, _) => {
                next.show_hints = !self.show_hints;
                None
            }
            (CaptureCommand::ToggleCaptureMode, _) => {
                next.mode = self.mode.toggled();
                None
            }
            (CaptureCommand::CaptureStill, _) => Some(Effect::Capture {
                mode: self.mode,
                controls: self.controls(),
            }),
            (CaptureCommand::ToggleExposureMode, ExposureMode::Auto) => {
                next.exposure = ExposureMode::Manual(ManualExposure::from_reading(reading));
                Some(Effect::ApplyControls(next.controls()))
            }
            (CaptureCommand::ToggleExposureMode, ExposureMode::Manual(_)) => {
                next.exposure = ExposureMode::Auto;
                Some(Effect::ApplyControls(next.controls()))
            }
            (CaptureCommand::AdjustExposure(step), ExposureMode::Manual(manual)) => {
                next.exposure = ExposureMode::Manual(manual.adjust_exposure(step));
                Some(Effect::ApplyControls(next.controls()))
            }
            (CaptureCommand::AdjustGain(step), ExposureMode::Manual(manual)) => {
                next.exposure = ExposureMode::Manual(manual.adjust_gain(step));
                Some(Effect::ApplyControls(next.controls()))
            }
            // Exposure and gain belong to the AE loop while it is active.
            (CaptureCommand::AdjustExposure(_) | CaptureCommand::AdjustGain(_), ExposureMode::Auto) => None,
        };

        Transition { state: next, effect }
    }

    /// Gain to show the operator: the manual setting, else what the sensor applied.
    pub fn display_gain(&self, reading: &SensorReading) -> f32 {
        match self.exposure {
            ExposureMode::Manual(manual) => manual.gain(),
            ExposureMode::Auto => reading.total_gain(),
        }
    }

    /// One-line status, e.g. `AE: ON  1/250   ISO 400   MODE: RAW`.
    pub fn status_line(&self, reading: &SensorReading) -> String {
        let ae = match self.exposure {
            ExposureMode::Auto => "AE: ON",
            ExposureMode::Manual(_) => "AE: OFF",
        };
        format!(
            "{}  {}   ISO {}   MODE: {}",
            ae,
            format_shutter(reading.exposure_us),
            estimate_iso(self.display_gain(reading)),
            self.mode.label()
        )
    }
}
