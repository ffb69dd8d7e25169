/// Direction of a manual exposure or gain adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Decrease,
    Increase,
}

/// Discrete operator commands accepted by the capture front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCommand {
    CaptureStill,
    ToggleHints,
    /// JPEG <-> RAW
    ToggleCaptureMode,
    /// Auto <-> manual exposure
    ToggleExposureMode,
    AdjustExposure(Step),
    AdjustGain(Step),
    Quit,
}

impl CaptureCommand {
    pub fn from_key(key: char) -> Option<Self> {
        let command = match key {
            ' ' | 's' => CaptureCommand::CaptureStill,
            'h' => CaptureCommand::ToggleHints,
            'r' => CaptureCommand::ToggleCaptureMode,
            'm' | 'a' => CaptureCommand::ToggleExposureMode,
            '[' => CaptureCommand::AdjustExposure(Step::Decrease),
            ']' => CaptureCommand::AdjustExposure(Step::Increase),
            '-' => CaptureCommand::AdjustGain(Step::Decrease),
            '=' | '+' => CaptureCommand::AdjustGain(Step::Increase),
            'q' => CaptureCommand::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// Key reference shown by the hint overlay.
pub const KEY_HINTS: &[&str] = &[
    "SPACE / s = CAPTURE",
    "m = AE (auto/manual)",
    "[ / ] = EXPOSURE (manual only)",
    "- / + = GAIN / ISO (manual only)",
    "r = RAW <-> JPEG",
    "h = HINTS",
    "q = QUIT",
];
