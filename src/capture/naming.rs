use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::capture::state::CaptureMode;

pub const DEFAULT_PREFIX: &str = "imx335";

/// `<prefix>_YYYYmmdd_HHMMSS.<jpg|raw>`; RAW captures land where the batch
/// processor looks for input.
pub fn capture_file_name(prefix: &str, mode: CaptureMode, taken_at: NaiveDateTime) -> String {
    format!("{}_{}.{}", prefix, taken_at.format("%Y%m%d_%H%M%S"), mode.extension())
}

pub fn capture_path(dir: &Path, prefix: &str, mode: CaptureMode, taken_at: NaiveDateTime) -> PathBuf {
    dir.join(capture_file_name(prefix, mode, taken_at))
}
