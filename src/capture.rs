//! Capture front-end control logic.
//!
//! Device I/O and preview rendering live elsewhere; this module turns operator
//! commands into state transitions and device effects, and names the files
//! the device produces. RAW captures feed [`crate::image_pipeline`].

pub mod command;
pub mod exposure;
pub mod naming;
pub mod state;

pub use command::{CaptureCommand, Step, KEY_HINTS};
pub use exposure::{estimate_iso, format_shutter, ManualExposure, SensorReading};
pub use naming::{capture_file_name, capture_path};
pub use state::{CaptureMode, CaptureState, Controls, Effect, ExposureMode, Transition};
