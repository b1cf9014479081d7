// Purpose: turn microphone input into beats and place them on the bar grid

pub mod bar;
pub mod calibration;
pub mod detector;

pub use bar::{bar_number, position_in_bar};
pub use calibration::{Calibration, CalibrationMode, LatencyEstimator};
pub use detector::{
    BeatDetector, BeatHistory, DetectedBeat, DetectorControl, DetectorLink, DetectorSettings,
    PeakMode,
};
