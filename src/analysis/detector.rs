//! Threshold + debounce beat detector.
//!
//! Each input frame is reduced to one peak value. A frame whose peak crosses
//! the threshold counts as a beat unless a beat was already accepted within
//! the debounce window. A burst of loud frames from one clap therefore
//! collapses into a single detection at its first frame.

use std::collections::VecDeque;

use rtrb::{Consumer, Producer};
use serde::{Deserialize, Serialize};

/// How a frame is reduced to its peak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakMode {
    /// Plain maximum of the raw samples. Negative excursions are ignored.
    #[default]
    Signed,
    /// Maximum of the absolute sample values
    Rectified,
}

impl PeakMode {
    pub fn peak(&self, frame: &[f32]) -> Option<f32> {
        let mut samples = frame.iter().copied();
        let first = samples.next()?;
        Some(match self {
            PeakMode::Signed => samples.fold(first, f32::max),
            PeakMode::Rectified => samples.fold(first.abs(), |acc, s| acc.max(s.abs())),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSettings {
    pub beat_threshold: f32,
    /// Debounce window in seconds
    pub beat_interval_min: f64,
    pub peak_mode: PeakMode,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            beat_threshold: 0.1,
            beat_interval_min: 0.1,
            peak_mode: PeakMode::Signed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedBeat {
    pub amplitude: f32,
    pub time: f64,
}

#[derive(Debug, Clone)]
pub struct BeatDetector {
    settings: DetectorSettings,
    last_detected: Option<f64>,
}

impl BeatDetector {
    pub fn new(settings: DetectorSettings) -> Self {
        Self {
            settings,
            last_detected: None,
        }
    }

    /// Classify one frame. Returns the beat if this frame is one.
    pub fn on_audio_frame(&mut self, frame: &[f32], frame_time: f64) -> Option<DetectedBeat> {
        let peak = self.settings.peak_mode.peak(frame)?;
        if peak <= self.settings.beat_threshold {
            return None;
        }

        if let Some(last) = self.last_detected {
            if frame_time - last <= self.settings.beat_interval_min {
                return None;
            }
        }

        self.last_detected = Some(frame_time);
        Some(DetectedBeat {
            amplitude: peak,
            time: frame_time,
        })
    }

    /// New session: forget the last detection and load fresh settings.
    pub fn reset(&mut self, settings: DetectorSettings) {
        self.settings = settings;
        self.last_detected = None;
    }

    /// Load new settings, keeping the debounce state.
    pub fn refresh(&mut self, settings: DetectorSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    pub fn last_detected(&self) -> Option<f64> {
        self.last_detected
    }
}

pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// Detected beats in detection order, oldest dropped past capacity
#[derive(Debug, Clone)]
pub struct BeatHistory {
    beats: VecDeque<DetectedBeat>,
    capacity: usize,
}

impl BeatHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            beats: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, beat: DetectedBeat) {
        if self.beats.len() == self.capacity {
            self.beats.pop_front();
        }
        self.beats.push_back(beat);
    }

    pub fn clear(&mut self) {
        self.beats.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectedBeat> {
        self.beats.iter()
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BeatHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Settings changes delivered to the detector between frames
#[derive(Debug, Clone, Copy)]
pub enum DetectorControl {
    Reset(DetectorSettings),
    Refresh(DetectorSettings),
}

/// Detector as owned by the input callback.
///
/// Controls are applied before each frame and detections are forwarded to
/// the session thread, so the callback is the detector's only writer.
pub struct DetectorLink {
    detector: BeatDetector,
    control_rx: Consumer<DetectorControl>,
    beat_tx: Producer<DetectedBeat>,
    lost: u64,
}

impl DetectorLink {
    pub fn new(
        detector: BeatDetector,
        control_rx: Consumer<DetectorControl>,
        beat_tx: Producer<DetectedBeat>,
    ) -> Self {
        Self {
            detector,
            control_rx,
            beat_tx,
            lost: 0,
        }
    }

    pub fn process(&mut self, frame: &[f32], frame_time: f64) {
        while let Ok(control) = self.control_rx.pop() {
            match control {
                DetectorControl::Reset(settings) => self.detector.reset(settings),
                DetectorControl::Refresh(settings) => self.detector.refresh(settings),
            }
        }

        if let Some(beat) = self.detector.on_audio_frame(frame, frame_time) {
            if self.beat_tx.push(beat).is_err() {
                self.lost += 1;
            }
        }
    }

    /// Detections dropped because the session wasn't draining
    pub fn lost(&self) -> u64 {
        self.lost
    }
}
