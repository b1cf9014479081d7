//! Latency calibration policies.
//!
//! A session uses exactly one policy: either a fixed delay from the settings,
//! or a delay estimated from the first few beats the user claps after start.

use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTO_SAMPLES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CalibrationMode {
    Manual { delay: f64 },
    Auto { samples: usize },
}

impl Default for CalibrationMode {
    fn default() -> Self {
        CalibrationMode::Manual { delay: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Calibration {
    Manual { delay: f64 },
    Auto(LatencyEstimator),
}

impl Calibration {
    pub fn from_mode(mode: CalibrationMode) -> Self {
        match mode {
            CalibrationMode::Manual { delay } => Calibration::Manual { delay },
            CalibrationMode::Auto { samples } => Calibration::Auto(LatencyEstimator::new(samples)),
        }
    }

    pub fn delay(&self) -> f64 {
        match self {
            Calibration::Manual { delay } => *delay,
            Calibration::Auto(estimator) => estimator.estimate().unwrap_or(0.0),
        }
    }

    /// Feed a detected beat. Manual calibration ignores it.
    pub fn observe(&mut self, beat_time: f64, start_time: f64, seconds_per_beat: f64) {
        if let Calibration::Auto(estimator) = self {
            estimator.observe(beat_time, start_time, seconds_per_beat);
        }
    }

    /// Forget previous estimates at the start of a session.
    pub fn restart(&mut self) {
        if let Calibration::Auto(estimator) = self {
            estimator.clear();
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Calibration::Auto(_))
    }
}

/// Mean offset of the first `samples` beats from the preceding grid beat.
///
/// Assumes the user claps on the beat, so whatever offset remains is the
/// input path's latency.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyEstimator {
    samples: usize,
    offsets: Vec<f64>,
}

impl LatencyEstimator {
    pub fn new(samples: usize) -> Self {
        let samples = samples.max(1);
        Self {
            samples,
            offsets: Vec::with_capacity(samples),
        }
    }

    pub fn observe(&mut self, beat_time: f64, start_time: f64, seconds_per_beat: f64) {
        if self.offsets.len() >= self.samples || beat_time < start_time {
            return;
        }
        self.offsets
            .push((beat_time - start_time).rem_euclid(seconds_per_beat));
    }

    pub fn estimate(&self) -> Option<f64> {
        if self.offsets.len() < self.samples {
            return None;
        }
        Some(self.offsets.iter().sum::<f64>() / self.offsets.len() as f64)
    }

    pub fn clear(&mut self) {
        self.offsets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_delay_ignores_beats() {
        let mut cal = Calibration::from_mode(CalibrationMode::Manual { delay: 0.08 });
        cal.observe(1.3, 1.0, 0.5);
        assert_eq!(cal.delay(), 0.08);
    }

    #[test]
    fn auto_waits_for_enough_beats() {
        let mut cal = Calibration::from_mode(CalibrationMode::Auto { samples: 2 });

        cal.observe(1.04, 1.0, 0.5);
        assert_eq!(cal.delay(), 0.0);

        cal.observe(1.56, 1.0, 0.5);
        assert!((cal.delay() - 0.05).abs() < 1e-9);

        // Later beats don't move the estimate
        cal.observe(2.2, 1.0, 0.5);
        assert!((cal.delay() - 0.05).abs() < 1e-9);
    }

    #[test]
    fn beats_before_start_are_ignored() {
        let mut estimator = LatencyEstimator::new(1);
        estimator.observe(0.9, 1.0, 0.5);
        assert_eq!(estimator.estimate(), None);
    }

    #[test]
    fn restart_discards_estimate() {
        let mut cal = Calibration::from_mode(CalibrationMode::Auto { samples: 1 });
        cal.observe(1.1, 1.0, 0.5);
        assert!(cal.delay() > 0.0);

        cal.restart();
        assert_eq!(cal.delay(), 0.0);
        assert!(cal.is_auto());
    }
}
