//! Session settings
//!
//! Read from an optional TOML file, then overridden by command-line flags.
//! Everything is validated at load time so that no NaN or zero ever reaches
//! the derived tempo values or the detector.
//!
//! ```toml
//! [tempo]
//! bpm = 96
//! subdivisions_per_beat = 2
//! beats_per_bar = 4
//!
//! [detector]
//! beat_threshold = 0.1
//! beat_interval_min = 0.1
//! peak_mode = "signed"
//!
//! [calibration]
//! mode = "manual"
//! delay = 0.0
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    analysis::{detector::DEFAULT_HISTORY_CAPACITY, CalibrationMode, DetectorSettings, PeakMode},
    sequencing::{TempoConfig, TempoError},
    synth::DEFAULT_VOICES,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid tempo: {0}")]
    Tempo(#[from] TempoError),
    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TempoSection {
    pub bpm: f64,
    pub subdivisions_per_beat: u32,
    pub beats_per_bar: u32,
}

impl Default for TempoSection {
    fn default() -> Self {
        let tempo = TempoConfig::DEFAULT;
        Self {
            bpm: tempo.bpm(),
            subdivisions_per_beat: tempo.subdivisions_per_beat(),
            beats_per_bar: tempo.beats_per_bar(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorSection {
    pub enabled: bool,
    pub beat_threshold: f32,
    pub beat_interval_min: f64,
    pub peak_mode: PeakMode,
    pub history_capacity: usize,
}

impl Default for DetectorSection {
    fn default() -> Self {
        let defaults = DetectorSettings::default();
        Self {
            enabled: true,
            beat_threshold: defaults.beat_threshold,
            beat_interval_min: defaults.beat_interval_min,
            peak_mode: defaults.peak_mode,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioSection {
    /// Simultaneous tone bursts in the output
    pub voices: usize,
    /// Capacity of the scheduler → output tone queue
    pub tone_queue: usize,
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            voices: DEFAULT_VOICES,
            tone_queue: 256,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub tempo: TempoSection,
    pub detector: DetectorSection,
    pub calibration: CalibrationMode,
    pub audio: AudioSection,
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every value that feeds a computation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tempo()?;

        let detector = &self.detector;
        if !detector.beat_threshold.is_finite() {
            return Err(invalid("detector.beat_threshold", "must be a finite number"));
        }
        if !detector.beat_interval_min.is_finite() || detector.beat_interval_min < 0.0 {
            return Err(invalid("detector.beat_interval_min", "must be a non-negative number of seconds"));
        }
        if detector.history_capacity == 0 {
            return Err(invalid("detector.history_capacity", "must be at least 1"));
        }

        match self.calibration {
            CalibrationMode::Manual { delay } if !delay.is_finite() => {
                return Err(invalid("calibration.delay", "must be a finite number of seconds"));
            }
            CalibrationMode::Auto { samples: 0 } => {
                return Err(invalid("calibration.samples", "must be at least 1"));
            }
            _ => {}
        }

        if self.audio.voices == 0 {
            return Err(invalid("audio.voices", "must be at least 1"));
        }
        if self.audio.tone_queue < 2 {
            return Err(invalid("audio.tone_queue", "must be at least 2"));
        }

        Ok(())
    }

    pub fn tempo(&self) -> Result<TempoConfig, TempoError> {
        TempoConfig::new(
            self.tempo.bpm,
            self.tempo.subdivisions_per_beat,
            self.tempo.beats_per_bar,
        )
    }

    pub fn detector_settings(&self) -> DetectorSettings {
        DetectorSettings {
            beat_threshold: self.detector.beat_threshold,
            beat_interval_min: self.detector.beat_interval_min,
            peak_mode: self.detector.peak_mode,
        }
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.tempo().unwrap(), TempoConfig::DEFAULT);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            [tempo]
            bpm = 132.5

            [detector]
            peak_mode = "rectified"

            [calibration]
            mode = "auto"
            samples = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.tempo.bpm, 132.5);
        assert_eq!(settings.tempo.beats_per_bar, 4);
        assert_eq!(settings.detector.peak_mode, PeakMode::Rectified);
        assert_eq!(settings.calibration, CalibrationMode::Auto { samples: 3 });
    }

    #[test]
    fn non_numeric_bpm_fails_at_load() {
        let err = Settings::from_toml_str("[tempo]\nbpm = \"fast\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_values_fail_at_load() {
        let err = Settings::from_toml_str("[tempo]\nbpm = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_) | ConfigError::Tempo(_)));

        let err = Settings::from_toml_str("[tempo]\nsubdivisions_per_beat = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Tempo(TempoError::NoSubdivisions)));

        let err = Settings::from_toml_str("[detector]\nbeat_interval_min = -0.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "detector.beat_interval_min", .. }));
    }

    #[test]
    fn runaway_tempo_fails_at_load() {
        let err = Settings::from_toml_str("[tempo]\nbpm = 1e20\n").unwrap_err();
        assert!(matches!(err, ConfigError::Tempo(TempoError::InvalidBpm(_))));

        let text = "[tempo]\nsubdivisions_per_beat = 65536\nbeats_per_bar = 65536\n";
        let err = Settings::from_toml_str(text).unwrap_err();
        assert!(matches!(err, ConfigError::Tempo(TempoError::TooManySubdivisions(65536))));
    }

    #[test]
    fn nan_threshold_fails_at_load() {
        let err = Settings::from_toml_str("[detector]\nbeat_threshold = nan\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "detector.beat_threshold", .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_toml_str("[tempo]\nbmp = 120\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Settings::load(Path::new("/nonexistent/beatgrid.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/beatgrid.toml"));
    }
}
