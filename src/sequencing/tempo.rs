use thiserror::Error;

/// Tempo and meter of the beat grid
///
/// Derived durations are computed on every call so they always agree with
/// the fields. Construct through [`TempoConfig::new`] to get validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoConfig {
    bpm: f64,
    subdivisions_per_beat: u32,
    beats_per_bar: u32,
}

pub const MIN_BPM: f64 = 1.0;
pub const MAX_BPM: f64 = 1000.0;
pub const MAX_SUBDIVISIONS_PER_BEAT: u32 = 64;
pub const MAX_BEATS_PER_BAR: u32 = 64;

/// Errors raised when a tempo configuration is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TempoError {
    #[error("bpm must be between 1 and 1000, got {0}")]
    InvalidBpm(f64),
    #[error("subdivisions per beat must be at least 1")]
    NoSubdivisions,
    #[error("beats per bar must be at least 1")]
    NoBeats,
    #[error("subdivisions per beat must be at most 64, got {0}")]
    TooManySubdivisions(u32),
    #[error("beats per bar must be at most 64, got {0}")]
    TooManyBeats(u32),
}

impl TempoConfig {
    /// Common 4/4 grid with eighth-note subdivisions at 80 BPM
    pub const DEFAULT: TempoConfig = TempoConfig {
        bpm: 80.0,
        subdivisions_per_beat: 2,
        beats_per_bar: 4,
    };

    pub fn new(bpm: f64, subdivisions_per_beat: u32, beats_per_bar: u32) -> Result<Self, TempoError> {
        // NaN fails the range check too
        if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
            return Err(TempoError::InvalidBpm(bpm));
        }
        if subdivisions_per_beat == 0 {
            return Err(TempoError::NoSubdivisions);
        }
        if subdivisions_per_beat > MAX_SUBDIVISIONS_PER_BEAT {
            return Err(TempoError::TooManySubdivisions(subdivisions_per_beat));
        }
        if beats_per_bar == 0 {
            return Err(TempoError::NoBeats);
        }
        if beats_per_bar > MAX_BEATS_PER_BAR {
            return Err(TempoError::TooManyBeats(beats_per_bar));
        }

        Ok(Self {
            bpm,
            subdivisions_per_beat,
            beats_per_bar,
        })
    }

    /// Same meter at a different tempo
    pub fn with_bpm(&self, bpm: f64) -> Result<Self, TempoError> {
        Self::new(bpm, self.subdivisions_per_beat, self.beats_per_bar)
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn subdivisions_per_beat(&self) -> u32 {
        self.subdivisions_per_beat
    }

    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar
    }

    /// Duration of one beat in seconds: 60 / bpm
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Duration of one grid step in seconds: 60 / bpm / subdivisions
    pub fn seconds_per_subdivision(&self) -> f64 {
        60.0 / self.bpm / self.subdivisions_per_beat as f64
    }

    /// Duration of one bar in seconds: 60 / bpm * beats_per_bar
    pub fn seconds_per_bar(&self) -> f64 {
        60.0 / self.bpm * self.beats_per_bar as f64
    }

    /// Number of grid steps in one bar. Bounded by the limits in `new`.
    pub fn total_subdivisions_per_bar(&self) -> u32 {
        self.beats_per_bar * self.subdivisions_per_beat
    }
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
