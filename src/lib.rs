pub mod analysis; // Beat detection and bar alignment
pub mod config;
pub mod dsp;
pub mod engine; // Clock, tick driver, look-ahead scheduling
pub mod io;
pub mod sequencing; // Tempo grid
pub mod synth; // Tone bursts for the audio output

pub use analysis::{BeatDetector, BeatHistory, Calibration, DetectedBeat, DetectorSettings, PeakMode};
pub use config::{ConfigError, Settings};
pub use engine::{
    clock::{Clock, ManualClock, StreamClock},
    scheduler::{NoteScheduler, PitchClass, ScheduleCursor, ScheduleError, ScheduledNote},
    session::{DisplaySnapshot, Metronome},
};
pub use sequencing::{TempoConfig, TempoError};
pub use synth::message::{OutputError, ToneCommand, ToneSink};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
