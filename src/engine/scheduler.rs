//! Look-ahead note scheduler
//!
//! The scheduler is woken by tick pulses that arrive with jitter. On each
//! pulse it commits every grid step that falls inside the look-ahead window,
//! handing the tone to the audio output with an absolute start time. The
//! audio side plays it sample-accurately, so pulse jitter never reaches the
//! ear as long as it stays below the margin.
//!
//! ```text
//!   now            now + margin
//!    |-----------------|
//!    ^ pulse           ^ everything before here is committed
//!         x     x     x     x
//!         committed   | next_time (first uncommitted step)
//! ```

use std::collections::VecDeque;

use thiserror::Error;

use crate::{sequencing::TempoConfig, synth::message::{OutputError, ToneSink}};

/// Look-ahead window in seconds
pub const SCHEDULE_MARGIN: f64 = 0.1;

/// Duration of each tone burst in seconds
pub const NOTE_SOUND_LENGTH: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Output(#[from] OutputError),
    /// The step is too small to move the cursor at this clock magnitude
    #[error("grid step at {0}s does not advance the schedule")]
    Stalled(f64),
}

/// Pitch tier of a grid step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchClass {
    /// First step of the bar
    Downbeat,
    /// First step of every other beat
    Beat,
    /// Steps between beats
    Subdivision,
}

impl PitchClass {
    pub fn for_index(index: u32, subdivisions_per_beat: u32) -> Self {
        if index == 0 {
            PitchClass::Downbeat
        } else if index % subdivisions_per_beat == 0 {
            PitchClass::Beat
        } else {
            PitchClass::Subdivision
        }
    }

    pub fn frequency(&self) -> f32 {
        match self {
            PitchClass::Downbeat => 880.0,
            PitchClass::Beat => 440.0,
            PitchClass::Subdivision => 220.0,
        }
    }
}

/// Position of the first step not yet committed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleCursor {
    pub next_index: u32,
    pub next_time: f64,
}

/// A committed tone, kept for the display until its time has passed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledNote {
    pub index: u32,
    pub time: f64,
    pub pitch: PitchClass,
}

#[derive(Debug)]
pub struct NoteScheduler {
    tempo: TempoConfig,
    cursor: ScheduleCursor,
    playing: bool,
    start_time: Option<f64>,
    queue: VecDeque<ScheduledNote>,
    /// Index of the most recent step whose time has passed
    current_index: u32,
}

impl NoteScheduler {
    pub fn new(tempo: TempoConfig) -> Self {
        Self {
            tempo,
            cursor: ScheduleCursor {
                next_index: 0,
                next_time: 0.0,
            },
            playing: false,
            start_time: None,
            queue: VecDeque::with_capacity(64),
            current_index: 0,
        }
    }

    /// Begin playback. Returns false if already playing.
    pub fn start(&mut self, now: f64) -> bool {
        if self.playing {
            return false;
        }

        let start_time = now + SCHEDULE_MARGIN;
        self.playing = true;
        self.start_time = Some(start_time);
        self.cursor = ScheduleCursor {
            next_index: 0,
            next_time: start_time,
        };
        self.current_index = 0;
        self.queue.clear();
        true
    }

    /// Halt scheduling. Already-committed tones still play. Returns false if
    /// not playing.
    pub fn stop(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        self.playing = false;
        true
    }

    /// Commit every step before `now + SCHEDULE_MARGIN`.
    ///
    /// The sink is called before any state changes for a step. If it fails,
    /// the cursor and queue stay exactly as they were before that step and
    /// the error is returned; steps committed earlier in the same call stay.
    /// A step that would not move the cursor forward is refused the same way,
    /// before the sink sees it.
    pub fn on_tick_pulse<S: ToneSink + ?Sized>(
        &mut self,
        now: f64,
        sink: &mut S,
    ) -> Result<usize, ScheduleError> {
        if !self.playing {
            return Ok(0);
        }

        let horizon = now + SCHEDULE_MARGIN;
        let mut committed = 0;

        while self.cursor.next_time < horizon {
            self.commit_next(sink)?;
            committed += 1;
        }

        Ok(committed)
    }

    fn commit_next<S: ToneSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), ScheduleError> {
        let ScheduleCursor { next_index, next_time } = self.cursor;
        let following = next_time + self.tempo.seconds_per_subdivision();
        if following <= next_time {
            return Err(ScheduleError::Stalled(next_time));
        }

        let pitch = PitchClass::for_index(next_index, self.tempo.subdivisions_per_beat());

        sink.schedule_tone(next_time, next_time + NOTE_SOUND_LENGTH, pitch.frequency())?;

        self.queue.push_back(ScheduledNote {
            index: next_index,
            time: next_time,
            pitch,
        });

        self.cursor = ScheduleCursor {
            next_index: (next_index + 1) % self.tempo.total_subdivisions_per_bar(),
            next_time: following,
        };
        Ok(())
    }

    /// Remove queued notes whose time is before `now`, tracking the latest as
    /// the current step. Returns the number removed.
    pub fn drain_due(&mut self, now: f64) -> usize {
        let mut drained = 0;
        while let Some(note) = self.queue.front() {
            if note.time >= now {
                break;
            }
            self.current_index = note.index;
            self.queue.pop_front();
            drained += 1;
        }
        drained
    }

    /// Replace the tempo. Refused while playing so the grid stays regular.
    pub fn set_tempo(&mut self, tempo: TempoConfig) -> bool {
        if self.playing {
            return false;
        }
        self.tempo = tempo;
        self.current_index = 0;
        true
    }

    pub fn tempo(&self) -> &TempoConfig {
        &self.tempo
    }

    pub fn cursor(&self) -> ScheduleCursor {
        self.cursor
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Origin of the bar grid. Kept after stop for display.
    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn queue(&self) -> &VecDeque<ScheduledNote> {
        &self.queue
    }

    pub fn current_index(&self) -> u32 {
        self.current_index
    }
}
