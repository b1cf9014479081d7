pub mod clock;
pub mod pulse;
pub mod scheduler;
pub mod session;

pub use clock::{Clock, ManualClock, StreamClock};
pub use pulse::{drain_pulses, ManualPulse, Pulse, PulseControl, TickDriver, PULSE_INTERVAL};
pub use scheduler::{NoteScheduler, PitchClass, ScheduleCursor, ScheduleError, ScheduledNote, NOTE_SOUND_LENGTH, SCHEDULE_MARGIN};
pub use session::{BeatMark, DisplaySnapshot, Metronome};
