// Purpose: the audio output side of the scheduler.
// Tone commands cross from the scheduling thread to the output callback over
// a ring buffer; the player turns them into sample-accurate sine bursts.

pub mod message;
pub mod player;
pub mod voice;

pub use message::{OutputError, ToneCommand, ToneReceiver, ToneSink};
pub use player::{TonePlayer, DEFAULT_VOICES};
