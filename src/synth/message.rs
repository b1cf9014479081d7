use rtrb::{Consumer, Producer};
use thiserror::Error;

/// One tone burst, in clock seconds
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ToneCommand {
    pub start: f64,
    pub stop: f64,
    pub frequency: f32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OutputError {
    #[error("tone queue is full")]
    QueueFull,
    #[error("invalid tone: start {start}, stop {stop}, frequency {frequency}")]
    InvalidTone { start: f64, stop: f64, frequency: f32 },
}

/// Accepts tones to be played at absolute clock times.
///
/// A failed call must leave nothing behind: the scheduler relies on this to
/// keep its cursor untouched when the output refuses a tone.
pub trait ToneSink {
    fn schedule_tone(&mut self, start: f64, stop: f64, frequency: f32) -> Result<(), OutputError>;
}

impl ToneCommand {
    pub fn validated(start: f64, stop: f64, frequency: f32) -> Result<Self, OutputError> {
        let valid = start.is_finite()
            && stop.is_finite()
            && stop > start
            && frequency.is_finite()
            && frequency > 0.0;

        if valid {
            Ok(Self { start, stop, frequency })
        } else {
            Err(OutputError::InvalidTone { start, stop, frequency })
        }
    }
}

impl ToneSink for Producer<ToneCommand> {
    fn schedule_tone(&mut self, start: f64, stop: f64, frequency: f32) -> Result<(), OutputError> {
        let command = ToneCommand::validated(start, stop, frequency)?;
        self.push(command).map_err(|_| OutputError::QueueFull)
    }
}

/// Collects tones in memory. Used by offline rendering and tests.
impl ToneSink for Vec<ToneCommand> {
    fn schedule_tone(&mut self, start: f64, stop: f64, frequency: f32) -> Result<(), OutputError> {
        self.push(ToneCommand::validated(start, stop, frequency)?);
        Ok(())
    }
}

pub trait ToneReceiver {
    fn pop(&mut self) -> Option<ToneCommand>;
}

impl ToneReceiver for Consumer<ToneCommand> {
    fn pop(&mut self) -> Option<ToneCommand> {
        Consumer::pop(self).ok()
    }
}
