//! Time references for scheduling and for timestamping input frames.
//!
//! Everything in the engine speaks seconds since an arbitrary epoch. The same
//! clock must be used for both scheduled tones and detected beats, otherwise
//! the bar position of a beat is meaningless.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub trait Clock {
    /// Current time in seconds. Never decreases.
    fn now(&self) -> f64;
}

/// Audio-device clock: frames rendered by the output stream over sample rate.
///
/// The output callback is the only writer. Readers see the position at the
/// end of the last rendered block, which is how audio-context clocks behave.
#[derive(Debug, Clone)]
pub struct StreamClock {
    frames: Arc<AtomicU64>,
    sample_rate: f64,
}

impl StreamClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate as f64,
        }
    }

    /// Record the total number of frames rendered so far.
    pub fn publish(&self, frames_rendered: u64) {
        self.frames.fetch_max(frames_rendered, Ordering::Release);
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl Clock for StreamClock {
    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate
    }
}

/// Hand-driven clock for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start.to_bits())),
        }
    }

    /// Move the clock to `t`. Earlier times are ignored.
    pub fn set(&self, t: f64) {
        if t > self.now() {
            self.bits.store(t.to_bits(), Ordering::Release);
        }
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}
