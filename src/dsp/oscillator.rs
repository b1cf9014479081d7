use std::f32::consts::TAU;

/*
Sine Oscillator
===============

The metronome only needs pure tones: a sine at 880, 440 or 220 Hz is easy to
tell apart by ear and carries no harmonics that could leak into the
microphone as false beats.

Phase Accumulation
------------------

We keep `phase` in [0, 1) and advance it by `frequency / sample_rate` each
sample:

    phase += frequency / sample_rate
    if phase >= 1.0 { phase -= 1.0 }
    out = sin(TAU * phase)

Wrapping keeps the argument to sin() small, so precision doesn't drift over
long sessions the way `sin(TAU * f * n / sr)` with a growing `n` would.
*/

#[derive(Debug, Clone)]
pub struct SineOscillator {
    phase: f32,
    frequency: f32,
}

impl SineOscillator {
    pub fn new(frequency: f32) -> Self {
        Self {
            phase: 0.0,
            frequency,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Restart at zero phase with a new pitch.
    pub fn retrigger(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.phase = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let out = (TAU * self.phase).sin();
        self.phase += self.frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        out
    }

    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let mut osc = SineOscillator::new(440.0);

        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, sample_rate);

        // sample n should be sin(2pi f n / sr)
        let sample_index = 12;
        let expected = (TAU * 440.0 * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn retrigger_resets_phase() {
        let mut osc = SineOscillator::new(220.0);
        let mut buffer = vec![0.0f32; 37];
        osc.render(&mut buffer, 48_000.0);

        osc.retrigger(880.0);
        assert_eq!(osc.next_sample(48_000.0), 0.0);
        assert_eq!(osc.frequency(), 880.0);
    }
}
