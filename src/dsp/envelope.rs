use crate::MIN_TIME;

/*
Gate Envelope
=============

A tone burst that starts and stops abruptly clicks: the waveform jumps from
silence to full level in one sample. This envelope softens both edges with
short linear ramps and holds full level in between.

    Level
      1.0 ┐   ______________
          │  ╱              ╲
      0.0 └─╱────────────────╲──→ Time
          Attack   Hold    Release
          gate on        gate off

The hold stage lasts as long as the gate is high, so the burst length is set
by whoever opens and closes the gate (the tone player, from the command's
start and stop times). Release always starts from the current level, so a
gate that closes mid-attack still fades out cleanly.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Hold,
    Release,
}

#[derive(Debug, Clone)]
pub struct GateEnvelope {
    attack_time: f32,
    release_time: f32,

    stage: EnvelopeState,
    level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl GateEnvelope {
    /// Default edges used for metronome clicks: 2ms in, 5ms out
    pub fn click() -> Self {
        Self::new(0.002, 0.005)
    }

    pub fn new(attack: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            release_time: release.max(MIN_TIME),
            stage: EnvelopeState::Idle,
            level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    pub fn gate_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    pub fn gate_off(&mut self, sample_rate: f32) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }
            EnvelopeState::Attack => {
                self.level += 1.0 / (self.attack_time * sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeState::Hold;
                }
            }
            EnvelopeState::Hold => {
                self.level = 1.0;
            }
            EnvelopeState::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);
                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.release_elapsed_samples = 0;
        self.release_start_level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn render_samples(env: &mut GateEnvelope, samples: usize) {
        for _ in 0..samples {
            env.next_sample(SAMPLE_RATE);
        }
    }

    #[test]
    fn attack_reaches_hold() {
        let mut env = GateEnvelope::new(0.01, 0.02);
        env.gate_on();
        render_samples(&mut env, 10);

        assert!(env.level() > 0.99);
        assert_eq!(env.state(), EnvelopeState::Hold);
    }

    #[test]
    fn release_falls_back_to_idle() {
        let mut env = GateEnvelope::new(0.01, 0.02);
        env.gate_on();
        render_samples(&mut env, 15);

        env.gate_off(SAMPLE_RATE);
        render_samples(&mut env, 22);

        assert!(env.level() <= 0.001);
        assert!(!env.is_active());
    }

    #[test]
    fn gate_off_while_idle_is_ignored() {
        let mut env = GateEnvelope::click();
        env.gate_off(SAMPLE_RATE);
        assert_eq!(env.state(), EnvelopeState::Idle);
    }
}
