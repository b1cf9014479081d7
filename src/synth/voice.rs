use crate::dsp::{GateEnvelope, SineOscillator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Pending,   // Tone accepted, start frame not reached yet
    Active,    // Gate open
    Releasing, // Gate closed, envelope fading out
}

/// A single tone burst bound to absolute frame positions
pub struct ToneVoice {
    state: VoiceState,
    start_frame: u64,
    stop_frame: u64,
    age: u64,
    amplitude: f32,
    osc: SineOscillator,
    env: GateEnvelope,
}

impl ToneVoice {
    pub fn new(amplitude: f32) -> Self {
        Self {
            state: VoiceState::Free,
            start_frame: 0,
            stop_frame: 0,
            age: 0,
            amplitude,
            osc: SineOscillator::new(440.0),
            env: GateEnvelope::click(),
        }
    }

    pub fn assign(&mut self, frequency: f32, start_frame: u64, stop_frame: u64, age: u64) {
        self.osc.retrigger(frequency);
        self.env.reset();
        self.start_frame = start_frame;
        self.stop_frame = stop_frame.max(start_frame + 1);
        self.age = age;
        self.state = VoiceState::Pending;
    }

    /// Mix this voice into `out`, where `out[0]` is absolute frame `block_start`.
    pub fn render_add(&mut self, out: &mut [f32], block_start: u64, sample_rate: f32) {
        for (i, sample) in out.iter_mut().enumerate() {
            let frame = block_start + i as u64;

            if self.state == VoiceState::Pending && frame >= self.start_frame {
                self.env.gate_on();
                self.state = VoiceState::Active;
            }
            if self.state == VoiceState::Active && frame >= self.stop_frame {
                self.env.gate_off(sample_rate);
                self.state = VoiceState::Releasing;
            }

            match self.state {
                VoiceState::Active | VoiceState::Releasing => {
                    let level = self.env.next_sample(sample_rate);
                    *sample += self.osc.next_sample(sample_rate) * level * self.amplitude;

                    if self.state == VoiceState::Releasing && !self.env.is_active() {
                        self.free();
                        return;
                    }
                }
                VoiceState::Free | VoiceState::Pending => {}
            }
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn frequency(&self) -> f32 {
        self.osc.frequency()
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.env.reset();
    }
}
