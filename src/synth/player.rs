use crate::synth::{message::ToneReceiver, voice::ToneVoice};

/// Default number of simultaneous bursts. At 50ms per tone even very fast
/// subdivisions overlap only a handful of voices.
pub const DEFAULT_VOICES: usize = 8;

const VOICE_AMPLITUDE: f32 = 0.5;

/// Renders scheduled tone bursts inside the output callback.
///
/// Owns the consumer side of the tone queue and a frame counter that defines
/// the stream clock: frame `n` plays at `n / sample_rate` seconds.
pub struct TonePlayer<R: ToneReceiver> {
    voices: Vec<ToneVoice>,
    rx: R,
    sample_rate: f32,
    frame_counter: u64,
    dropped: u64,
}

impl<R: ToneReceiver> TonePlayer<R> {
    pub fn new(sample_rate: f32, max_voices: usize, rx: R) -> Self {
        let voices = (0..max_voices.max(1))
            .map(|_| ToneVoice::new(VOICE_AMPLITUDE))
            .collect();

        Self {
            voices,
            rx,
            sample_rate,
            frame_counter: 0,
            dropped: 0,
        }
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        let block_start = self.frame_counter;

        while let Some(cmd) = self.rx.pop() {
            let start_frame = self.seconds_to_frame(cmd.start);
            let stop_frame = self.seconds_to_frame(cmd.stop);

            // Already over by the time we see it
            if stop_frame <= block_start {
                self.dropped += 1;
                continue;
            }

            let age = self.frame_counter;
            let voice = self.allocate_voice();
            voice.assign(cmd.frequency, start_frame, stop_frame, age);
        }

        out.fill(0.0);
        for voice in &mut self.voices {
            if !voice.is_free() {
                voice.render_add(out, block_start, self.sample_rate);
            }
        }

        self.frame_counter += out.len() as u64;
    }

    /// Frames rendered since the stream started
    pub fn frames_rendered(&self) -> u64 {
        self.frame_counter
    }

    /// Tones discarded because their stop time had already passed
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_free()).count()
    }

    fn seconds_to_frame(&self, seconds: f64) -> u64 {
        (seconds * self.sample_rate as f64).round().max(0.0) as u64
    }

    fn allocate_voice(&mut self) -> &mut ToneVoice {
        let idx = self
            .voices
            .iter()
            .position(|v| v.is_free())
            .or_else(|| {
                // Steal the oldest voice
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.age())
                    .map(|(idx, _)| idx)
            })
            .unwrap_or(0);

        &mut self.voices[idx]
    }
}
