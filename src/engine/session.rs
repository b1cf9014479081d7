//! Metronome session - the owner of all scheduling-side state.
//!
//! Lives on one thread. It is the only writer of the cursor, the scheduled
//! queue and the beat history; pulses and detected beats reach it as
//! messages, and the display gets read-only snapshots.

use rtrb::Producer;
use tracing::{debug, info, warn};

use crate::{
    analysis::{
        bar_number, position_in_bar, BeatHistory, Calibration, DetectedBeat, DetectorControl,
        DetectorSettings,
    },
    config::{ConfigError, Settings},
    engine::{
        clock::Clock,
        pulse::PulseControl,
        scheduler::{NoteScheduler, ScheduleCursor, ScheduleError, ScheduledNote},
    },
    sequencing::{TempoConfig, TempoError},
    synth::message::ToneSink,
};

/// A detected beat placed on the bar grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatMark {
    pub beat: DetectedBeat,
    pub position_in_bar: f64,
    pub bar_number: i64,
}

/// Everything the display needs for one refresh
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySnapshot {
    pub bpm: f64,
    pub tempo: TempoConfig,
    pub cursor: ScheduleCursor,
    pub is_playing: bool,
    pub current_index: u32,
    pub scheduled: Vec<ScheduledNote>,
    pub detected: Vec<BeatMark>,
    /// None until the first start
    pub position_in_bar: Option<f64>,
    pub bar_number: Option<i64>,
    pub delay: f64,
    pub now: f64,
}

pub struct Metronome<C: Clock, S: ToneSink> {
    clock: C,
    sink: S,
    pulse: Box<dyn PulseControl + Send>,
    scheduler: NoteScheduler,
    beats: BeatHistory,
    calibration: Calibration,
    detector_settings: DetectorSettings,
    detector_tx: Option<Producer<DetectorControl>>,
    /// Settings that arrived while playing, applied at the next start
    pending: Option<Settings>,
}

impl<C: Clock, S: ToneSink> Metronome<C, S> {
    pub fn new(
        settings: &Settings,
        clock: C,
        sink: S,
        pulse: Box<dyn PulseControl + Send>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;

        Ok(Self {
            clock,
            sink,
            pulse,
            scheduler: NoteScheduler::new(settings.tempo()?),
            beats: BeatHistory::new(settings.detector.history_capacity),
            calibration: Calibration::from_mode(settings.calibration),
            detector_settings: settings.detector_settings(),
            detector_tx: None,
            pending: None,
        })
    }

    /// Connect the control channel of a detector running on the input callback.
    pub fn with_detector(mut self, controls: Producer<DetectorControl>) -> Self {
        self.detector_tx = Some(controls);
        self
    }

    pub fn start(&mut self) -> bool {
        if self.scheduler.is_playing() {
            return false;
        }

        if let Some(settings) = self.pending.take() {
            self.load(&settings);
        }

        let now = self.clock.now();
        self.scheduler.start(now);
        self.beats.clear();
        self.calibration.restart();
        self.send_detector(DetectorControl::Reset(self.detector_settings));
        self.pulse.activate();

        info!(
            bpm = self.scheduler.tempo().bpm(),
            start_time = ?self.scheduler.start_time(),
            "playback started"
        );
        true
    }

    pub fn stop(&mut self) -> bool {
        if !self.scheduler.stop() {
            return false;
        }
        self.pulse.deactivate();
        info!(queued = self.scheduler.queue().len(), "playback stopped");
        true
    }

    /// Returns whether playback is running afterwards.
    pub fn toggle(&mut self) -> bool {
        if self.scheduler.is_playing() {
            self.stop();
        } else {
            self.start();
        }
        self.scheduler.is_playing()
    }

    /// Handle one tick pulse.
    pub fn on_pulse(&mut self) -> Result<usize, ScheduleError> {
        let now = self.clock.now();
        let result = self.scheduler.on_tick_pulse(now, &mut self.sink);
        if let Err(err) = &result {
            warn!(%err, now, "scheduling pass failed");
        }
        result
    }

    pub fn record_beat(&mut self, beat: DetectedBeat) {
        debug!(time = beat.time, amplitude = beat.amplitude, "beat detected");

        if self.scheduler.is_playing() {
            if let Some(start) = self.scheduler.start_time() {
                let was = self.calibration.delay();
                self.calibration
                    .observe(beat.time, start, self.scheduler.tempo().seconds_per_beat());
                let delay = self.calibration.delay();
                if delay != was {
                    info!(delay, "latency estimated");
                }
            }
        }
        self.beats.push(beat);
    }

    /// Take new settings. Detector thresholds apply immediately; tempo and
    /// calibration wait for the next start if playback is running.
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        settings.validate()?;

        self.detector_settings = settings.detector_settings();
        self.send_detector(DetectorControl::Refresh(self.detector_settings));

        if self.scheduler.is_playing() {
            self.pending = Some(settings.clone());
            info!("settings stored until next start");
        } else {
            self.load(settings);
            info!(bpm = settings.tempo.bpm, "settings applied");
        }
        Ok(())
    }

    /// Change the tempo while stopped. Returns false when playing.
    pub fn set_bpm(&mut self, bpm: f64) -> Result<bool, TempoError> {
        let tempo = self.scheduler.tempo().with_bpm(bpm)?;
        Ok(self.scheduler.set_tempo(tempo))
    }

    /// Consume due notes and produce the display state at the current time.
    pub fn snapshot(&mut self) -> DisplaySnapshot {
        let now = self.clock.now();
        self.scheduler.drain_due(now);

        let tempo = *self.scheduler.tempo();
        let seconds_per_bar = tempo.seconds_per_bar();
        let delay = self.calibration.delay();
        let start = self.scheduler.start_time();

        let detected = match start {
            Some(start) => self
                .beats
                .iter()
                .map(|&beat| BeatMark {
                    beat,
                    position_in_bar: position_in_bar(beat.time, start, seconds_per_bar, delay),
                    bar_number: bar_number(beat.time, start, seconds_per_bar, delay),
                })
                .collect(),
            None => Vec::new(),
        };

        DisplaySnapshot {
            bpm: tempo.bpm(),
            tempo,
            cursor: self.scheduler.cursor(),
            is_playing: self.scheduler.is_playing(),
            current_index: self.scheduler.current_index(),
            scheduled: self.scheduler.queue().iter().copied().collect(),
            detected,
            position_in_bar: start.map(|s| position_in_bar(now, s, seconds_per_bar, delay)),
            bar_number: start.map(|s| bar_number(now, s, seconds_per_bar, delay)),
            delay,
            now,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn tempo(&self) -> &TempoConfig {
        self.scheduler.tempo()
    }

    pub fn scheduler(&self) -> &NoteScheduler {
        &self.scheduler
    }

    pub fn beats(&self) -> &BeatHistory {
        &self.beats
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn load(&mut self, settings: &Settings) {
        // Validated by the caller
        if let Ok(tempo) = settings.tempo() {
            self.scheduler.set_tempo(tempo);
        }
        self.calibration = Calibration::from_mode(settings.calibration);
        if self.beats.capacity() != settings.detector.history_capacity {
            self.beats = BeatHistory::new(settings.detector.history_capacity);
        }
        self.detector_settings = settings.detector_settings();
    }

    fn send_detector(&mut self, control: DetectorControl) {
        if let Some(tx) = &mut self.detector_tx {
            if tx.push(control).is_err() {
                warn!("detector control queue full, settings not delivered");
            }
        }
    }
}
