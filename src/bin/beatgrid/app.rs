//! App - wires devices, pulse thread and session, then runs the UI loop

use std::time::Duration;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{info, warn};

use beatgrid::{
    analysis::{BeatDetector, DetectedBeat, DetectorLink},
    engine::{drain_pulses, Metronome, Pulse, StreamClock, TickDriver, PULSE_INTERVAL},
    io::{open_input, open_output, InputStream, OutputStream},
    Settings, ToneCommand,
};

use crate::{
    ui::{self, Status},
    Args,
};

const CONTROL_QUEUE_SIZE: usize = 16;
const BEAT_QUEUE_SIZE: usize = 64;

/// Tempo step for the +/- keys
const BPM_STEP: f64 = 1.0;

pub struct App {
    args: Args,
    metronome: Metronome<StreamClock, Producer<ToneCommand>>,
    pulse_rx: Consumer<Pulse>,
    beat_rx: Option<Consumer<DetectedBeat>>,
    output: OutputStream,
    // Held to keep the input callback running
    _input: Option<InputStream>,
    status: Status,
    should_quit: bool,
}

impl App {
    pub fn open(args: Args, settings: &Settings) -> EyreResult<Self> {
        let (tone_tx, tone_rx) = RingBuffer::<ToneCommand>::new(settings.audio.tone_queue);
        let output = open_output(settings.audio.voices, tone_rx)
            .wrap_err("failed to open audio output")?;
        let clock = output.clock().clone();

        let (driver, pulse_rx) =
            TickDriver::spawn(PULSE_INTERVAL).wrap_err("failed to spawn pulse thread")?;

        let mut metronome = Metronome::new(settings, clock.clone(), tone_tx, Box::new(driver))?;

        let (input, beat_rx) = if settings.detector.enabled {
            let (control_tx, control_rx) = RingBuffer::new(CONTROL_QUEUE_SIZE);
            let (beat_tx, beat_rx) = RingBuffer::new(BEAT_QUEUE_SIZE);
            let detector = BeatDetector::new(settings.detector_settings());
            let link = DetectorLink::new(detector, control_rx, beat_tx);

            let input = open_input(clock, link)
                .wrap_err("failed to open audio input (use --no-input to run without it)")?;
            metronome = metronome.with_detector(control_tx);
            (Some(input), Some(beat_rx))
        } else {
            info!("beat detection disabled");
            (None, None)
        };

        Ok(Self {
            args,
            metronome,
            pulse_rx,
            beat_rx,
            output,
            _input: input,
            status: Status::Ready,
            should_quit: false,
        })
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_pulses();
            self.poll_beats();

            let snapshot = self.metronome.snapshot();
            let view = ui::View {
                snapshot: &snapshot,
                status: &self.status,
                input_enabled: self.beat_rx.is_some(),
                sample_rate: self.output.sample_rate(),
            };
            terminal.draw(|frame| ui::render(frame, &view))?;

            // Non-blocking, ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.metronome.stop();
        Ok(())
    }

    /// One scheduling pass catches up however many pulses queued.
    ///
    /// Scheduling runs here on the UI thread, so it keeps the UI loop's cadence
    /// (input poll timeout plus draw), not the pulse thread's. The pulse thread
    /// only signals; `SCHEDULE_MARGIN` has to absorb a slow frame.
    fn poll_pulses(&mut self) {
        if drain_pulses(&mut self.pulse_rx) == 0 {
            return;
        }

        if let Err(err) = self.metronome.on_pulse() {
            self.metronome.stop();
            self.status = Status::Error(format!("scheduling failed ({err}), stopped"));
        }
    }

    fn poll_beats(&mut self) {
        let Some(beat_rx) = &mut self.beat_rx else {
            return;
        };
        while let Ok(beat) = beat_rx.pop() {
            self.metronome.record_beat(beat);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                let playing = self.metronome.toggle();
                self.status = if playing { Status::Playing } else { Status::Ready };
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_bpm(BPM_STEP),
            KeyCode::Char('-') | KeyCode::Char('_') => self.nudge_bpm(-BPM_STEP),
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload(),
            _ => {}
        }
    }

    fn nudge_bpm(&mut self, step: f64) {
        let bpm = self.metronome.tempo().bpm() + step;
        match self.metronome.set_bpm(bpm) {
            Ok(true) => {
                info!(bpm, "tempo changed");
                self.status = Status::Info(format!("tempo {bpm:.0} bpm"));
            }
            Ok(false) => self.status = Status::Info("stop playback to change tempo".into()),
            Err(err) => self.status = Status::Error(err.to_string()),
        }
    }

    fn reload(&mut self) {
        let result = self
            .args
            .load_settings()
            .and_then(|settings| self.metronome.apply_settings(&settings));

        self.status = match result {
            Ok(()) if self.metronome.is_playing() => {
                Status::Info("settings reloaded, tempo applies at next start".into())
            }
            Ok(()) => Status::Info("settings reloaded".into()),
            Err(err) => {
                warn!(%err, "settings reload failed");
                Status::Error(format!("reload failed: {err}"))
            }
        };
    }
}
