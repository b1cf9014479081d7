//! beatgrid - terminal metronome that shows where your claps land in the bar
//!
//! Run with: cargo run -- --bpm 96

mod app;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use beatgrid::{
    analysis::{calibration::DEFAULT_AUTO_SAMPLES, CalibrationMode},
    ConfigError, Settings,
};

/// Command-line arguments. Flags override the settings file.
#[derive(Parser, Debug, Clone)]
#[command(name = "beatgrid")]
#[command(about = "Visual metronome with clap detection")]
#[command(version)]
pub struct Args {
    /// Settings file (TOML)
    #[arg(short, long, env = "BEATGRID_CONFIG")]
    config: Option<PathBuf>,

    /// Tempo in beats per minute
    #[arg(long, env = "BEATGRID_BPM")]
    bpm: Option<f64>,

    /// Grid steps per beat
    #[arg(long, env = "BEATGRID_SUBDIVISIONS")]
    subdivisions: Option<u32>,

    #[arg(long, env = "BEATGRID_BEATS_PER_BAR")]
    beats_per_bar: Option<u32>,

    /// Peak level a frame must exceed to count as a beat
    #[arg(long, env = "BEATGRID_THRESHOLD")]
    threshold: Option<f32>,

    /// Minimum seconds between two detected beats
    #[arg(long, env = "BEATGRID_DEBOUNCE")]
    debounce: Option<f64>,

    /// Fixed input latency compensation in seconds
    #[arg(long, env = "BEATGRID_DELAY", conflicts_with = "auto_calibrate")]
    delay: Option<f64>,

    /// Estimate input latency from the first beats after start
    #[arg(long, env = "BEATGRID_AUTO_CALIBRATE")]
    auto_calibrate: bool,

    /// Run without the microphone
    #[arg(long, env = "BEATGRID_NO_INPUT")]
    no_input: bool,

    #[arg(long, env = "BEATGRID_LOG_FILE", default_value = "beatgrid.log")]
    log_file: PathBuf,
}

impl Args {
    /// Defaults, then the settings file, then flags.
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(bpm) = self.bpm {
            settings.tempo.bpm = bpm;
        }
        if let Some(subdivisions) = self.subdivisions {
            settings.tempo.subdivisions_per_beat = subdivisions;
        }
        if let Some(beats) = self.beats_per_bar {
            settings.tempo.beats_per_bar = beats;
        }
        if let Some(threshold) = self.threshold {
            settings.detector.beat_threshold = threshold;
        }
        if let Some(debounce) = self.debounce {
            settings.detector.beat_interval_min = debounce;
        }
        if let Some(delay) = self.delay {
            settings.calibration = CalibrationMode::Manual { delay };
        }
        if self.auto_calibrate {
            settings.calibration = CalibrationMode::Auto {
                samples: DEFAULT_AUTO_SAMPLES,
            };
        }
        if self.no_input {
            settings.detector.enabled = false;
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_file)?;

    let settings = args.load_settings().wrap_err("invalid settings")?;
    info!(
        bpm = settings.tempo.bpm,
        subdivisions = settings.tempo.subdivisions_per_beat,
        beats_per_bar = settings.tempo.beats_per_bar,
        "starting beatgrid"
    );

    let mut app = App::open(args, &settings)?;

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    info!("beatgrid exited");
    result
}

/// Log to a file; stdout belongs to the terminal UI.
fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "beatgrid=info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "beatgrid",
            "--bpm",
            "132",
            "--subdivisions",
            "3",
            "--auto-calibrate",
            "--no-input",
        ]);
        let settings = args.load_settings().unwrap();

        assert_eq!(settings.tempo.bpm, 132.0);
        assert_eq!(settings.tempo.subdivisions_per_beat, 3);
        assert_eq!(settings.tempo.beats_per_bar, 4);
        assert!(matches!(settings.calibration, CalibrationMode::Auto { .. }));
        assert!(!settings.detector.enabled);
    }

    #[test]
    fn invalid_flag_value_is_rejected() {
        let args = Args::parse_from(["beatgrid", "--bpm", "0"]);
        assert!(args.load_settings().is_err());
    }

    #[test]
    fn delay_conflicts_with_auto() {
        let result =
            Args::try_parse_from(["beatgrid", "--delay", "0.05", "--auto-calibrate"]);
        assert!(result.is_err());
    }
}
