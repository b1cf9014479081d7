//! cpal streams for the metronome.
//!
//! The output stream owns the [`TonePlayer`] and is the only writer of the
//! [`StreamClock`]. The input stream owns the [`DetectorLink`] and stamps
//! every frame with that same clock, so scheduled tones and detected beats
//! share one time axis.
//!
//! Both callbacks are allocation-free and lock-free once running.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::Consumer;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    analysis::DetectorLink,
    engine::clock::{Clock, StreamClock},
    synth::{message::ToneReceiver, ToneCommand, TonePlayer},
    MAX_BLOCK_SIZE,
};

/// Samples per detector frame
pub const INPUT_FRAME_SIZE: usize = 256;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no default {0} device available")]
    NoDevice(&'static str),
    #[error("failed to fetch default {direction} config: {source}")]
    Config {
        direction: &'static str,
        #[source]
        source: cpal::DefaultStreamConfigError,
    },
    #[error("failed to build {direction} stream: {source}")]
    StreamBuild {
        direction: &'static str,
        #[source]
        source: cpal::BuildStreamError,
    },
    #[error("failed to start stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

/// Running output stream. Dropping it stops audio.
pub struct OutputStream {
    _stream: cpal::Stream,
    clock: StreamClock,
    channels: usize,
}

impl OutputStream {
    pub fn clock(&self) -> &StreamClock {
        &self.clock
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate() as u32
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

/// Running input stream. Dropping it stops detection.
pub struct InputStream {
    _stream: cpal::Stream,
    sample_rate: u32,
}

impl InputStream {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Open the default output device and start rendering queued tones.
pub fn open_output(voices: usize, tones: Consumer<ToneCommand>) -> Result<OutputStream, AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(AudioError::NoDevice("output"))?;
    let config = device
        .default_output_config()
        .map_err(|source| AudioError::Config {
            direction: "output",
            source,
        })?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let clock = StreamClock::new(sample_rate);

    let name = device.name().unwrap_or_default();
    info!(device = %name, sample_rate, channels, "opening output stream");

    let mut player = TonePlayer::new(sample_rate as f32, voices, tones);
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];
    let writer = clock.clone();

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                render_interleaved(&mut player, &writer, &mut render_buf, data, channels);
            },
            |err| error!(%err, "output stream error"),
            None,
        )
        .map_err(|source| AudioError::StreamBuild {
            direction: "output",
            source,
        })?;

    stream.play()?;

    Ok(OutputStream {
        _stream: stream,
        clock,
        channels,
    })
}

/// Open the default input device and feed its frames to the detector.
///
/// `clock` must be the output stream's clock.
pub fn open_input(clock: StreamClock, mut link: DetectorLink) -> Result<InputStream, AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(AudioError::NoDevice("input"))?;
    let config = device
        .default_input_config()
        .map_err(|source| AudioError::Config {
            direction: "input",
            source,
        })?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;

    let name = device.name().unwrap_or_default();
    info!(device = %name, sample_rate, channels, "opening input stream");

    let mut frame_buf = vec![0.0f32; INPUT_FRAME_SIZE];

    let stream = device
        .build_input_stream(
            &config.into(),
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                feed_detector(&mut link, &clock, &mut frame_buf, data, channels, sample_rate);
            },
            |err| error!(%err, "input stream error"),
            None,
        )
        .map_err(|source| AudioError::StreamBuild {
            direction: "input",
            source,
        })?;

    stream.play()?;

    Ok(InputStream {
        _stream: stream,
        sample_rate,
    })
}

/// Render tones into an interleaved buffer, mono on every channel, then
/// publish the new stream position.
pub fn render_interleaved<R: ToneReceiver>(
    player: &mut TonePlayer<R>,
    clock: &StreamClock,
    render_buf: &mut [f32],
    data: &mut [f32],
    channels: usize,
) {
    let channels = channels.max(1);
    let block_size = render_buf.len().max(1);
    let total_frames = data.len() / channels;
    let mut frames_written = 0;

    while frames_written < total_frames {
        let frames_to_render = (total_frames - frames_written).min(block_size);
        let block = &mut render_buf[..frames_to_render];
        player.render_block(block);

        let out_off = frames_written * channels;
        for (i, &s) in block.iter().enumerate() {
            let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
            frame.fill(s);
        }

        frames_written += frames_to_render;
    }

    clock.publish(player.frames_rendered());
}

/// Split an interleaved input buffer into detector frames (first channel
/// only), each stamped with the shared clock.
pub fn feed_detector(
    link: &mut DetectorLink,
    clock: &StreamClock,
    frame_buf: &mut [f32],
    data: &[f32],
    channels: usize,
    sample_rate: u32,
) {
    let channels = channels.max(1);
    let frame_size = frame_buf.len().max(1);
    let base = clock.now();
    let total = data.len() / channels;
    let mut offset = 0;

    while offset < total {
        let len = (total - offset).min(frame_size);
        for (i, sample) in frame_buf[..len].iter_mut().enumerate() {
            *sample = data[(offset + i) * channels];
        }

        let frame_time = base + offset as f64 / sample_rate as f64;
        link.process(&frame_buf[..len], frame_time);
        offset += len;
    }
}
