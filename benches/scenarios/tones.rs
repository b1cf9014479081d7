//! Benchmarks for the output callback: queued tones rendered by the player.

use std::hint::black_box;

use beatgrid::{
    engine::StreamClock,
    io::device::render_interleaved,
    synth::{ToneCommand, TonePlayer, DEFAULT_VOICES},
};
use criterion::{BenchmarkId, Criterion};
use rtrb::RingBuffer;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: u32 = 48_000;

pub fn bench_tones(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/tones");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === SILENCE ===
        // Nothing scheduled: the cost of an idle metronome
        let (_tx, rx) = RingBuffer::<ToneCommand>::new(16);
        let mut idle = TonePlayer::new(SAMPLE_RATE as f32, DEFAULT_VOICES, rx);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| idle.render_block(black_box(&mut buffer)))
        });

        // === OVERLAPPING BURSTS ===
        // A new tone every block, so several voices are always sounding
        let (mut tx, rx) = RingBuffer::<ToneCommand>::new(16);
        let mut busy = TonePlayer::new(SAMPLE_RATE as f32, DEFAULT_VOICES, rx);
        group.bench_with_input(BenchmarkId::new("overlapping", size), &size, |b, _| {
            b.iter(|| {
                let now = busy.frames_rendered() as f64 / SAMPLE_RATE as f64;
                let _ = tx.push(ToneCommand {
                    start: now,
                    stop: now + 0.05,
                    frequency: 440.0,
                });
                busy.render_block(black_box(&mut buffer));
            })
        });

        // === FULL CALLBACK ===
        // Stereo interleave plus clock publish, as the device sees it
        let (mut tx, rx) = RingBuffer::<ToneCommand>::new(16);
        let mut player = TonePlayer::new(SAMPLE_RATE as f32, DEFAULT_VOICES, rx);
        let clock = StreamClock::new(SAMPLE_RATE);
        let mut render_buf = vec![0.0f32; size];
        let mut data = vec![0.0f32; size * 2];
        group.bench_with_input(BenchmarkId::new("callback_stereo", size), &size, |b, _| {
            b.iter(|| {
                let now = player.frames_rendered() as f64 / SAMPLE_RATE as f64;
                let _ = tx.push(ToneCommand {
                    start: now,
                    stop: now + 0.05,
                    frequency: 880.0,
                });
                render_interleaved(&mut player, &clock, &mut render_buf, black_box(&mut data), 2);
            })
        });
    }

    group.finish();
}
