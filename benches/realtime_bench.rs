//! Benchmarks for the realtime paths.
//!
//! Run with: cargo bench
//!
//! The output and input callbacks must finish well inside one buffer period.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Tone primitives (oscillator, envelope)
//!   - scenarios/*  Output callback rendering, detector frames, scheduling pulses

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    // Tone primitives
    dsp::bench_oscillator,
    dsp::bench_envelope,
    // Realtime paths
    scenarios::bench_tones,
    scenarios::bench_detection,
    scenarios::bench_scheduling,
);
criterion_main!(benches);
