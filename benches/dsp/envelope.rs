//! Benchmarks for the click-free gate envelope.

use std::hint::black_box;

use beatgrid::dsp::GateEnvelope;
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Gate held open (attack then hold)
        let mut env = GateEnvelope::click();
        env.gate_on();
        group.bench_with_input(BenchmarkId::new("hold", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = env.next_sample(black_box(SAMPLE_RATE));
                }
            })
        });

        // Closing gate, re-opened every block so the release never finishes
        let mut env = GateEnvelope::new(0.001, 0.05);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.gate_on();
                env.gate_off(SAMPLE_RATE);
                for sample in buffer.iter_mut() {
                    *sample = env.next_sample(black_box(SAMPLE_RATE));
                }
            })
        });
    }

    group.finish();
}
