//! Benchmarks for the sine oscillator.

use std::hint::black_box;

use beatgrid::dsp::SineOscillator;
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // One oscillator per pitch tier
        for frequency in [880.0, 440.0, 220.0] {
            let mut osc = SineOscillator::new(frequency);
            group.bench_with_input(
                BenchmarkId::new(format!("sine_{frequency}"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        osc.render(black_box(&mut buffer), black_box(48_000.0));
                    })
                },
            );
        }
    }

    group.finish();
}
