//! Benchmarks for one tick pulse: look-ahead commit plus display drain.

use std::hint::black_box;

use beatgrid::{synth::ToneCommand, NoteScheduler, TempoConfig};
use criterion::Criterion;
use rtrb::RingBuffer;

pub fn bench_scheduling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/scheduling");

    // (bpm, subdivisions, beats): typical, and a dense grid that commits
    // several steps per pulse
    for (name, bpm, subdivisions, beats) in [("80bpm_8ths", 80.0, 2, 4), ("240bpm_32nds", 240.0, 8, 7)] {
        let tempo = TempoConfig::new(bpm, subdivisions, beats).expect("valid tempo");
        let mut scheduler = NoteScheduler::new(tempo);
        let (mut tx, mut rx) = RingBuffer::<ToneCommand>::new(256);
        let mut now = 0.0;
        scheduler.start(now);

        group.bench_function(name, |b| {
            b.iter(|| {
                now += 0.025;
                let _ = black_box(scheduler.on_tick_pulse(black_box(now), &mut tx));
                scheduler.drain_due(now);
                while rx.pop().is_ok() {}
            })
        });
    }

    group.finish();
}
