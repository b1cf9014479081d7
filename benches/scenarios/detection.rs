//! Benchmarks for the input callback: frames through the beat detector.

use std::hint::black_box;

use beatgrid::{
    analysis::{BeatDetector, DetectorLink, DetectorSettings, PeakMode},
    engine::StreamClock,
    io::device::feed_detector,
};
use criterion::{BenchmarkId, Criterion};
use rtrb::RingBuffer;

use crate::BLOCK_SIZES;

pub fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/detection");

    for &size in BLOCK_SIZES {
        // Low-level noise with one spike near the end
        let frame: Vec<f32> = (0..size)
            .map(|i| if i == size - 3 { 0.7 } else { ((i % 7) as f32 - 3.0) * 0.004 })
            .collect();

        for mode in [PeakMode::Signed, PeakMode::Rectified] {
            let mut detector = BeatDetector::new(DetectorSettings {
                peak_mode: mode,
                ..DetectorSettings::default()
            });
            let mut t = 0.0;
            group.bench_with_input(
                BenchmarkId::new(format!("{mode:?}").to_lowercase(), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        t += 0.01;
                        black_box(detector.on_audio_frame(black_box(&frame), t));
                    })
                },
            );
        }

        // Full input callback: downmix, stamp, detect, forward
        let (_control_tx, control_rx) = RingBuffer::new(4);
        let (beat_tx, mut beat_rx) = RingBuffer::new(64);
        let mut link = DetectorLink::new(
            BeatDetector::new(DetectorSettings::default()),
            control_rx,
            beat_tx,
        );
        let clock = StreamClock::new(48_000);
        let stereo: Vec<f32> = frame.iter().flat_map(|&s| [s, s]).collect();
        let mut frame_buf = vec![0.0f32; 256];
        let mut frames = 0u64;
        group.bench_with_input(BenchmarkId::new("callback_stereo", size), &size, |b, _| {
            b.iter(|| {
                frames += size as u64 * 8;
                clock.publish(frames);
                feed_detector(&mut link, &clock, &mut frame_buf, black_box(&stereo), 2, 48_000);
                while beat_rx.pop().is_ok() {}
            })
        });
    }

    group.finish();
}
