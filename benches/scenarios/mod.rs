//! Realtime path benchmarks.
//!
//! These model what runs inside the audio callbacks and on each tick pulse.

mod detection;
mod scheduling;
mod tones;

pub use detection::bench_detection;
pub use scheduling::bench_scheduling;
pub use tones::bench_tones;
