//! Low-level DSP primitives used by the tone player.
//!
//! These components are allocation-free and realtime-safe, so they can live
//! directly inside voice structs rendered from the output callback.

/// Attack/hold/release gate for click-free tone bursts.
pub mod envelope;
/// Phase-accumulating sine oscillator.
pub mod oscillator;

pub use envelope::{EnvelopeState, GateEnvelope};
pub use oscillator::SineOscillator;
