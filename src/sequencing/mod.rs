pub mod tempo;

pub use tempo::{TempoConfig, TempoError};
