//! Speech synthesis

pub mod backends;
pub mod ssml;
pub mod synth;

pub use ssml::{build_ssml, derive_rate};
pub use synth::{SynthesisError, Synthesizer};
