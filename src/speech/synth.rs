//! Speech synthesizer abstraction
//!
//! The generator only needs one thing from a speech backend: turn a
//! markup document into a waveform file. Backends implement `Synthesizer`.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Why a synthesis request did not complete
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The service answered but did not produce audio
    #[error("synthesis canceled: {reason}")]
    Canceled { reason: String, details: Option<String> },

    /// The request never got a usable answer
    #[error("request failed: {0}")]
    Request(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SynthesisError {
    /// Extra diagnostics worth showing under the main message
    pub fn details(&self) -> Option<&str> {
        match self {
            SynthesisError::Canceled { details, .. } => details.as_deref(),
            _ => None,
        }
    }
}

/// Speech synthesizer trait
///
/// Implementations write the complete waveform to `dest` or return an
/// error; a failed call must not leave a partial file behind.
pub trait Synthesizer {
    /// Synthesize an SSML document into a waveform file
    fn synthesize_to_file(&mut self, ssml: &str, dest: &Path) -> Result<(), SynthesisError>;
}
