//! Transcoding of intermediate waveforms into final clips

pub mod ffmpeg;

use std::io;
use std::path::Path;
use thiserror::Error;

pub use ffmpeg::FfmpegTranscoder;

/// Fixed audio parameters for every clip
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    /// Encoder executable (name on PATH or full path)
    pub program: String,

    /// Linear volume multiplier; synthesized speech is quiet, 2.5 is about +8 dB
    pub gain: f32,

    pub channels: u8,

    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// Target bitrate in encoder syntax (e.g. "128k")
    pub bitrate: String,

    /// Audio codec (libvorbis for .ogg)
    pub codec: String,
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            gain: 2.5,
            channels: 1,
            sample_rate: 44_100,
            bitrate: "128k".to_string(),
            codec: "libvorbis".to_string(),
        }
    }
}

/// Why a transcode did not produce a clip
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("{program} not found, install it with: {hint}")]
    NotFound { program: String, hint: String },

    #[error("encoder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Turns a waveform file into the final compressed clip
pub trait Transcoder {
    fn transcode(&self, src: &Path, dest: &Path, params: &EncodeParams) -> Result<(), EncodeError>;
}
