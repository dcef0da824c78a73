//! skillvoice - spoken skill-name clips
//!
//! Reads a list of (text, filename) jobs, synthesizes each phrase with a
//! cloud speech service, and transcodes the result into a compressed clip
//! with ffmpeg. Existing clips are skipped, so reruns pick up where a
//! previous run failed.

pub mod batch;
pub mod cli;
pub mod config;
pub mod encoder;
pub mod error;
pub mod jobs;
pub mod platform;
pub mod speech;

pub use error::{GeneratorError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "skillvoice";
