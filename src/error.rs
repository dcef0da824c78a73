//! Error types for skillvoice
//!
//! `GeneratorError` covers failures that stop a run before any job is
//! attempted. Per-job failures live next to the collaborator that produces
//! them (`SynthesisError`, `EncodeError`) and never escape the batch loop.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Startup/configuration error
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0} is not set (add it to the environment or a .env file)")]
    MissingEnv(&'static str),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Settings file error: {0}")]
    Settings(String),

    #[error("Job file error: {0}")]
    JobFile(String),

    #[error("No valid skill entries found")]
    NoValidJobs,

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for skillvoice operations
pub type Result<T> = std::result::Result<T, GeneratorError>;
