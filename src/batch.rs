//! Batch orchestration
//!
//! Jobs run one after another: skip if the clip exists, synthesize to an
//! intermediate waveform, transcode, clean up. A failing job is reported
//! and counted; it never stops the batch.

use crate::config::GeneratorConfig;
use crate::encoder::{EncodeError, Transcoder};
use crate::jobs::Job;
use crate::speech::{build_ssml, derive_rate, SynthesisError, Synthesizer};
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Why a single job failed
#[derive(Error, Debug)]
pub enum JobFailure {
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("transcode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// What happened to one job
#[derive(Debug)]
pub enum JobOutcome {
    /// Clip was already present; nothing was called
    Skipped,
    Generated,
    Failed(JobFailure),
}

impl JobOutcome {
    /// Skipped clips count as successes so reruns are idempotent
    pub fn is_success(&self) -> bool {
        !matches!(self, JobOutcome::Failed(_))
    }
}

/// Tally of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunResult {
    pub total: usize,
    /// Generated plus skipped
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunResult {
    pub fn record(&mut self, outcome: &JobOutcome) {
        self.total += 1;
        match outcome {
            JobOutcome::Skipped => {
                self.succeeded += 1;
                self.skipped += 1;
            }
            JobOutcome::Generated => self.succeeded += 1,
            JobOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Process exit code: 0 only when every job succeeded
    pub fn exit_code(&self) -> i32 {
        if self.all_succeeded() {
            0
        } else {
            1
        }
    }
}

/// Runs jobs against a synthesizer and a transcoder
pub struct Generator<'a, S, T> {
    config: &'a GeneratorConfig,
    synth: S,
    transcoder: T,
}

impl<'a, S: Synthesizer, T: Transcoder> Generator<'a, S, T> {
    pub fn new(config: &'a GeneratorConfig, synth: S, transcoder: T) -> Self {
        Self {
            config,
            synth,
            transcoder,
        }
    }

    pub fn synthesizer(&self) -> &S {
        &self.synth
    }

    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    /// Print the settings this run uses
    pub fn print_summary(&self, region: &str) {
        println!("✅ Initialized");
        println!("   Output directory: {}", self.config.output_dir.display());
        println!("   Voice: {}", self.config.voice);
        println!("   Rate: {}", self.config.rate);
        println!("   Region: {}", region);
    }

    /// Markup for a job: the override verbatim, or generated from the text
    pub fn markup_for(&self, job: &Job) -> String {
        if let Some(ssml) = &job.ssml {
            debug!("Using SSML override for {}", job.filename);
            return ssml.clone();
        }

        let rate = derive_rate(&job.text, &self.config.rate);
        if self.config.rate.is_default() {
            println!("   ℹ️  Auto rate: '{}' -> {}x", job.text, rate);
        }
        build_ssml(&job.text, &self.config.voice, &self.config.language, &rate)
    }

    /// Generate one clip, reporting progress on stdout
    pub fn generate_one(&mut self, job: &Job) -> JobOutcome {
        let output = self.config.output_path(&job.filename);

        if output.exists() {
            println!("⏩ Skipped (already exists): {}", job.filename);
            return JobOutcome::Skipped;
        }

        match self.synthesize_and_encode(job, &output) {
            Ok(()) => {
                println!("✅ {}: '{}'", job.filename, job.text);
                JobOutcome::Generated
            }
            Err(failure) => {
                report_failure(&failure);
                JobOutcome::Failed(failure)
            }
        }
    }

    fn synthesize_and_encode(&mut self, job: &Job, output: &Path) -> Result<(), JobFailure> {
        let intermediate = self.config.intermediate_path(&job.filename);
        ensure_parent(&intermediate)?;
        ensure_parent(output)?;

        let ssml = self.markup_for(job);
        self.synth.synthesize_to_file(&ssml, &intermediate)?;
        debug!("Synthesized {}", intermediate.display());

        self.transcoder
            .transcode(&intermediate, output, &self.config.encode)?;
        debug!("Encoded {}", output.display());

        remove_intermediate(&intermediate);
        Ok(())
    }

    /// Run every job in order and print the tally
    pub fn run_batch(&mut self, jobs: &[Job]) -> RunResult {
        let total = jobs.len();
        let mut result = RunResult::default();

        println!("\n🎤 Generating {} skill clips...", total);
        println!("{}", "=".repeat(60));

        for (i, job) in jobs.iter().enumerate() {
            println!("\n[{}/{}] {}", i + 1, total, job.filename);
            let outcome = self.generate_one(job);
            result.record(&outcome);
        }

        println!("\n{}", "=".repeat(60));
        println!("✅ Done: {}/{} succeeded", result.succeeded, result.total);
        if result.failed > 0 {
            println!("❌ Failed: {}", result.failed);
        }
        println!("📁 Output directory: {}", self.config.output_dir.display());

        info!(
            "Batch finished: {} total, {} succeeded ({} skipped), {} failed",
            result.total, result.succeeded, result.skipped, result.failed
        );
        result
    }
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Best-effort delete of a consumed waveform
fn remove_intermediate(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}

fn report_failure(failure: &JobFailure) {
    match failure {
        JobFailure::Synthesis(e) => {
            println!("❌ Synthesis failed: {}", e);
            if let Some(details) = e.details() {
                println!("   Details: {}", details);
            }
        }
        JobFailure::Encode(EncodeError::NotFound { program, hint }) => {
            println!("❌ {} not found, install it with: {}", program, hint);
        }
        JobFailure::Encode(EncodeError::Failed { status, stderr }) => {
            println!("❌ Encoder failed ({}): {}", status, stderr);
        }
        JobFailure::Encode(e) => println!("❌ Encode error: {}", e),
        JobFailure::Io(e) => println!("❌ Error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_result_counts_skips_as_success() {
        let mut result = RunResult::default();
        result.record(&JobOutcome::Skipped);
        result.record(&JobOutcome::Generated);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.exit_code(), 0);

        result.record(&JobOutcome::Failed(JobFailure::Io(io::Error::new(
            io::ErrorKind::Other,
            "boom",
        ))));
        assert_eq!(result.total, 3);
        assert_eq!(result.failed, 1);
        assert!(!result.all_succeeded());
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn test_empty_run_succeeds() {
        assert_eq!(RunResult::default().exit_code(), 0);
    }
}
