//! JSON job files
//!
//! ```json
//! {
//!   "skills": [
//!     { "text": "突袭", "filename": "Raid.ogg" },
//!     { "text": "爆炸性打击", "filename": "Blast.ogg", "ssml": "<speak>...</speak>" }
//!   ]
//! }
//! ```

use super::{is_clip_filename, Job, LineWarning, ParsedJobs};
use crate::{GeneratorError, Result};
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Records are kept as raw values so one bad record can't sink the rest
#[derive(Debug, Deserialize)]
struct JobDocument {
    #[serde(default)]
    skills: Vec<Value>,
}

/// Parse a JSON job document
///
/// Records that don't fit the job shape, or have an empty text or
/// filename, are skipped with a warning. Invalid JSON is an error for the
/// whole document.
pub fn parse_structured(contents: &str) -> Result<ParsedJobs> {
    let document: JobDocument = serde_json::from_str(contents)?;
    let mut parsed = ParsedJobs::default();

    for (index, record) in document.skills.into_iter().enumerate() {
        let mut job: Job = match serde_json::from_value(record.clone()) {
            Ok(job) => job,
            Err(e) => {
                parsed.warnings.push(LineWarning {
                    line_number: index + 1,
                    content: format!("{} ({})", record, e),
                });
                continue;
            }
        };

        job.text = job.text.trim().to_string();
        job.filename = job.filename.trim().to_string();
        if job.ssml.as_deref().map_or(false, |s| s.trim().is_empty()) {
            job.ssml = None;
        }

        if job.text.is_empty() || !is_clip_filename(&job.filename) {
            parsed.warnings.push(LineWarning {
                line_number: index + 1,
                content: format!("text={:?} filename={:?}", job.text, job.filename),
            });
            continue;
        }
        parsed.jobs.push(job);
    }

    debug!(
        "Parsed {} jobs, {} skipped records",
        parsed.jobs.len(),
        parsed.warnings.len()
    );
    Ok(parsed)
}

/// Read and parse a JSON job file
pub fn load_structured_file(path: &Path) -> Result<ParsedJobs> {
    if !path.exists() {
        return Err(GeneratorError::InputNotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| GeneratorError::JobFile(format!("{}: {}", path.display(), e)))?;
    let parsed = parse_structured(&contents)
        .map_err(|e| GeneratorError::JobFile(format!("{}: {}", path.display(), e)))?;

    if parsed.jobs.is_empty() {
        parsed.report_warnings();
        return Err(GeneratorError::NoValidJobs);
    }

    Ok(parsed)
}
