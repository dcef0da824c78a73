//! Job lists
//!
//! A job is one phrase to speak and the clip filename to write it to.
//! Jobs come from the command line, a line-oriented text file, or a JSON
//! document. Parsing never fails on a single bad entry: bad entries become
//! warnings and the rest of the list is kept.

pub mod lines;
pub mod structured;

use serde::Deserialize;
use std::fmt;
use std::path::Path;

pub use lines::{load_line_file, parse_lines};
pub use structured::{load_structured_file, parse_structured};

/// One clip to generate
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    /// Phrase to speak
    pub text: String,

    /// Clip filename inside the output directory
    pub filename: String,

    /// Complete SSML document sent verbatim instead of generated markup
    #[serde(default)]
    pub ssml: Option<String>,
}

impl Job {
    pub fn new(text: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filename: filename.into(),
            ssml: None,
        }
    }

    pub fn with_ssml(mut self, ssml: impl Into<String>) -> Self {
        self.ssml = Some(ssml.into());
        self
    }
}

/// Whether `name` can name a clip file under the output directory
///
/// Rejects empty names and names that resolve to a directory such as
/// `.`, `..` or `warrior/`.
pub fn is_clip_filename(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty()
        && !name.ends_with(|c: char| c == '/' || c == '\\')
        && Path::new(name).file_name().is_some()
}

/// An entry that was skipped while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWarning {
    /// 1-based line number (or record index for JSON)
    pub line_number: usize,
    pub content: String,
}

impl fmt::Display for LineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipping entry {} (malformed): {}", self.line_number, self.content)
    }
}

/// Valid jobs plus whatever had to be skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedJobs {
    pub jobs: Vec<Job>,
    pub warnings: Vec<LineWarning>,
}

impl ParsedJobs {
    /// Print skipped entries the way the rest of the run reports progress
    pub fn report_warnings(&self) {
        for warning in &self.warnings {
            println!("⚠️  {}", warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_filenames() {
        assert!(is_clip_filename("Charge.ogg"));
        assert!(is_clip_filename("warrior/Raid.ogg"));
        assert!(!is_clip_filename(""));
        assert!(!is_clip_filename("  "));
        assert!(!is_clip_filename("."));
        assert!(!is_clip_filename(".."));
        assert!(!is_clip_filename("warrior/"));
    }
}
