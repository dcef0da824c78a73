//! Line-oriented job files
//!
//! One job per line, `text:filename` or `text：filename` (ASCII or
//! full-width colon). Blank lines and lines starting with `#` are ignored.

use super::{is_clip_filename, Job, LineWarning, ParsedJobs};
use crate::{GeneratorError, Result};
use log::debug;
use std::fs;
use std::path::Path;

const ASCII_SEPARATOR: char = ':';
const FULLWIDTH_SEPARATOR: char = '：';

/// Parse the contents of a line-oriented job file
///
/// A leading byte order mark is ignored.
pub fn parse_lines(contents: &str) -> ParsedJobs {
    let mut parsed = ParsedJobs::default();
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match split_line(line) {
            Some(job) => parsed.jobs.push(job),
            None => parsed.warnings.push(LineWarning {
                line_number: index + 1,
                content: line.to_string(),
            }),
        }
    }

    debug!(
        "Parsed {} jobs, {} malformed lines",
        parsed.jobs.len(),
        parsed.warnings.len()
    );
    parsed
}

/// Split `text<SEP>filename` on the first separator
///
/// An ASCII colon anywhere on the line takes precedence over a full-width one.
fn split_line(line: &str) -> Option<Job> {
    let separator = if line.contains(ASCII_SEPARATOR) {
        ASCII_SEPARATOR
    } else {
        FULLWIDTH_SEPARATOR
    };

    let (text, filename) = line.split_once(separator)?;
    let (text, filename) = (text.trim(), filename.trim());
    if text.is_empty() || !is_clip_filename(filename) {
        return None;
    }

    Some(Job::new(text, filename))
}

/// Read and parse a line-oriented job file
///
/// Fails only when the file can't be read or yields no valid jobs.
pub fn load_line_file(path: &Path) -> Result<ParsedJobs> {
    if !path.exists() {
        return Err(GeneratorError::InputNotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| GeneratorError::JobFile(format!("{}: {}", path.display(), e)))?;
    let parsed = parse_lines(&contents);

    if parsed.jobs.is_empty() {
        parsed.report_warnings();
        return Err(GeneratorError::NoValidJobs);
    }

    Ok(parsed)
}
