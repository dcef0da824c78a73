//! ffmpeg transcoder
//!
//! Runs the ffmpeg command line tool once per clip. The executable is
//! probed before each run so a missing install shows up as a clear
//! per-clip error with an install hint.
//!
//! Dependencies:
//! - ffmpeg built with libvorbis (install with: sudo apt install ffmpeg)

use super::{EncodeError, EncodeParams, Transcoder};
use crate::platform::install_hint;
use log::{debug, warn};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Transcoder that shells out to ffmpeg
#[derive(Debug, Default, Clone)]
pub struct FfmpegTranscoder;

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self
    }

    /// Check that `program` can be started
    pub fn probe(program: &str) -> Result<(), EncodeError> {
        match Command::new(program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(_) => Ok(()),
            Err(e) => {
                debug!("Failed to start {}: {}", program, e);
                Err(EncodeError::NotFound {
                    program: program.to_string(),
                    hint: install_hint(program),
                })
            }
        }
    }

    /// Arguments for one conversion
    pub fn build_args(src: &Path, dest: &Path, params: &EncodeParams) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(16);
        args.push("-i".into());
        args.push(src.as_os_str().to_owned());
        args.push("-filter:a".into());
        args.push(format!("volume={}", params.gain).into());
        args.push("-acodec".into());
        args.push(params.codec.clone().into());
        args.push("-ac".into());
        args.push(params.channels.to_string().into());
        args.push("-ar".into());
        args.push(params.sample_rate.to_string().into());
        args.push("-b:a".into());
        args.push(params.bitrate.clone().into());
        args.push("-y".into());
        args.push(dest.as_os_str().to_owned());
        args
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, src: &Path, dest: &Path, params: &EncodeParams) -> Result<(), EncodeError> {
        Self::probe(&params.program)?;

        // Encode under a staging name so a failed run never leaves
        // something that looks like a finished clip
        let staging = staging_path(dest);
        let args = Self::build_args(src, &staging, params);
        debug!("Running {} {:?}", params.program, args);

        let result = Command::new(&params.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(EncodeError::from)
            .and_then(|output| {
                if output.status.success() {
                    Ok(())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(EncodeError::Failed {
                        status: output.status.to_string(),
                        stderr: last_lines(stderr.trim(), 10),
                    })
                }
            })
            .and_then(|()| fs::rename(&staging, dest).map_err(EncodeError::from));

        if result.is_err() {
            if let Err(e) = fs::remove_file(&staging) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to remove partial clip {}: {}", staging.display(), e);
                }
            }
        }

        result
    }
}

/// `Charge.ogg` -> `.Charge.partial.ogg` in the same directory
///
/// The extension is kept last so ffmpeg still picks the container from it.
pub fn staging_path(dest: &Path) -> PathBuf {
    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match dest.extension() {
        Some(ext) => format!(".{}.partial.{}", stem, ext.to_string_lossy()),
        None => format!(".{}.partial", stem),
    };
    dest.with_file_name(name)
}

/// ffmpeg prints its banner first; the cause is at the end
fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}
