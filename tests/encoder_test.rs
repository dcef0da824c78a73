//! Encoder process tests
//!
//! Uses small shell scripts in place of ffmpeg to check what is left on
//! disk when the encoder fails partway through. Kept to a single test so
//! no other thread is spawning processes while the scripts are written.

#![cfg(unix)]

use skillvoice::batch::{Generator, JobFailure, JobOutcome};
use skillvoice::config::GeneratorConfig;
use skillvoice::encoder::{EncodeError, FfmpegTranscoder};
use skillvoice::jobs::Job;
use skillvoice::speech::{SynthesisError, Synthesizer};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

#[derive(Default)]
struct WaveWriter {
    calls: usize,
}

impl Synthesizer for WaveWriter {
    fn synthesize_to_file(&mut self, _ssml: &str, dest: &Path) -> Result<(), SynthesisError> {
        self.calls += 1;
        fs::write(dest, b"RIFF fake waveform")?;
        Ok(())
    }
}

/// Write an executable script that answers `-version` and otherwise writes
/// `contents` to its last argument before exiting with `code`
fn fake_encoder(dir: &Path, name: &str, contents: &str, code: i32) -> PathBuf {
    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"-version\" ]; then exit 0; fi\n\
         for last in \"$@\"; do :; done\n\
         printf '{}' > \"$last\"\n\
         echo 'Conversion failed!' >&2\n\
         exit {}\n",
        contents, code
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_failed_encode_leaves_no_clip_and_rerun_retries() {
    let dir = tempfile::tempdir().unwrap();
    let failing = fake_encoder(dir.path(), "ffmpeg-fails", "partial", 1);
    let working = fake_encoder(dir.path(), "ffmpeg-works", "encoded", 0);

    let mut config = GeneratorConfig {
        output_dir: dir.path().join("Sounds"),
        temp_dir: dir.path().join("temp"),
        ..GeneratorConfig::default()
    };
    config.ensure_dirs().unwrap();
    let job = Job::new("冲锋", "Charge.ogg");

    // First run: encoder writes some output, then fails
    config.encode.program = failing.to_string_lossy().into_owned();
    let mut generator = Generator::new(&config, WaveWriter::default(), FfmpegTranscoder::new());
    let outcome = generator.generate_one(&job);

    match outcome {
        JobOutcome::Failed(JobFailure::Encode(EncodeError::Failed { stderr, .. })) => {
            assert!(stderr.contains("Conversion failed!"));
        }
        other => panic!("expected encoder failure, got {:?}", other),
    }
    assert!(!config.output_path("Charge.ogg").exists());
    let leftovers: Vec<_> = fs::read_dir(&config.output_dir).unwrap().collect();
    assert!(leftovers.is_empty(), "output dir should be empty: {:?}", leftovers);
    assert!(config.intermediate_path("Charge.ogg").exists());

    // Second run: nothing to skip, so the clip is generated
    config.encode.program = working.to_string_lossy().into_owned();
    let mut generator = Generator::new(&config, WaveWriter::default(), FfmpegTranscoder::new());
    let outcome = generator.generate_one(&job);

    assert!(matches!(outcome, JobOutcome::Generated));
    assert_eq!(generator.synthesizer().calls, 1);
    assert_eq!(fs::read(config.output_path("Charge.ogg")).unwrap(), b"encoded");
    assert!(!config.intermediate_path("Charge.ogg").exists());
}
