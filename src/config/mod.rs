//! Run configuration
//!
//! A `GeneratorConfig` is assembled once at startup from built-in defaults,
//! the optional settings file and command-line overrides, then handed by
//! reference to the generator. Nothing here changes while jobs run.

pub mod env;
pub mod settings;

use crate::encoder::EncodeParams;
use crate::{GeneratorError, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use settings::Settings;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub use env::{Credentials, SpeechAuth};

/// Voice used when `GeneratorConfig::default()` is taken as-is
pub const LIBRARY_DEFAULT_VOICE: &str = "zh-CN-XiaoyiNeural";

/// Voice used by every command-line form unless overridden
pub const CLI_DEFAULT_VOICE: &str = "zh-CN-XiaoxiaoNeural";

/// Output directory when neither settings nor arguments name one
pub const DEFAULT_OUTPUT_DIR: &str = "../../src/Sounds";

pub const DEFAULT_LANGUAGE: &str = "zh-CN";

/// RIFF/PCM so ffmpeg always gets a plain waveform
pub const DEFAULT_OUTPUT_FORMAT: &str = "riff-24khz-16bit-mono-pcm";

static NUMERIC_RATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid regex"));
static PERCENT_RATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]\d+(\.\d+)?%$").expect("valid regex"));

const NAMED_RATES: &[&str] = &["x-slow", "slow", "medium", "fast", "x-fast", "default"];

/// Prosody rate as it will appear in the markup
///
/// Kept as the literal string the user gave: the length heuristic only
/// kicks in when this is exactly `DEFAULT_SENTINEL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRate(String);

impl SpeechRate {
    pub const DEFAULT_SENTINEL: &'static str = "1.5";
    /// Rate for texts of at most `SHORT_TEXT_CHARS` characters
    pub const SHORT_TEXT_RATE: &'static str = "1.2";
    /// Rate for everything longer
    pub const LONG_TEXT_RATE: &'static str = "1.5";
    pub const SHORT_TEXT_CHARS: usize = 2;

    /// Parse and validate a rate string
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let valid = NUMERIC_RATE.is_match(value)
            || PERCENT_RATE.is_match(value)
            || NAMED_RATES.contains(&value);

        if !valid {
            return Err(GeneratorError::Config(format!(
                "invalid speech rate '{}': use a number like 1.2, a percentage like +20%, or one of {}",
                value,
                NAMED_RATES.join("/")
            )));
        }

        if NUMERIC_RATE.is_match(value) && value.parse::<f32>().map_or(true, |r| r <= 0.0) {
            return Err(GeneratorError::Config(format!(
                "invalid speech rate '{}': must be greater than zero",
                value
            )));
        }

        Ok(Self(value.to_string()))
    }

    /// True when the rate was left at the default and the heuristic applies
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT_SENTINEL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SpeechRate {
    fn default() -> Self {
        Self(Self::DEFAULT_SENTINEL.to_string())
    }
}

impl fmt::Display for SpeechRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Values given on the command line, which win over the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub voice: Option<String>,
    pub rate: Option<String>,
    pub output_dir: Option<String>,
}

/// Everything a run needs to know, fixed at startup
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Where finished clips are written (absolute)
    pub output_dir: PathBuf,

    /// Where intermediate waveforms live until transcoded
    pub temp_dir: PathBuf,

    /// Neural voice name, e.g. zh-CN-XiaoxiaoNeural
    pub voice: String,

    pub rate: SpeechRate,

    /// xml:lang of generated markup
    pub language: String,

    /// Service output format of the intermediate file
    pub output_format: String,

    pub encode: EncodeParams,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: absolutize(Path::new(DEFAULT_OUTPUT_DIR)),
            temp_dir: default_temp_dir(),
            voice: LIBRARY_DEFAULT_VOICE.to_string(),
            rate: SpeechRate::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            encode: EncodeParams::default(),
        }
    }
}

impl GeneratorConfig {
    /// Layer defaults, settings file and command-line overrides
    pub fn build(settings: &Settings, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = Self {
            voice: CLI_DEFAULT_VOICE.to_string(),
            ..Self::default()
        };

        if let Some(voice) = settings.voice() {
            config.voice = voice;
        }
        if let Some(rate) = settings.rate() {
            config.rate = SpeechRate::parse(&rate)?;
        }
        if let Some(language) = settings.language() {
            config.language = language;
        }
        if let Some(format) = settings.output_format() {
            config.output_format = format;
        }
        if let Some(dir) = settings.output_dir() {
            config.output_dir = absolutize(Path::new(&dir));
        }
        if let Some(dir) = settings.temp_dir() {
            config.temp_dir = absolutize(Path::new(&dir));
        }
        config.encode = settings.encode_params(config.encode)?;

        if let Some(voice) = &overrides.voice {
            config.voice = voice.clone();
        }
        if let Some(rate) = &overrides.rate {
            config.rate = SpeechRate::parse(rate)?;
        }
        if let Some(dir) = &overrides.output_dir {
            config.output_dir = absolutize(Path::new(dir));
        }

        if config.voice.trim().is_empty() {
            return Err(GeneratorError::Config("voice name is empty".to_string()));
        }

        debug!("Built config: {:?}", config);
        Ok(config)
    }

    /// Create the output and temp directories if missing
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        fs::create_dir_all(&self.temp_dir)?;
        Ok(())
    }

    /// Final location of a clip
    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }

    /// Intermediate waveform for a clip, named after the clip's stem
    pub fn intermediate_path(&self, filename: &str) -> PathBuf {
        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);
        self.temp_dir.join(format!("{}.wav", stem))
    }
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join(crate::APP_NAME)
}

/// Resolve a relative path against the current directory
fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
