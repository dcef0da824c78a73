//! Optional settings file
//!
//! An INI file that supplies defaults for a run so they don't have to be
//! repeated on every command line:
//!
//! ```ini
//! [speech]
//! voice = zh-CN-YunxiNeural
//! rate = 1.5
//!
//! [output]
//! dir = ../../src/Sounds
//!
//! [encoder]
//! program = ffmpeg
//! gain = 2.5
//! ```

use crate::encoder::EncodeParams;
use crate::{GeneratorError, Result};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming an explicit settings file
pub const SETTINGS_ENV: &str = "SKILLVOICE_CONFIG";

const LOCAL_FILE: &str = "skillvoice.cfg";
const HOME_FILE: &str = ".skillvoice.cfg";

/// Parsed settings file (possibly empty)
pub struct Settings {
    ini: Ini,

    /// File the settings came from, if any
    path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the first file found, or empty settings
    ///
    /// Search order: `$SKILLVOICE_CONFIG`, `./skillvoice.cfg`, `~/.skillvoice.cfg`.
    /// A file named by the environment variable must exist.
    pub fn load() -> Result<Self> {
        if let Ok(explicit) = std::env::var(SETTINGS_ENV) {
            let path = PathBuf::from(explicit);
            if !path.exists() {
                return Err(GeneratorError::Settings(format!(
                    "{} points to a missing file: {}",
                    SETTINGS_ENV,
                    path.display()
                )));
            }
            return Self::load_from(&path);
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                return Self::load_from(&candidate);
            }
        }

        debug!("No settings file found, using built-in defaults");
        Ok(Self::empty())
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading settings from {:?}", path);
        let ini = Ini::load_from_file(path).map_err(|e| {
            GeneratorError::Settings(format!("Failed to load {}: {}", path.display(), e))
        })?;
        info!("Settings loaded from {}", path.display());

        Ok(Self {
            ini,
            path: Some(path.to_path_buf()),
        })
    }

    /// Parse settings from a string
    pub fn parse(contents: &str) -> Result<Self> {
        let ini = Ini::load_from_str(contents)
            .map_err(|e| GeneratorError::Settings(format!("Failed to parse settings: {}", e)))?;
        Ok(Self { ini, path: None })
    }

    /// Settings with nothing set
    pub fn empty() -> Self {
        Self {
            ini: Ini::new(),
            path: None,
        }
    }

    /// Where these settings were read from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_FILE)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(HOME_FILE));
        }
        paths
    }

    /// Get a non-empty string value
    pub fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .get_from(Some(section), key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Get a typed value; present but unparsable is an error
    fn get_parsed<T: FromStr>(&self, section: &str, key: &str) -> Result<Option<T>> {
        match self.get_string(section, key) {
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                GeneratorError::Settings(format!("[{}] {} has an invalid value: {}", section, key, raw))
            }),
            None => Ok(None),
        }
    }

    pub fn voice(&self) -> Option<String> {
        self.get_string("speech", "voice")
    }

    pub fn rate(&self) -> Option<String> {
        self.get_string("speech", "rate")
    }

    pub fn language(&self) -> Option<String> {
        self.get_string("speech", "language")
    }

    pub fn output_format(&self) -> Option<String> {
        self.get_string("speech", "output_format")
    }

    pub fn output_dir(&self) -> Option<String> {
        self.get_string("output", "dir")
    }

    pub fn temp_dir(&self) -> Option<String> {
        self.get_string("output", "temp_dir")
    }

    /// Apply `[encoder]` values on top of `base`
    pub fn encode_params(&self, base: EncodeParams) -> Result<EncodeParams> {
        let mut params = base;

        if let Some(program) = self.get_string("encoder", "program") {
            params.program = program;
        }
        if let Some(gain) = self.get_parsed::<f32>("encoder", "gain")? {
            if gain <= 0.0 {
                return Err(GeneratorError::Settings(format!(
                    "[encoder] gain must be positive, got {}",
                    gain
                )));
            }
            params.gain = gain;
        }
        if let Some(channels) = self.get_parsed::<u8>("encoder", "channels")? {
            params.channels = channels;
        }
        if let Some(rate) = self.get_parsed::<u32>("encoder", "sample_rate")? {
            params.sample_rate = rate;
        }
        if let Some(bitrate) = self.get_string("encoder", "bitrate") {
            params.bitrate = bitrate;
        }
        if let Some(codec) = self.get_string("encoder", "codec") {
            params.codec = codec;
        }

        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_have_no_values() {
        let settings = Settings::empty();
        assert!(settings.voice().is_none());
        assert!(settings.rate().is_none());
        assert!(settings.output_dir().is_none());
        assert!(settings.path().is_none());
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let settings = Settings::parse("[speech]\nvoice =\n").unwrap();
        assert!(settings.voice().is_none());
    }

    #[test]
    fn test_encoder_section_overrides_defaults() {
        let settings =
            Settings::parse("[encoder]\nprogram = /usr/local/bin/ffmpeg\ngain = 3.0\nbitrate = 96k\n")
                .unwrap();
        let params = settings.encode_params(EncodeParams::default()).unwrap();

        assert_eq!(params.program, "/usr/local/bin/ffmpeg");
        assert_eq!(params.gain, 3.0);
        assert_eq!(params.bitrate, "96k");
        // Untouched keys keep their defaults
        assert_eq!(params.sample_rate, 44_100);
        assert_eq!(params.channels, 1);
    }

    #[test]
    fn test_bad_numeric_value_is_an_error() {
        let settings = Settings::parse("[encoder]\nsample_rate = fast\n").unwrap();
        assert!(settings.encode_params(EncodeParams::default()).is_err());

        let settings = Settings::parse("[encoder]\ngain = -1\n").unwrap();
        assert!(settings.encode_params(EncodeParams::default()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skillvoice.cfg");
        std::fs::write(&path, "[speech]\nvoice = zh-CN-YunxiNeural\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.voice().as_deref(), Some("zh-CN-YunxiNeural"));
        assert_eq!(settings.path(), Some(path.as_path()));
    }
}
