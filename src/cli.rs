//! Command-line parsing
//!
//! Three positional forms:
//!
//! ```text
//! skillvoice <text> <file.ogg> [voice] [rate] [output_dir]
//! skillvoice <skills.txt> [voice] [rate] [output_dir]
//! skillvoice --json <skills.json> [voice] [rate] [output_dir]
//! ```
//!
//! `--debug`/`-d` may appear anywhere and is removed before the positionals
//! are interpreted.

use crate::config::ConfigOverrides;
use crate::jobs::is_clip_filename;
use std::path::PathBuf;

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Generate one clip from inline text
    Single {
        text: String,
        filename: String,
        overrides: ConfigOverrides,
    },
    /// Generate clips listed in a `text:filename` file
    LineFile {
        path: PathBuf,
        overrides: ConfigOverrides,
    },
    /// Generate clips listed in a JSON document
    Structured {
        path: PathBuf,
        overrides: ConfigOverrides,
    },
    Help,
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub debug: bool,
    pub invocation: Invocation,
}

/// Problems with the command line itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    NoArguments,
    MissingJsonPath,
    InvalidFilename(String),
}

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsageError::NoArguments => f.write_str("no arguments given"),
            UsageError::MissingJsonPath => f.write_str("--json needs a config file path"),
            UsageError::InvalidFilename(name) => {
                write!(f, "{:?} is not a usable clip filename", name)
            }
        }
    }
}

fn is_debug_flag(arg: &str) -> bool {
    arg == "--debug" || arg == "-d"
}

fn overrides_from(rest: &[String]) -> ConfigOverrides {
    ConfigOverrides {
        voice: rest.first().cloned(),
        rate: rest.get(1).cloned(),
        output_dir: rest.get(2).cloned(),
    }
}

impl CliArgs {
    /// Parse arguments, excluding the program name
    pub fn parse<I, A>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let all: Vec<String> = args.into_iter().map(Into::into).collect();
        let debug = all.iter().any(|a| is_debug_flag(a));
        let args: Vec<String> = all.into_iter().filter(|a| !is_debug_flag(a)).collect();

        let invocation = match args.first().map(String::as_str) {
            None => return Err(UsageError::NoArguments),
            Some("--help") | Some("-h") => Invocation::Help,
            Some("--json") => {
                let path = args.get(1).ok_or(UsageError::MissingJsonPath)?;
                Invocation::Structured {
                    path: PathBuf::from(path),
                    overrides: overrides_from(&args[2..]),
                }
            }
            Some(first) if args.len() == 1 => Invocation::LineFile {
                path: PathBuf::from(first),
                overrides: ConfigOverrides::default(),
            },
            Some(first) => {
                // A lone existing file followed by options is a job file;
                // otherwise the first two words are text and filename.
                if PathBuf::from(first).is_file() {
                    Invocation::LineFile {
                        path: PathBuf::from(first),
                        overrides: overrides_from(&args[1..]),
                    }
                } else if !is_clip_filename(&args[1]) {
                    return Err(UsageError::InvalidFilename(args[1].clone()));
                } else {
                    Invocation::Single {
                        text: first.to_string(),
                        filename: args[1].clone(),
                        overrides: overrides_from(&args[2..]),
                    }
                }
            }
        };

        Ok(Self { debug, invocation })
    }
}

/// Usage text
pub fn usage() -> String {
    let name = crate::APP_NAME;
    format!(
        "Usage:
  1. Single clip:  {name} <text> <file.ogg> [voice] [rate] [output_dir]
  2. Batch:        {name} <skills.txt> [voice] [rate] [output_dir]
  3. JSON batch:   {name} --json <skills.json> [voice] [rate] [output_dir]

Options:
  -d, --debug      write debug logs to {name}.log
  -h, --help       show this help

Text job file format (one skill per line, '#' starts a comment):
  skill name:File.ogg

Rate: a number such as 1.2, a percentage such as +20%, or
      x-slow/slow/medium/fast/x-fast (default 1.5; at the default,
      names of two characters or fewer are read at 1.2)

Environment (may also come from ./.env):
  AZURE_SPEECH_REGION        service region, e.g. eastasia (required)
  AZURE_SPEECH_KEY           resource key, or
  AZURE_SPEECH_RESOURCE_ID   resource id for Entra ID auth
  AZURE_ACCESS_TOKEN         token for Entra ID auth (else taken from `az`)

Examples:
  {name} '冲锋' Charge.ogg
  {name} skills.txt
  {name} skills.txt zh-CN-YunxiNeural 1.8
  {name} skills.txt zh-CN-XiaoxiaoNeural fast ./output

Default output directory: {dir}",
        name = name,
        dir = crate::config::DEFAULT_OUTPUT_DIR
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        assert_eq!(CliArgs::parse(Vec::<String>::new()), Err(UsageError::NoArguments));
    }

    #[test]
    fn test_single_clip() {
        let cli = CliArgs::parse(["冲锋", "Charge.ogg", "zh-CN-YunxiNeural"]).unwrap();
        assert!(!cli.debug);
        assert_eq!(
            cli.invocation,
            Invocation::Single {
                text: "冲锋".to_string(),
                filename: "Charge.ogg".to_string(),
                overrides: ConfigOverrides {
                    voice: Some("zh-CN-YunxiNeural".to_string()),
                    rate: None,
                    output_dir: None,
                },
            }
        );
    }

    #[test]
    fn test_single_clip_needs_a_file_name() {
        assert_eq!(
            CliArgs::parse(["冲锋", ""]),
            Err(UsageError::InvalidFilename(String::new()))
        );
        assert_eq!(
            CliArgs::parse(["冲锋", "."]),
            Err(UsageError::InvalidFilename(".".to_string()))
        );
        assert!(UsageError::InvalidFilename(".".to_string())
            .to_string()
            .contains("\".\""));
    }

    #[test]
    fn test_line_file_alone() {
        let cli = CliArgs::parse(["skills.txt"]).unwrap();
        assert_eq!(
            cli.invocation,
            Invocation::LineFile {
                path: PathBuf::from("skills.txt"),
                overrides: ConfigOverrides::default(),
            }
        );
    }

    #[test]
    fn test_existing_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.txt");
        std::fs::write(&path, "冲锋:Charge.ogg\n").unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let cli = CliArgs::parse([path_str.as_str(), "zh-CN-YunxiNeural", "1.8", "./out"]).unwrap();
        assert_eq!(
            cli.invocation,
            Invocation::LineFile {
                path,
                overrides: ConfigOverrides {
                    voice: Some("zh-CN-YunxiNeural".to_string()),
                    rate: Some("1.8".to_string()),
                    output_dir: Some("./out".to_string()),
                },
            }
        );
    }

    #[test]
    fn test_json_form() {
        let cli = CliArgs::parse(["--json", "skills.json", "v", "fast"]).unwrap();
        assert_eq!(
            cli.invocation,
            Invocation::Structured {
                path: PathBuf::from("skills.json"),
                overrides: ConfigOverrides {
                    voice: Some("v".to_string()),
                    rate: Some("fast".to_string()),
                    output_dir: None,
                },
            }
        );
    }

    #[test]
    fn test_json_without_path() {
        assert_eq!(CliArgs::parse(["--json"]), Err(UsageError::MissingJsonPath));
    }

    #[test]
    fn test_debug_flag_anywhere() {
        let cli = CliArgs::parse(["冲锋", "--debug", "Charge.ogg"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.invocation, Invocation::Single { ref filename, .. } if filename == "Charge.ogg"));

        assert_eq!(CliArgs::parse(["-d"]), Err(UsageError::NoArguments));
    }

    #[test]
    fn test_help() {
        assert_eq!(CliArgs::parse(["-h"]).unwrap().invocation, Invocation::Help);
        assert!(usage().contains("--json"));
    }
}
