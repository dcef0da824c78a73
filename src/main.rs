//! skillvoice main entry point
//!
//! Parses the command line, assembles the run configuration and
//! credentials, then hands the jobs to the generator. Only startup
//! problems end the process early; per-clip failures are tallied.

use anyhow::Context;
use log::{debug, info};
use skillvoice::batch::{Generator, RunResult};
use skillvoice::cli::{usage, CliArgs, Invocation};
use skillvoice::config::env::load_dotenv;
use skillvoice::config::settings::Settings;
use skillvoice::config::{ConfigOverrides, Credentials, GeneratorConfig};
use skillvoice::encoder::FfmpegTranscoder;
use skillvoice::jobs::{load_line_file, load_structured_file, Job, ParsedJobs};
use skillvoice::speech::backends::AzureSynthesizer;
use std::path::Path;
use std::process;

fn main() {
    let cli = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("❌ {}\n", e);
            println!("{}", usage());
            process::exit(1);
        }
    };

    init_logging(cli.debug);

    match run(cli.invocation) {
        Ok(code) => process::exit(code),
        Err(e) => {
            debug!("Fatal error: {:?}", e);
            println!("❌ {:#}", e);
            process::exit(1);
        }
    }
}

fn init_logging(debug_mode: bool) {
    if debug_mode {
        // Debug mode: write to skillvoice.log
        use std::fs::OpenOptions;
        let log_path = format!("{}.log", skillvoice::APP_NAME);
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open {} for debug logging: {}", log_path, e);
                eprintln!("Continuing with logging to stderr...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .init();
            }
        }

        info!(
            "{} version {} starting (debug mode)",
            skillvoice::APP_NAME,
            skillvoice::VERSION
        );
    } else {
        // Normal mode: stdout carries progress, logs only warnings and up
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Warn)
            .parse_default_env()
            .init();
    }
}

/// Run the requested invocation and return the process exit code
fn run(invocation: Invocation) -> anyhow::Result<i32> {
    let single = matches!(invocation, Invocation::Single { .. });
    let (jobs, overrides) = match invocation {
        Invocation::Help => {
            println!("{}", usage());
            return Ok(0);
        }
        Invocation::Single {
            text,
            filename,
            overrides,
        } => (vec![Job::new(text, filename)], overrides),
        Invocation::LineFile { path, overrides } => {
            let parsed = load_line_file(&path)
                .with_context(|| format!("Failed to load skill list {}", path.display()))?;
            (take_jobs(parsed), overrides)
        }
        Invocation::Structured { path, overrides } => {
            let parsed = load_structured_file(&path)
                .with_context(|| format!("Failed to load skill list {}", path.display()))?;
            (take_jobs(parsed), overrides)
        }
    };

    let config = build_config(&overrides)?;
    let credentials = load_credentials()?;

    let synth = AzureSynthesizer::new(&credentials, &config.output_format)?;
    let mut generator = Generator::new(&config, synth, FfmpegTranscoder::new());
    generator.print_summary(&credentials.region);

    let result = if single {
        let mut result = RunResult::default();
        for job in &jobs {
            result.record(&generator.generate_one(job));
        }
        result
    } else {
        generator.run_batch(&jobs)
    };

    debug!("Run result: {:?}", result);
    Ok(result.exit_code())
}

fn take_jobs(parsed: ParsedJobs) -> Vec<Job> {
    parsed.report_warnings();
    parsed.jobs
}

fn build_config(overrides: &ConfigOverrides) -> anyhow::Result<GeneratorConfig> {
    let settings = Settings::load()?;
    if let Some(path) = settings.path() {
        debug!("Using settings from {}", path.display());
    }

    let config = GeneratorConfig::build(&settings, overrides)?;
    config.ensure_dirs().with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    Ok(config)
}

fn load_credentials() -> anyhow::Result<Credentials> {
    load_dotenv(Path::new(".env")).context("Failed to read .env")?;
    let credentials = Credentials::from_env()?;
    info!("Speech region: {}", credentials.region);
    Ok(credentials)
}
