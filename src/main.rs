// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::sync::Arc;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use scriptcaps::app_config::{self, Config, TimingMode};
use scriptcaps::app_controller::{Controller, TimingWindow, WorkflowRequest};
use scriptcaps::file_utils::FileManager;
use scriptcaps::host::local::LocalProjectHost;
use scriptcaps::srt_encoder::SrtEncoding;
use scriptcaps::timecode::parse_time_to_seconds;
use scriptcaps::word_spacing::WordSpacing;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for TimingMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTimingMode {
    Manual,
    Auto,
}

impl From<CliTimingMode> for TimingMode {
    fn from(mode: CliTimingMode) -> Self {
        match mode {
            CliTimingMode::Manual => TimingMode::Manual,
            CliTimingMode::Auto => TimingMode::Auto,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an SRT file from a script without a host project
    Generate(GenerateArgs),

    /// Generate captions and insert them into the local project
    Run(RunArgs),

    /// Print the project's playhead as HH:MM:SS
    Playhead,

    /// Generate shell completions for scriptcaps
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Script file, one caption per line
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Start time (HH:MM:SS[,mmm])
    #[arg(short, long, default_value = "00:00:00")]
    start: String,

    /// End time (HH:MM:SS[,mmm])
    #[arg(short, long, conflicts_with = "duration")]
    end: Option<String>,

    /// Total duration in seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Word spacing factor (1-15)
    #[arg(short = 'w', long)]
    spacing: Option<f64>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write UTF-8 with BOM and CRLF line endings
    #[arg(long)]
    windows: bool,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Script file, one caption per line
    #[arg(value_name = "SCRIPT")]
    script: String,

    /// Timing mode
    #[arg(short, long, value_enum)]
    mode: Option<CliTimingMode>,

    /// Start time for manual mode (HH:MM:SS)
    #[arg(short, long, default_value = "")]
    start: String,

    /// End time for manual mode (HH:MM:SS)
    #[arg(short, long, default_value = "")]
    end: String,

    /// Word spacing factor (1-15)
    #[arg(short = 'w', long)]
    spacing: Option<f64>,
}

/// scriptcaps - Script to caption track
///
/// Turns a plain-text script into timed SRT captions, with each line's
/// duration proportional to its word count.
#[derive(Parser, Debug)]
#[command(name = "scriptcaps")]
#[command(version)]
#[command(about = "Timed SRT captions from a plain-text script")]
#[command(long_about = "scriptcaps turns a plain-text script into timed SRT captions.

EXAMPLES:
    scriptcaps generate script.txt --end 00:01:00           # SRT to stdout
    scriptcaps generate script.txt -d 90 -w 2.5 -o out.srt  # 90 seconds, wide spacing
    scriptcaps run script.txt                               # Whole sequence of the local project
    scriptcaps run script.txt -m manual -s 00:00:05 -e 00:00:45
    scriptcaps playhead                                     # Show the playhead time
    scriptcaps completions bash > scriptcaps.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and label for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, label) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with trace so that set_max_level can raise it later
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "scriptcaps", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;
    log::set_max_level(config.log_level.to_level_filter());

    match cli.command {
        Commands::Generate(args) => run_generate(args, &config),
        Commands::Run(args) => run_workflow(args, config).await,
        Commands::Playhead => run_playhead(config).await,
        Commands::Completions { .. } => Ok(()),
    }
}

fn load_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config.save(config_path)?;
        config
    };

    if let Some(level) = log_level {
        config.log_level = level.into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn run_generate(args: GenerateArgs, config: &Config) -> Result<()> {
    let start = parse_time_to_seconds(&args.start)
        .ok_or_else(|| anyhow!("Invalid start time '{}', expected HH:MM:SS", args.start))?;

    let duration = match (args.duration, args.end.as_deref()) {
        (Some(duration), _) => duration,
        (None, Some(end)) => {
            let end = parse_time_to_seconds(end)
                .ok_or_else(|| anyhow!("Invalid end time '{}', expected HH:MM:SS", end))?;
            end - start
        }
        (None, None) => return Err(anyhow!("Either --end or --duration is required")),
    };

    let spacing = WordSpacing::new(args.spacing.unwrap_or(config.subtitles.word_spacing));
    let script = FileManager::read_script_text(&args.script)?;
    let window = TimingWindow {
        offset_seconds: start,
        duration_seconds: duration,
    };

    let document = Controller::generate_document(&script, window, spacing)
        .with_context(|| format!("Failed to build captions from {:?}", args.script))?;

    let encoding = if args.windows {
        SrtEncoding::Utf8BomWindows
    } else {
        SrtEncoding::Utf8Unix
    };

    match args.output {
        Some(path) => {
            FileManager::write_text_file(&path, &document.render(), encoding)?;
            info!("Wrote {} captions to {:?}", document.len(), path);
        }
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(&document.encode(encoding))?;
            stdout.flush()?;
        }
    }

    Ok(())
}

async fn run_workflow(args: RunArgs, config: Config) -> Result<()> {
    let host = Arc::new(LocalProjectHost::from_config(&config));
    let request = WorkflowRequest {
        timing_mode: args.mode.map(TimingMode::from).unwrap_or(config.subtitles.timing_mode),
        script_path: args.script,
        word_spacing: args.spacing.unwrap_or(config.subtitles.word_spacing),
        start_time: args.start,
        end_time: args.end,
    };

    let controller = Controller::new(config, host);
    match controller.run_subtitle_workflow(&request).await {
        Ok(outcome) => {
            println!("{}", outcome);
            Ok(())
        }
        Err(e) => Err(anyhow!(e)),
    }
}

async fn run_playhead(config: Config) -> Result<()> {
    let host = Arc::new(LocalProjectHost::from_config(&config));
    let controller = Controller::new(config, host);

    let time = controller.playhead_time_formatted().await?;
    println!("{}", time);
    Ok(())
}
