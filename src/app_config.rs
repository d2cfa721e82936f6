use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::word_spacing::{MAX_WORD_SPACING, MIN_WORD_SPACING};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Caption generation settings
    #[serde(default)]
    pub subtitles: SubtitleConfig,

    /// Directory-backed project used by the command-line host
    #[serde(default)]
    pub project: ProjectConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How the caption window is chosen
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimingMode {
    // @mode: Explicit start and end times
    Manual,
    // @mode: Whole active sequence, starting at zero
    #[default]
    Auto,
}

impl TimingMode {
    // @returns: Lowercase mode identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
        }
    }

    /// Lenient mapping used at the panel boundary: `"manual"` selects manual
    /// timing, anything else selects automatic timing.
    pub fn from_panel_value(value: &str) -> Self {
        if value == "manual" {
            Self::Manual
        } else {
            Self::Auto
        }
    }
}

impl std::fmt::Display for TimingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TimingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "auto" => Ok(Self::Auto),
            _ => Err(anyhow!("Invalid timing mode: {}", s)),
        }
    }
}

/// Configuration for caption generation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    /// Word spacing factor, clamped to 1..=15 when used
    #[serde(default = "default_word_spacing")]
    pub word_spacing: f64,

    /// Default timing mode
    #[serde(default)]
    pub timing_mode: TimingMode,

    /// Sequence duration assumed when the host cannot report one
    #[serde(default = "default_fallback_sequence_duration_secs")]
    pub fallback_sequence_duration_secs: f64,

    /// Directory for scratch SRT files (system temp directory when unset)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            word_spacing: default_word_spacing(),
            timing_mode: TimingMode::default(),
            fallback_sequence_duration_secs: default_fallback_sequence_duration_secs(),
            temp_dir: None,
        }
    }
}

impl SubtitleConfig {
    /// Directory scratch SRT files are written to
    pub fn effective_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Sequence state exposed by the directory-backed project
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SequenceConfig {
    /// Sequence end point in seconds
    #[serde(default)]
    pub end_seconds: Option<f64>,

    /// Sequence duration property in seconds
    #[serde(default)]
    pub duration_seconds: Option<f64>,

    /// End times of the clips on the video tracks
    #[serde(default)]
    pub clip_ends: Vec<f64>,

    /// Player bounds width in seconds
    #[serde(default)]
    pub player_bounds_seconds: Option<f64>,

    /// Playhead position in seconds
    #[serde(default)]
    pub playhead_seconds: Option<f64>,
}

/// Directory-backed project settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProjectConfig {
    /// Project root directory
    #[serde(default = "default_project_root")]
    pub root: PathBuf,

    /// Bin directory, relative to the root
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,

    /// Refuse imports of SRT files without a UTF-8 BOM
    #[serde(default)]
    pub import_requires_bom: bool,

    /// Active sequence; `None` means no sequence is open
    #[serde(default = "default_sequence")]
    pub sequence: Option<SequenceConfig>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_project_root(),
            bin_dir: default_bin_dir(),
            import_requires_bom: false,
            sequence: default_sequence(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_word_spacing() -> f64 {
    MIN_WORD_SPACING
}

fn default_fallback_sequence_duration_secs() -> f64 {
    60.0
}

fn default_project_root() -> PathBuf {
    PathBuf::from("project")
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from("bin")
}

fn default_sequence() -> Option<SequenceConfig> {
    Some(SequenceConfig::default())
}

impl Config {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write this configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !self.subtitles.word_spacing.is_finite() {
            return Err(anyhow!("Word spacing must be a finite number"));
        }

        if self.subtitles.word_spacing < MIN_WORD_SPACING || self.subtitles.word_spacing > MAX_WORD_SPACING {
            log::warn!(
                "Word spacing {} is outside {}..={} and will be clamped",
                self.subtitles.word_spacing, MIN_WORD_SPACING, MAX_WORD_SPACING
            );
        }

        let fallback = self.subtitles.fallback_sequence_duration_secs;
        if !fallback.is_finite() || fallback <= 0.0 {
            return Err(anyhow!("Fallback sequence duration must be greater than zero"));
        }

        Ok(())
    }

    /// Bin directory resolved against the project root
    pub fn bin_path(&self) -> PathBuf {
        self.project.root.join(&self.project.bin_dir)
    }
}
