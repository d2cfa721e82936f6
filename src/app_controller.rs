use log::{error, warn, info, debug};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::{Config, TimingMode};
use crate::errors::{PlayheadError, ScriptError, WorkflowError};
use crate::file_utils::FileManager;
use crate::host::{resolve_sequence_duration, AssetRef, BinId, HostBridge};
use crate::script_parser::TimingPlan;
use crate::srt_encoder::{SrtDocument, SrtEncoding};
use crate::timecode::{parse_time_to_seconds, to_hhmmss};
use crate::word_spacing::WordSpacing;

// @module: Application controller for the caption workflow

/// Message returned when captions were inserted
pub const SUCCESS_MESSAGE: &str = "Subtitles successfully inserted in the captions tracks from the script.";

/// Event panel notice posted before the second import attempt
pub const IMPORT_RETRY_NOTICE: &str = "Import attempt 1 did not increase bin count. Retrying with CRLF + UTF-8 BOM...";

/// Event panel notice posted when both import attempts left the bin unchanged
pub const IMPORT_FAILED_NOTICE: &str = "SRT import failed. Please check that your editor build supports SRT import; a CRLF + UTF-8 BOM variant also failed.";

// Caption tracks are always anchored at the start of the sequence;
// the offset lives in the SRT timestamps.
const CAPTION_TRACK_START_SECONDS: f64 = 0.0;

/// Inputs of one workflow run, as collected by the panel
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowRequest {
    pub timing_mode: TimingMode,
    pub script_path: String,
    pub word_spacing: f64,
    pub start_time: String,
    pub end_time: String,
}

impl WorkflowRequest {
    /// Automatic timing over the whole active sequence
    pub fn auto(script_path: impl Into<String>, word_spacing: f64) -> Self {
        Self {
            timing_mode: TimingMode::Auto,
            script_path: script_path.into(),
            word_spacing,
            start_time: String::new(),
            end_time: String::new(),
        }
    }

    /// Manual timing between two user-entered times
    pub fn manual(
        script_path: impl Into<String>,
        word_spacing: f64,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            timing_mode: TimingMode::Manual,
            script_path: script_path.into(),
            word_spacing,
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

/// Time window captions are spread over
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingWindow {
    pub offset_seconds: f64,
    pub duration_seconds: f64,
}

/// Successful workflow result
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowOutcome {
    /// Scratch SRT file that was imported
    pub srt_path: PathBuf,
    /// Number of caption blocks in the document
    pub caption_count: usize,
    /// Encoding of the attempt the host accepted
    pub encoding: SrtEncoding,
    /// Bin item the caption track was built from
    pub asset: AssetRef,
}

impl fmt::Display for WorkflowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", SUCCESS_MESSAGE)
    }
}

/// Main application controller for caption generation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Connection to the host application
    host: Arc<dyn HostBridge>,
}

impl Controller {
    // @method: Create a new controller with the given configuration and host
    pub fn new(config: Config, host: Arc<dyn HostBridge>) -> Self {
        Self { config, host }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the SRT document for a script without touching any host.
    ///
    /// This is the pure core: parse, allocate by word count, space, encode.
    pub fn generate_document(
        script: &str,
        window: TimingWindow,
        spacing: WordSpacing,
    ) -> Result<SrtDocument, ScriptError> {
        let plan = TimingPlan::from_script(script, window.duration_seconds, window.offset_seconds)?;
        Ok(SrtDocument::from_plan(&plan, spacing))
    }

    /// Work out the caption window for a timing mode
    pub async fn resolve_window(
        &self,
        timing_mode: TimingMode,
        start_time: &str,
        end_time: &str,
    ) -> Result<TimingWindow, WorkflowError> {
        match timing_mode {
            TimingMode::Manual => {
                let (Some(start), Some(end)) = (parse_time_to_seconds(start_time), parse_time_to_seconds(end_time)) else {
                    return Err(WorkflowError::InvalidTimeFormat);
                };
                if end <= start {
                    return Err(WorkflowError::EndNotAfterStart);
                }
                Ok(TimingWindow {
                    offset_seconds: start,
                    duration_seconds: end - start,
                })
            }
            TimingMode::Auto => {
                let fallback = self.config.subtitles.fallback_sequence_duration_secs;
                match resolve_sequence_duration(self.host.as_ref(), fallback).await {
                    Some(duration) if duration > 0.0 => Ok(TimingWindow {
                        offset_seconds: 0.0,
                        duration_seconds: duration,
                    }),
                    _ => Err(WorkflowError::DurationUndetermined),
                }
            }
        }
    }

    /// Run the full workflow: script, SRT, import, caption track.
    ///
    /// Every outcome, success or failure, is also posted to the host's event
    /// panel.
    pub async fn run_subtitle_workflow(&self, request: &WorkflowRequest) -> Result<WorkflowOutcome, WorkflowError> {
        let result = self.execute(request).await;

        match &result {
            Ok(outcome) => {
                info!(
                    "Inserted {} captions from {:?} ({})",
                    outcome.caption_count, outcome.srt_path, outcome.encoding
                );
                self.host.notify(&outcome.to_string());
            }
            Err(e) => {
                error!("{}", e);
                self.host.notify(&Self::panel_notice(e));
            }
        }

        result
    }

    /// Panel entry point: same workflow, result flattened to the message text.
    ///
    /// `timing_mode` is `"manual"` for manual timing; any other value selects
    /// automatic timing.
    pub async fn run_subtitle_workflow_message(
        &self,
        timing_mode: &str,
        script_path: &str,
        word_spacing: f64,
        start_time: &str,
        end_time: &str,
    ) -> String {
        let request = WorkflowRequest {
            timing_mode: TimingMode::from_panel_value(timing_mode),
            script_path: script_path.to_string(),
            word_spacing,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        };

        match self.run_subtitle_workflow(&request).await {
            Ok(outcome) => outcome.to_string(),
            Err(e) => e.to_string(),
        }
    }

    /// Current playhead as `HH:MM:SS`, for filling in manual times
    pub async fn playhead_time_formatted(&self) -> Result<String, PlayheadError> {
        if !self.host.has_active_sequence().await? {
            return Err(PlayheadError::NoActiveSequence);
        }

        match self.host.playhead_position().await? {
            Some(seconds) if seconds.is_finite() => Ok(to_hhmmss(seconds)),
            _ => Err(PlayheadError::Unavailable),
        }
    }

    // Event panel text for a failure; only import failures get the longer hint
    fn panel_notice(error: &WorkflowError) -> String {
        match error {
            WorkflowError::ImportFailed { path } => {
                format!("{} File: {}", IMPORT_FAILED_NOTICE, path.display())
            }
            other => other.to_string(),
        }
    }

    async fn execute(&self, request: &WorkflowRequest) -> Result<WorkflowOutcome, WorkflowError> {
        match self.host.has_active_sequence().await {
            Ok(true) => {}
            Ok(false) => return Err(WorkflowError::NoActiveSequence),
            Err(e) => {
                warn!("Active sequence query failed: {}", e);
                return Err(WorkflowError::NoActiveSequence);
            }
        }

        if request.script_path.trim().is_empty() {
            return Err(WorkflowError::MissingScriptPath);
        }

        let spacing = WordSpacing::new(request.word_spacing);
        let window = self
            .resolve_window(request.timing_mode, &request.start_time, &request.end_time)
            .await?;
        debug!(
            "Timing window: {:.3}s from {:.3}s ({} mode), spacing {}",
            window.duration_seconds, window.offset_seconds, request.timing_mode, spacing
        );

        let script_path = FileManager::normalize_script_path(&request.script_path);
        let script = self.read_script(&script_path).await?;

        let document = Self::generate_document(&script, window, spacing)?;
        info!("Generated {} captions from {:?}", document.len(), script_path);

        let srt_path = FileManager::temp_subtitle_path(
            self.config.subtitles.effective_temp_dir(),
            chrono::Utc::now().timestamp_millis(),
        );
        let content = document.render();

        if let Err(e) = self.host.write_text_file(&srt_path, &content, SrtEncoding::Utf8Unix).await {
            error!("Could not write {:?}: {}", srt_path, e);
            return Err(WorkflowError::TempFileWrite);
        }

        let bin = match self.host.insertion_bin().await {
            Ok(Some(bin)) => bin,
            Ok(None) => return Err(WorkflowError::NoDestinationBin),
            Err(e) => {
                warn!("Insertion bin lookup failed: {}", e);
                return Err(WorkflowError::NoDestinationBin);
            }
        };

        let (item_count, encoding) = self.import_with_fallback(&srt_path, &content, &bin).await?;

        let asset = match self.host.bin_item(&bin, item_count - 1).await {
            Ok(Some(asset)) => asset,
            Ok(None) => return Err(WorkflowError::ImportedAssetMissing),
            Err(e) => {
                warn!("Bin item lookup failed: {}", e);
                return Err(WorkflowError::ImportedAssetMissing);
            }
        };

        match self.host.create_caption_track(&asset, CAPTION_TRACK_START_SECONDS).await {
            Ok(true) => Ok(WorkflowOutcome {
                srt_path,
                caption_count: document.len(),
                encoding,
                asset,
            }),
            Ok(false) => Err(WorkflowError::CaptionTrackFailed),
            Err(e) => {
                warn!("Caption track creation failed: {}", e);
                Err(WorkflowError::CaptionTrackFailed)
            }
        }
    }

    async fn read_script(&self, path: &Path) -> Result<String, WorkflowError> {
        if !self.host.file_exists(path).await {
            return Err(WorkflowError::ScriptNotFound);
        }

        match self.host.read_text_file(path).await {
            Ok(text) if !text.is_empty() => Ok(text),
            Ok(_) => Err(WorkflowError::ScriptUnreadable),
            Err(e) => {
                warn!("Script read failed: {}", e);
                Err(WorkflowError::ScriptUnreadable)
            }
        }
    }

    async fn bin_count(&self, bin: &BinId) -> usize {
        match self.host.bin_item_count(bin).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Bin item count failed: {}", e);
                0
            }
        }
    }

    /// Import the scratch file, retrying once with the CRLF + BOM encoding.
    ///
    /// An attempt counts as successful only if the bin grew. Returns the new
    /// item count and the encoding of the accepted attempt.
    async fn import_with_fallback(
        &self,
        srt_path: &Path,
        content: &str,
        bin: &BinId,
    ) -> Result<(usize, SrtEncoding), WorkflowError> {
        for (attempt, encoding) in SrtEncoding::FALLBACK_ORDER.into_iter().enumerate() {
            if attempt > 0 {
                warn!("{}", IMPORT_RETRY_NOTICE);
                self.host.notify(IMPORT_RETRY_NOTICE);
                if let Err(e) = self.host.write_text_file(srt_path, content, encoding).await {
                    warn!("Could not rewrite {:?} as {}: {}", srt_path, encoding, e);
                }
            }

            let before = self.bin_count(bin).await;
            match self.host.import_file(srt_path, bin).await {
                Ok(reported) => debug!("Import attempt {} ({}) reported {}", attempt + 1, encoding, reported),
                Err(e) => warn!("Import attempt {} ({}) failed: {}", attempt + 1, encoding, e),
            }
            let after = self.bin_count(bin).await;

            if after > before {
                debug!("Bin grew from {} to {} items", before, after);
                return Ok((after, encoding));
            }
        }

        Err(WorkflowError::ImportFailed {
            path: srt_path.to_path_buf(),
        })
    }
}
