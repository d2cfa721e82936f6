/*!
 * Error types for the scriptcaps application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * The `Display` text of [`WorkflowError`] and [`PlayheadError`] is the exact
 * message shown to the panel user, so wording changes here are visible changes.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning script text into a timing plan
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// No non-blank line survived trimming
    #[error("No valid subtitle lines found in the script.")]
    EmptyScript,

    /// Lines exist but none of them contains a word
    #[error("No words found in the script.")]
    NoWords,

    /// The total duration must be a finite number greater than zero
    #[error("Invalid total duration: {0}")]
    InvalidDuration(f64),

    /// The start offset must be a finite number greater than or equal to zero
    #[error("Invalid start offset: {0}")]
    InvalidOffset(f64),
}

/// Errors reported by a host bridge implementation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// The host has no active sequence to work with
    #[error("No active sequence")]
    NoActiveSequence,

    /// A file operation failed on the host side
    #[error("I/O error on {path:?}: {message}")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// The scripting bridge call itself failed
    #[error("Bridge call failed: {0}")]
    Bridge(String),
}

/// Failures of the subtitle workflow, one per user-visible outcome
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("No active sequence.")]
    NoActiveSequence,

    #[error("Script file not provided.")]
    MissingScriptPath,

    #[error("Invalid start or end time format. Please use HH:MM:SS.")]
    InvalidTimeFormat,

    #[error("End time must be after start time.")]
    EndNotAfterStart,

    #[error("Could not determine video duration. Please make sure your sequence has content.")]
    DurationUndetermined,

    #[error("No script file selected or file does not exist.")]
    ScriptNotFound,

    #[error("Could not read the selected script file. Please save as UTF-16 LE if using non-English text.")]
    ScriptUnreadable,

    #[error("No valid subtitle lines found in the script.")]
    NoValidLines,

    #[error("No words found in the script.")]
    NoWords,

    /// Timing allocation rejected its numeric inputs
    #[error("Invalid timing window: {0}")]
    InvalidTiming(String),

    #[error("Failed to open temp SRT file for writing.")]
    TempFileWrite,

    #[error("No valid destination bin found for import.")]
    NoDestinationBin,

    /// Both the plain and the CRLF + BOM import attempts left the bin unchanged
    #[error("SRT import failed. File: {}", path.display())]
    ImportFailed {
        /// Temp file that the host refused to import
        path: PathBuf,
    },

    #[error("Imported SRT not found in bin after import.")]
    ImportedAssetMissing,

    #[error("Failed to create caption track from imported SRT.")]
    CaptionTrackFailed,
}

impl From<ScriptError> for WorkflowError {
    fn from(error: ScriptError) -> Self {
        match error {
            ScriptError::EmptyScript => Self::NoValidLines,
            ScriptError::NoWords => Self::NoWords,
            other => Self::InvalidTiming(other.to_string()),
        }
    }
}

/// Failures while reading the playhead for time pickup
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayheadError {
    #[error("ERROR: No active sequence.")]
    NoActiveSequence,

    #[error("ERROR: Could not get playhead position.")]
    Unavailable,

    #[error("ERROR: {0}")]
    Bridge(String),
}

impl From<HostError> for PlayheadError {
    fn from(error: HostError) -> Self {
        match error {
            HostError::NoActiveSequence => Self::NoActiveSequence,
            HostError::Bridge(message) => Self::Bridge(message),
            other => Self::Bridge(other.to_string()),
        }
    }
}
