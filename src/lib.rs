/*!
 * # scriptcaps - Script to caption track
 *
 * A Rust library that turns a plain-text script into timed SubRip (SRT)
 * captions and inserts them into a video editor's active sequence.
 *
 * ## Features
 *
 * - One caption per non-blank script line
 * - Caption durations proportional to each line's word count
 * - Manual (start/end) or automatic (whole sequence) timing windows
 * - Adjustable word spacing using ordinary and thin spaces
 * - UTF-16 and UTF-8 script files
 * - Two-step import with a CRLF + BOM fallback for picky hosts
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timecode`: SRT timestamps, display clock, user time parsing
 * - `script_parser`: Script lines and word-weighted timing plans
 * - `word_spacing`: Inter-word gap widening
 * - `srt_encoder`: SRT documents and their on-disk encodings
 * - `host`: The host application boundary:
 *   - `host::mock`: In-memory host for tests
 *   - `host::local`: Directory-backed project
 * - `app_controller`: The caption workflow
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod host;
pub mod script_parser;
pub mod srt_encoder;
pub mod timecode;
pub mod word_spacing;

// Re-export main types for easier usage
pub use app_config::{Config, TimingMode};
pub use app_controller::{Controller, TimingWindow, WorkflowOutcome, WorkflowRequest};
pub use errors::{HostError, PlayheadError, ScriptError, WorkflowError};
pub use host::HostBridge;
pub use script_parser::{ScriptLine, TimedLine, TimingPlan};
pub use srt_encoder::{Caption, SrtDocument, SrtEncoding};
pub use timecode::{parse_time_to_seconds, to_hhmmss, to_srt_time};
pub use word_spacing::WordSpacing;
