use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, anyhow};
use log::{warn, debug};
use serde::{Deserialize, Serialize};

use crate::script_parser::TimingPlan;
use crate::timecode::to_srt_time;
use crate::word_spacing::WordSpacing;

// @module: SRT document construction and encoding

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2,}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2,}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

/// UTF-8 byte-order mark
pub const UTF8_BOM: char = '\u{FEFF}';

/// Physical encoding used when writing an SRT document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SrtEncoding {
    /// UTF-8 without BOM, `\n` line endings (first attempt)
    Utf8Unix,
    /// UTF-8 with BOM, `\r\n` line endings (fallback attempt)
    Utf8BomWindows,
}

impl SrtEncoding {
    /// Import attempts in the order they are tried
    pub const FALLBACK_ORDER: [SrtEncoding; 2] = [SrtEncoding::Utf8Unix, SrtEncoding::Utf8BomWindows];

    pub fn line_ending(&self) -> &'static str {
        match self {
            Self::Utf8Unix => "\n",
            Self::Utf8BomWindows => "\r\n",
        }
    }

    pub fn has_bom(&self) -> bool {
        matches!(self, Self::Utf8BomWindows)
    }

    /// Apply this encoding's line endings and BOM to `text`
    pub fn apply(&self, text: &str) -> String {
        let unix = text.replace("\r\n", "\n");
        let body = match self {
            Self::Utf8Unix => unix,
            Self::Utf8BomWindows => unix.replace('\n', "\r\n"),
        };

        if self.has_bom() {
            let mut out = String::with_capacity(body.len() + UTF8_BOM.len_utf8());
            out.push(UTF8_BOM);
            out.push_str(&body);
            out
        } else {
            body
        }
    }

    /// Encode `text` to the bytes that go on disk
    pub fn encode(&self, text: &str) -> Vec<u8> {
        self.apply(text).into_bytes()
    }
}

impl fmt::Display for SrtEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8Unix => write!(f, "UTF-8 (LF)"),
            Self::Utf8BomWindows => write!(f, "UTF-8 with BOM (CRLF)"),
        }
    }
}

// @struct: Single caption block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    // @field: 1-based sequence number
    pub index: usize,

    // @field: Start time in seconds
    pub start_seconds: f64,

    // @field: End time in seconds
    pub end_seconds: f64,

    // @field: Display text (already spaced)
    pub text: String,
}

impl Caption {
    pub fn new(index: usize, start_seconds: f64, end_seconds: f64, text: String) -> Self {
        Caption {
            index,
            start_seconds,
            end_seconds,
            text,
        }
    }

    /// Start time as `HH:MM:SS,mmm`
    pub fn format_start_time(&self) -> String {
        to_srt_time(self.start_seconds)
    }

    /// End time as `HH:MM:SS,mmm`
    pub fn format_end_time(&self) -> String {
        to_srt_time(self.end_seconds)
    }

    /// Parse an SRT timestamp (`HH:MM:SS,mmm`) to seconds
    pub fn parse_timestamp(timestamp: &str) -> Result<f64> {
        let parts: Vec<&str> = timestamp.split(&[':', ','][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().map_err(|_| anyhow!("Failed to parse hours in {}", timestamp))?;
        let minutes: u64 = parts[1].parse().map_err(|_| anyhow!("Failed to parse minutes in {}", timestamp))?;
        let seconds: u64 = parts[2].parse().map_err(|_| anyhow!("Failed to parse seconds in {}", timestamp))?;
        let millis: u64 = parts[3].parse().map_err(|_| anyhow!("Failed to parse milliseconds in {}", timestamp))?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        let total_ms = hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis;
        Ok(total_ms as f64 / 1000.0)
    }
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered caption blocks ready to serialize
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SrtDocument {
    pub captions: Vec<Caption>,
}

impl SrtDocument {
    pub fn new(captions: Vec<Caption>) -> Self {
        SrtDocument { captions }
    }

    /// One caption per plan entry, in plan order, with spacing applied to the text
    pub fn from_plan(plan: &TimingPlan, spacing: WordSpacing) -> Self {
        let captions = plan
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                Caption::new(i + 1, entry.start_seconds, entry.end_seconds, spacing.apply(&entry.text))
            })
            .collect();

        SrtDocument { captions }
    }

    pub fn len(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    /// Serialize with `\n` line endings and no BOM
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Serialize to on-disk bytes in the given encoding
    pub fn encode(&self, encoding: SrtEncoding) -> Vec<u8> {
        encoding.encode(&self.render())
    }

    /// Parse SRT text back into captions.
    ///
    /// A leading BOM and either line-ending style are accepted. Malformed
    /// blocks are skipped with a warning; an input with no usable block is an
    /// error. Unlike a general-purpose reader this does not reorder blocks.
    pub fn parse(content: &str) -> Result<Self> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let mut captions = Vec::new();

        let mut current_index: Option<usize> = None;
        let mut current_times: Option<(f64, f64)> = None;
        let mut current_text = String::new();

        let finish = |index: Option<usize>, times: Option<(f64, f64)>, text: &mut String, captions: &mut Vec<Caption>| {
            if let (Some(index), Some((start, end))) = (index, times) {
                if text.is_empty() {
                    warn!("Skipping empty caption block {}", index);
                } else {
                    captions.push(Caption::new(index, start, end, text.clone()));
                }
            }
            text.clear();
        };

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');

            if line.trim().is_empty() {
                if current_times.is_some() && !current_text.is_empty() {
                    finish(current_index.take(), current_times.take(), &mut current_text, &mut captions);
                }
                continue;
            }

            if current_index.is_none() && current_text.is_empty() {
                if let Ok(num) = line.trim().parse::<usize>() {
                    current_index = Some(num);
                    continue;
                }
            }

            if current_index.is_some() && current_times.is_none() {
                if let Some(caps) = TIMESTAMP_REGEX.captures(line) {
                    let start = Self::timestamp_from_captures(&caps, 1);
                    let end = Self::timestamp_from_captures(&caps, 5);
                    match (start, end) {
                        (Ok(start), Ok(end)) => {
                            current_times = Some((start, end));
                            continue;
                        }
                        _ => warn!("Invalid timestamp at line {}: {}", line_no + 1, line),
                    }
                }
            }

            if current_times.is_some() {
                if !current_text.is_empty() {
                    current_text.push('\n');
                }
                current_text.push_str(line);
            } else {
                warn!("Unexpected text at line {} before index or timestamp: {}", line_no + 1, line);
            }
        }

        finish(current_index, current_times, &mut current_text, &mut captions);

        if captions.is_empty() {
            return Err(anyhow!("No valid caption blocks were found in the SRT content"));
        }

        debug!("Parsed {} caption blocks", captions.len());
        Ok(SrtDocument { captions })
    }

    fn timestamp_from_captures(caps: &regex::Captures, start_idx: usize) -> Result<f64> {
        let field = |offset: usize| caps.get(start_idx + offset).map_or("", |m| m.as_str());
        Caption::parse_timestamp(&format!("{}:{}:{},{}", field(0), field(1), field(2), field(3)))
    }
}

impl fmt::Display for SrtDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for caption in &self.captions {
            write!(f, "{}", caption)?;
        }
        Ok(())
    }
}
