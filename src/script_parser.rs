/*!
 * Script parsing and word-weighted timing allocation.
 *
 * A script is plain text with one caption per line. Blank lines are dropped,
 * and the requested window is split across the remaining lines in proportion
 * to how many words each line holds.
 */

use log::debug;

use crate::errors::ScriptError;

// Whitespace as the panel's trim understands it: Unicode White_Space
// (which covers NBSP) plus the byte-order mark.
fn is_script_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Convert `\r\n` and lone `\r` line endings to `\n`
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Count maximal whitespace-delimited tokens
pub fn count_words(text: &str) -> usize {
    text.split(is_script_whitespace)
        .filter(|token| !token.is_empty())
        .count()
}

/// A trimmed, non-empty line of script text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    text: String,
    word_count: usize,
}

impl ScriptLine {
    /// Build a line from raw text; `None` when nothing is left after trimming
    pub fn new(raw: &str) -> Option<Self> {
        let text = raw.trim_matches(is_script_whitespace);
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            word_count: count_words(text),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }
}

/// Split raw script text into trimmed, non-empty lines.
///
/// Fails with [`ScriptError::EmptyScript`] if every line is blank.
pub fn parse_script(raw: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let normalized = normalize_line_endings(raw);
    let lines: Vec<ScriptLine> = normalized.split('\n').filter_map(ScriptLine::new).collect();

    if lines.is_empty() {
        return Err(ScriptError::EmptyScript);
    }

    debug!("Parsed {} script lines", lines.len());
    Ok(lines)
}

/// One line of a timing plan
#[derive(Debug, Clone, PartialEq)]
pub struct TimedLine {
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl TimedLine {
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// Contiguous, gap-free schedule of script lines over a time window
#[derive(Debug, Clone, PartialEq)]
pub struct TimingPlan {
    offset: f64,
    total_duration: f64,
    entries: Vec<TimedLine>,
}

impl TimingPlan {
    /// Allocate `total_duration` seconds across `lines`, starting at `offset`.
    ///
    /// Each line gets `total_duration * words / total_words`. Start times are
    /// accumulated: a line starts exactly where the previous one ended.
    pub fn allocate(lines: &[ScriptLine], total_duration: f64, offset: f64) -> Result<Self, ScriptError> {
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(ScriptError::InvalidDuration(total_duration));
        }
        if !offset.is_finite() || offset < 0.0 {
            return Err(ScriptError::InvalidOffset(offset));
        }
        if lines.is_empty() {
            return Err(ScriptError::EmptyScript);
        }

        let total_words: usize = lines.iter().map(ScriptLine::word_count).sum();
        if total_words == 0 {
            return Err(ScriptError::NoWords);
        }

        let mut entries = Vec::with_capacity(lines.len());
        let mut start = offset;
        for line in lines {
            let share = line.word_count() as f64 / total_words as f64;
            let end = start + total_duration * share;
            entries.push(TimedLine {
                text: line.text().to_string(),
                start_seconds: start,
                end_seconds: end,
            });
            start = end;
        }

        debug!(
            "Allocated {:.3}s over {} lines ({} words) from offset {:.3}s",
            total_duration,
            entries.len(),
            total_words,
            offset
        );

        Ok(Self {
            offset,
            total_duration,
            entries,
        })
    }

    /// Parse `raw` and allocate it in one step
    pub fn from_script(raw: &str, total_duration: f64, offset: f64) -> Result<Self, ScriptError> {
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(ScriptError::InvalidDuration(total_duration));
        }
        let lines = parse_script(raw)?;
        Self::allocate(&lines, total_duration, offset)
    }

    pub fn entries(&self) -> &[TimedLine] {
        &self.entries
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
