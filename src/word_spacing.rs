use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

// @module: Decorative widening of inter-word gaps

/// Unicode THIN SPACE, roughly a fifth of an ordinary space
pub const THIN_SPACE: char = '\u{2009}';

/// Smallest accepted spacing factor
pub const MIN_WORD_SPACING: f64 = 1.0;

/// Largest accepted spacing factor
pub const MAX_WORD_SPACING: f64 = 15.0;

// Thin spaces that stand in for one ordinary space
const THIN_SPACES_PER_SPACE: f64 = 5.0;

// @const: Maximal run of ordinary spaces
static SPACE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());

/// Word spacing factor, always within `[1, 15]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct WordSpacing(f64);

impl WordSpacing {
    /// Create a spacing factor, clamping it into `[1, 15]`.
    ///
    /// Non-finite input (NaN) falls back to the minimum.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(MIN_WORD_SPACING);
        }
        Self(value.clamp(MIN_WORD_SPACING, MAX_WORD_SPACING))
    }

    /// The clamped factor
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Number of ordinary spaces per gap (integer part of the factor)
    pub fn spaces(&self) -> usize {
        self.0.floor() as usize
    }

    /// Number of thin spaces per gap, derived from the fractional part.
    ///
    /// Zero when the factor is whole, otherwise `round(fraction * 5)` but never
    /// less than one.
    pub fn thin_spaces(&self) -> usize {
        let fraction = self.0 - self.0.floor();
        if fraction > 0.0 {
            ((fraction * THIN_SPACES_PER_SPACE).round() as usize).max(1)
        } else {
            0
        }
    }

    /// The run that replaces each existing gap
    pub fn separator(&self) -> String {
        let mut separator = " ".repeat(self.spaces());
        separator.extend(std::iter::repeat_n(THIN_SPACE, self.thin_spaces()));
        separator
    }

    /// Replace every run of spaces in `line` with this factor's separator.
    ///
    /// Only existing runs of U+0020 are rewritten; words without a space
    /// between them stay joined, and tabs or other whitespace are untouched.
    pub fn apply(&self, line: &str) -> String {
        let separator = self.separator();
        SPACE_RUN_REGEX
            .replace_all(line, NoExpand(&separator))
            .into_owned()
    }
}

impl Default for WordSpacing {
    fn default() -> Self {
        Self(MIN_WORD_SPACING)
    }
}

impl From<f64> for WordSpacing {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<WordSpacing> for f64 {
    fn from(spacing: WordSpacing) -> Self {
        spacing.0
    }
}

impl std::fmt::Display for WordSpacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
