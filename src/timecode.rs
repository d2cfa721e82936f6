use once_cell::sync::Lazy;
use regex::Regex;

// @module: Time formatting and parsing helpers

// @const: User-entered time regex (H:MM:SS or HH:MM:SS with optional fraction)
static TIME_INPUT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{1,2}):(\d{1,2})(?:[.,](\d{1,3}))?$").unwrap()
});

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`).
///
/// The value is rounded to the nearest millisecond first. Hours are not
/// wrapped at 24; they keep growing (and widen past two digits at 100).
/// Negative input formats as zero.
pub fn to_srt_time(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round().max(0.0) as u64;

    let millis = total_ms % 1_000;
    let total_secs = total_ms / 1_000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

/// Format seconds as a display clock (`HH:MM:SS`).
///
/// Unlike [`to_srt_time`] this floors to whole seconds and clamps negative
/// input to zero. It is meant for reporting the playhead, not for SRT content.
pub fn to_hhmmss(seconds: f64) -> String {
    let total_secs = if seconds.is_finite() {
        seconds.floor().max(0.0) as u64
    } else {
        0
    };

    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

/// Parse a user-entered time such as `0:01:30`, `00:01:30` or `00:01:30,250`.
///
/// Surrounding whitespace is ignored. The optional fraction after `.` or `,`
/// is a decimal fraction of a second (`.5` is half a second). Returns `None`
/// when the text does not match, or when minutes or seconds are 60 or more.
/// Hours have no upper bound check.
pub fn parse_time_to_seconds(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let caps = TIME_INPUT_REGEX.captures(trimmed)?;

    let hours: u64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: u64 = caps.get(3)?.as_str().parse().ok()?;
    let millis: u64 = match caps.get(4) {
        Some(fraction) => {
            let digits = fraction.as_str();
            let value: u64 = digits.parse().ok()?;
            value * 10u64.pow(3 - digits.len() as u32)
        }
        None => 0,
    };

    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let total = (hours * 3600 + minutes * 60 + seconds) as f64 + millis as f64 / 1000.0;
    if !total.is_finite() || total < 0.0 {
        return None;
    }

    Some(total)
}
