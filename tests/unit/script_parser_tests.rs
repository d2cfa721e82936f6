/*!
 * Tests for script parsing and timing allocation
 */

use scriptcaps::errors::ScriptError;
use scriptcaps::script_parser::{count_words, normalize_line_endings, parse_script, TimingPlan};
use crate::common::{self, assert_close};

/// Test that every line-ending style splits lines
#[test]
fn test_parse_script_withMixedLineEndings_shouldSplitAndDropBlanks() {
    let lines = parse_script(common::SAMPLE_SCRIPT).unwrap();
    let texts: Vec<&str> = lines.iter().map(|l| l.text()).collect();

    assert_eq!(
        texts,
        vec!["Welcome to the show", "Today we talk about Rust", "and captions", "Thanks for watching"]
    );
    let counts: Vec<usize> = lines.iter().map(|l| l.word_count()).collect();
    assert_eq!(counts, common::SAMPLE_WORD_COUNTS.to_vec());
}

/// Test line ending normalization
#[test]
fn test_normalize_line_endings_withCrAndCrLf_shouldProduceLf() {
    assert_eq!(normalize_line_endings("a\r\nb\rc\nd"), "a\nb\nc\nd");
    assert_eq!(normalize_line_endings("\r\r\n"), "\n\n");
}

/// Test that a blank script is rejected
#[test]
fn test_parse_script_withOnlyWhitespace_shouldFailWithEmptyScript() {
    assert_eq!(parse_script(""), Err(ScriptError::EmptyScript));
    assert_eq!(parse_script(" \n\t\r\n\u{00A0}\u{FEFF}\n"), Err(ScriptError::EmptyScript));
}

/// Test word counting on whitespace runs
#[test]
fn test_count_words_withWhitespaceRuns_shouldCountNonEmptyTokens() {
    assert_eq!(count_words("Hello world"), 2);
    assert_eq!(count_words("  Hello \t  world  again "), 3);
    assert_eq!(count_words("one"), 1);
}

/// Test the documented end-to-end timing example
#[test]
fn test_allocate_withHelloWorldScript_shouldSplitTwoThirdsOneThird() {
    let plan = TimingPlan::from_script("Hello world\nGoodbye", 10.0, 0.0).unwrap();
    let entries = plan.entries();

    assert_eq!(entries.len(), 2);
    assert_close(entries[0].start_seconds, 0.0);
    assert_close(entries[0].end_seconds, 20.0 / 3.0);
    assert_eq!(entries[1].start_seconds, entries[0].end_seconds);
    assert_close(entries[1].end_seconds, 10.0);
}

/// Test each duration is proportional to the line's word share
#[test]
fn test_allocate_withSampleScript_shouldBeProportionalAndContiguous() {
    let offset = 12.5;
    let duration = 70.0;
    let plan = TimingPlan::from_script(common::SAMPLE_SCRIPT, duration, offset).unwrap();
    let total_words: usize = common::SAMPLE_WORD_COUNTS.iter().sum();

    assert_eq!(plan.entries()[0].start_seconds, offset);
    for (i, entry) in plan.entries().iter().enumerate() {
        let expected = duration * common::SAMPLE_WORD_COUNTS[i] as f64 / total_words as f64;
        assert!((entry.duration() - expected).abs() < 1e-9);
        if i > 0 {
            assert_eq!(entry.start_seconds, plan.entries()[i - 1].end_seconds);
        }
    }
    let last = plan.entries().last().unwrap();
    assert!((last.end_seconds - (offset + duration)).abs() < 1e-9);
}

/// Test a single line takes the whole window
#[test]
fn test_allocate_withSingleLine_shouldTakeEntireDuration() {
    let plan = TimingPlan::from_script("  just one line here  ", 42.0, 3.0).unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.entries()[0].start_seconds, 3.0);
    assert_eq!(plan.entries()[0].end_seconds, 45.0);
    assert_eq!(plan.entries()[0].text, "just one line here");
}

/// Test invalid numeric inputs are rejected before allocation
#[test]
fn test_allocate_withInvalidWindow_shouldFail() {
    assert_eq!(
        TimingPlan::from_script("a b", -1.0, 0.0),
        Err(ScriptError::InvalidDuration(-1.0))
    );
    assert_eq!(
        TimingPlan::from_script("a b", 5.0, -2.0),
        Err(ScriptError::InvalidOffset(-2.0))
    );
    assert!(matches!(
        TimingPlan::from_script("a b", f64::NAN, 0.0),
        Err(ScriptError::InvalidDuration(_))
    ));
}

/// Test the duration check happens even for blank scripts
#[test]
fn test_from_script_withZeroDurationAndBlankScript_shouldReportDuration() {
    assert_eq!(
        TimingPlan::from_script("", 0.0, 0.0),
        Err(ScriptError::InvalidDuration(0.0))
    );
}
