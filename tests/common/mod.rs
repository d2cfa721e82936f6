/*!
 * Common test utilities for the scriptcaps test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use std::sync::Once;
use anyhow::Result;
use tempfile::TempDir;

static LOGGER: Once = Once::new();

/// Route library logs through env_logger (RUST_LOG controls the level)
pub fn init_logging() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Encodes text as UTF-16 LE with a byte-order mark
pub fn utf16le_bytes(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

/// A short script with blank lines and mixed line endings
pub const SAMPLE_SCRIPT: &str = "Welcome to the show\r\n\r\nToday we talk about Rust\rand captions\n   \nThanks for watching\n";

/// Word counts of the non-blank lines of `SAMPLE_SCRIPT`
pub const SAMPLE_WORD_COUNTS: [usize; 4] = [4, 5, 2, 3];

/// Asserts two floats are equal within a tolerance
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} to be close to {}",
        actual,
        expected
    );
}
