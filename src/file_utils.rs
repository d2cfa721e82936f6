use anyhow::{Result, Context, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use once_cell::sync::Lazy;
use regex::Regex;
use log::debug;

use crate::srt_encoder::{SrtEncoding, UTF8_BOM};

// @module: File and directory utilities

// @const: file:// prefix, any case
static FILE_URL_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^file://").unwrap());

// @const: "/C:" style drive prefix left over from URL paths
static SLASHED_DRIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^/[A-Z]:").unwrap());

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Normalize a script path coming from a file picker.
    ///
    /// Backslashes become forward slashes and a `file://` prefix is dropped.
    /// The absolute path of a `file:///` URL keeps its root, and `/C:/...`
    /// becomes `C:/...`.
    pub fn normalize_script_path(raw: &str) -> PathBuf {
        let forward = raw.trim().replace('\\', "/");
        let without_scheme = FILE_URL_PREFIX.replace(&forward, "").into_owned();

        let normalized = if SLASHED_DRIVE.is_match(&without_scheme) {
            without_scheme[1..].to_string()
        } else {
            without_scheme
        };

        PathBuf::from(normalized)
    }

    /// Decode script bytes, trying UTF-16 before UTF-8.
    ///
    /// UTF-16 is recognised by its byte-order mark (LE or BE). Otherwise the
    /// bytes are read as UTF-8 with any UTF-8 BOM removed. Returns `None` when
    /// neither decoding yields any text.
    pub fn decode_script_bytes(bytes: &[u8]) -> Option<String> {
        if let Some(text) = Self::decode_utf16(bytes) {
            if !text.is_empty() {
                return Some(text);
            }
        }

        let text = String::from_utf8(bytes.to_vec()).ok()?;
        let text = text.strip_prefix(UTF8_BOM).map(str::to_string).unwrap_or(text);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn decode_utf16(bytes: &[u8]) -> Option<String> {
        let (body, little_endian) = match bytes {
            [0xFF, 0xFE, rest @ ..] => (rest, true),
            [0xFE, 0xFF, rest @ ..] => (rest, false),
            _ => return None,
        };

        if body.len() % 2 != 0 {
            debug!("UTF-16 body has an odd byte count, ignoring trailing byte");
        }

        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| {
                if little_endian {
                    u16::from_le_bytes([pair[0], pair[1]])
                } else {
                    u16::from_be_bytes([pair[0], pair[1]])
                }
            })
            .collect();

        String::from_utf16(&units).ok()
    }

    /// Read a script file, trying UTF-16 first and UTF-8 second
    pub fn read_script_text<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read file: {:?}", path))?;

        Self::decode_script_bytes(&bytes)
            .ok_or_else(|| anyhow!("File is empty or not valid UTF-16/UTF-8 text: {:?}", path))
    }

    /// Write text in the given SRT encoding, replacing any existing file
    pub fn write_text_file<P: AsRef<Path>>(path: P, content: &str, encoding: SrtEncoding) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, encoding.encode(content))
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to)?;

        Ok(())
    }

    /// List regular files directly inside `dir`, sorted by name
    pub fn list_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            if entry.file_type().is_file() {
                result.push(entry.path().to_path_buf());
            }
        }

        Ok(result)
    }

    /// Scratch path for one workflow run: `temp_subtitles_{unix_millis}.srt`
    pub fn temp_subtitle_path<P: AsRef<Path>>(dir: P, unix_millis: i64) -> PathBuf {
        dir.as_ref().join(format!("temp_subtitles_{}.srt", unix_millis))
    }
}
