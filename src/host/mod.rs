/*!
 * Boundary to the video-editing host.
 *
 * The caption workflow never talks to a host object model directly. It goes
 * through the [`HostBridge`] trait, which exposes the handful of capabilities
 * the workflow needs:
 * - sequence queries (active sequence, duration probes, playhead)
 * - text file reads and writes
 * - importing a file into a project bin and looking up bin items
 * - creating a caption track from an imported asset
 * - posting a message to the host's event panel
 *
 * Implementations:
 * - `mock`: scriptable in-memory host used by tests
 * - `local`: directory-backed project used by the command-line tool
 */

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::path::{Path, PathBuf};

use crate::errors::HostError;
use crate::file_utils::FileManager;
use crate::srt_encoder::SrtEncoding;

pub mod local;
pub mod mock;

/// Identifier of a project bin (folder) that receives imports
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinId(pub String);

impl fmt::Display for BinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An item that lives in a project bin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Host-specific identifier
    pub id: String,
    /// Display name in the bin
    pub name: String,
    /// Backing media file, when the host exposes one
    pub media_path: Option<PathBuf>,
}

/// Ways of asking the host how long the active sequence is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationStrategy {
    /// End point of the sequence
    SequenceEnd,
    /// Duration property of the sequence
    SequenceDuration,
    /// Latest clip end across all video tracks
    ClipExtent,
    /// Width of the player bounds
    PlayerBounds,
}

impl DurationStrategy {
    /// Probes in the order they are tried
    pub const ORDER: [DurationStrategy; 4] = [
        DurationStrategy::SequenceEnd,
        DurationStrategy::SequenceDuration,
        DurationStrategy::ClipExtent,
        DurationStrategy::PlayerBounds,
    ];
}

impl fmt::Display for DurationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SequenceEnd => "sequence end",
            Self::SequenceDuration => "sequence duration",
            Self::ClipExtent => "clip extent",
            Self::PlayerBounds => "player bounds",
        };
        write!(f, "{}", name)
    }
}

/// Capabilities the caption workflow consumes from a host application
#[async_trait]
pub trait HostBridge: Send + Sync + Debug {
    /// Whether a sequence is currently open and active
    async fn has_active_sequence(&self) -> Result<bool, HostError>;

    /// Run one duration probe against the active sequence
    ///
    /// # Returns
    /// * `Ok(Some(seconds))` - the probe produced a value (not necessarily positive)
    /// * `Ok(None)` - the host has nothing for this probe
    async fn probe_sequence_duration(&self, strategy: DurationStrategy) -> Result<Option<f64>, HostError>;

    /// Current playhead position in seconds
    async fn playhead_position(&self) -> Result<Option<f64>, HostError>;

    /// Check whether a file exists at `path`
    async fn file_exists(&self, path: &Path) -> bool {
        FileManager::file_exists(path)
    }

    /// Read a text file, trying UTF-16 first and UTF-8 second
    async fn read_text_file(&self, path: &Path) -> Result<String, HostError> {
        FileManager::read_script_text(path).map_err(|e| HostError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write (or overwrite) a text file in the given encoding
    async fn write_text_file(&self, path: &Path, text: &str, encoding: SrtEncoding) -> Result<(), HostError> {
        FileManager::write_text_file(path, text, encoding).map_err(|e| HostError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The bin new imports go into, if the project has one
    async fn insertion_bin(&self) -> Result<Option<BinId>, HostError>;

    /// Number of items currently in `bin`
    async fn bin_item_count(&self, bin: &BinId) -> Result<usize, HostError>;

    /// Ask the host to import `path` into `bin`.
    ///
    /// The returned flag is whatever the host reports. Hosts are known to
    /// report success without importing anything, so callers verify the
    /// import by comparing [`HostBridge::bin_item_count`] before and after.
    async fn import_file(&self, path: &Path, bin: &BinId) -> Result<bool, HostError>;

    /// Item at `index` in `bin`
    async fn bin_item(&self, bin: &BinId, index: usize) -> Result<Option<AssetRef>, HostError>;

    /// Create a caption track on the active sequence from an imported asset
    async fn create_caption_track(&self, asset: &AssetRef, start_at_seconds: f64) -> Result<bool, HostError>;

    /// Post a message to the host's event panel. Best effort, never fails.
    fn notify(&self, message: &str);
}

/// Determine the active sequence's duration by trying each probe in order.
///
/// The first strictly positive value wins. Probe errors are logged and
/// skipped. When every probe comes up empty, `fallback_secs` is returned.
/// Returns `None` only when there is no active sequence at all.
pub async fn resolve_sequence_duration<H>(host: &H, fallback_secs: f64) -> Option<f64>
where
    H: HostBridge + ?Sized,
{
    match host.has_active_sequence().await {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("Could not query active sequence: {}", e);
            return None;
        }
    }

    for strategy in DurationStrategy::ORDER {
        match host.probe_sequence_duration(strategy).await {
            Ok(Some(seconds)) if seconds.is_finite() && seconds > 0.0 => {
                debug!("Sequence duration {:.3}s from {}", seconds, strategy);
                return Some(seconds);
            }
            Ok(_) => debug!("No usable duration from {}", strategy),
            Err(e) => debug!("Duration probe {} failed: {}", strategy, e),
        }
    }

    warn!(
        "Could not determine sequence duration, defaulting to {} seconds",
        fallback_secs
    );
    Some(fallback_secs)
}
