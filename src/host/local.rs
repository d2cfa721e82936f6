/*!
 * Directory-backed host used by the command-line tool.
 *
 * A project is a directory on disk:
 * - the insertion bin is a sub-directory; each file in it is one bin item
 * - importing validates the SRT and copies it into the bin; bin order is
 *   import order, kept in `bin_order.json` under the root
 * - a caption track is written as a JSON manifest under `captions/`
 * - sequence timing comes from the `project.sequence` configuration
 */

use async_trait::async_trait;
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::app_config::{Config, SequenceConfig};
use crate::errors::HostError;
use crate::file_utils::FileManager;
use crate::host::{AssetRef, BinId, DurationStrategy, HostBridge};
use crate::srt_encoder::{Caption, SrtDocument, UTF8_BOM};

/// Caption track manifest written by [`LocalProjectHost::create_caption_track`]
#[derive(Debug, Serialize)]
struct CaptionTrackManifest<'a> {
    asset: &'a AssetRef,
    start_at_seconds: f64,
    captions: Vec<Caption>,
}

/// Host backed by a project directory
#[derive(Debug, Clone)]
pub struct LocalProjectHost {
    root: PathBuf,
    bin_dir: PathBuf,
    import_requires_bom: bool,
    sequence: Option<SequenceConfig>,
}

impl LocalProjectHost {
    pub fn new(root: PathBuf, bin_dir: PathBuf, sequence: Option<SequenceConfig>) -> Self {
        Self {
            root,
            bin_dir,
            import_requires_bom: false,
            sequence,
        }
    }

    /// Build from the `project` section of the configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.project.root.clone(),
            bin_dir: config.bin_path(),
            import_requires_bom: config.project.import_requires_bom,
            sequence: config.project.sequence.clone(),
        }
    }

    /// Only accept imports that start with a UTF-8 BOM
    pub fn requiring_bom(mut self) -> Self {
        self.import_requires_bom = true;
        self
    }

    pub fn captions_dir(&self) -> PathBuf {
        self.root.join("captions")
    }

    fn io_error(path: &Path, error: impl std::fmt::Display) -> HostError {
        HostError::Io {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }

    fn sequence(&self) -> Result<&SequenceConfig, HostError> {
        self.sequence.as_ref().ok_or(HostError::NoActiveSequence)
    }

    /// Import log: bin file names, oldest first
    pub fn bin_order_path(&self) -> PathBuf {
        self.root.join("bin_order.json")
    }

    fn read_bin_order(&self) -> Result<Vec<String>, HostError> {
        let path = self.bin_order_path();
        if !FileManager::file_exists(&path) {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&path).map_err(|e| Self::io_error(&path, e))?;
        serde_json::from_str(&json).map_err(|e| Self::io_error(&path, e))
    }

    fn write_bin_order(&self, order: &[String]) -> Result<(), HostError> {
        let path = self.bin_order_path();
        let json = serde_json::to_string_pretty(order).map_err(|e| HostError::Bridge(e.to_string()))?;
        FileManager::ensure_dir(&self.root).map_err(|e| Self::io_error(&self.root, e))?;
        std::fs::write(&path, json).map_err(|e| Self::io_error(&path, e))
    }

    fn file_name_of(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Bin files in bin order.
    ///
    /// Files the import log does not know about come first, by name; logged
    /// imports follow in import order, so the newest import is always last.
    fn bin_files(&self) -> Result<Vec<PathBuf>, HostError> {
        if !FileManager::dir_exists(&self.bin_dir) {
            return Ok(Vec::new());
        }
        let files = FileManager::list_files(&self.bin_dir).map_err(|e| Self::io_error(&self.bin_dir, e))?;
        let order = self.read_bin_order()?;

        let (mut unlogged, logged): (Vec<PathBuf>, Vec<PathBuf>) = files
            .into_iter()
            .partition(|path| !order.contains(&Self::file_name_of(path)));

        for name in &order {
            if let Some(path) = logged.iter().find(|path| Self::file_name_of(path) == *name) {
                unlogged.push(path.clone());
            }
        }
        Ok(unlogged)
    }

    // First `{n:04}_{name}` target that is not taken, starting at the log length
    fn import_target(&self, file_name: &str, order: &[String]) -> PathBuf {
        let mut position = order.len();
        loop {
            let target = self.bin_dir.join(format!("{:04}_{}", position, file_name));
            if !target.exists() {
                return target;
            }
            position += 1;
        }
    }

    // Validate an SRT the way a picky importer would
    fn accepts(&self, bytes: &[u8]) -> bool {
        let bom = UTF8_BOM.to_string();
        if self.import_requires_bom && !bytes.starts_with(bom.as_bytes()) {
            warn!("Import rejected: file has no UTF-8 BOM");
            return false;
        }

        match std::str::from_utf8(bytes) {
            Ok(text) => match SrtDocument::parse(text) {
                Ok(_) => true,
                Err(e) => {
                    warn!("Import rejected: {}", e);
                    false
                }
            },
            Err(e) => {
                warn!("Import rejected: not UTF-8 ({})", e);
                false
            }
        }
    }
}

#[async_trait]
impl HostBridge for LocalProjectHost {
    async fn has_active_sequence(&self) -> Result<bool, HostError> {
        Ok(self.sequence.is_some())
    }

    async fn probe_sequence_duration(&self, strategy: DurationStrategy) -> Result<Option<f64>, HostError> {
        let sequence = self.sequence()?;
        let value = match strategy {
            DurationStrategy::SequenceEnd => sequence.end_seconds,
            DurationStrategy::SequenceDuration => sequence.duration_seconds,
            DurationStrategy::ClipExtent => sequence.clip_ends.iter().copied().reduce(f64::max),
            DurationStrategy::PlayerBounds => sequence.player_bounds_seconds,
        };
        Ok(value)
    }

    async fn playhead_position(&self) -> Result<Option<f64>, HostError> {
        Ok(self.sequence()?.playhead_seconds)
    }

    async fn insertion_bin(&self) -> Result<Option<BinId>, HostError> {
        FileManager::ensure_dir(&self.bin_dir).map_err(|e| Self::io_error(&self.bin_dir, e))?;
        Ok(Some(BinId(self.bin_dir.display().to_string())))
    }

    async fn bin_item_count(&self, _bin: &BinId) -> Result<usize, HostError> {
        Ok(self.bin_files()?.len())
    }

    async fn import_file(&self, path: &Path, _bin: &BinId) -> Result<bool, HostError> {
        let bytes = std::fs::read(path).map_err(|e| Self::io_error(path, e))?;
        if !self.accepts(&bytes) {
            return Ok(false);
        }

        let mut file_name = Self::file_name_of(path);
        if file_name.is_empty() {
            file_name = "import.srt".to_string();
        }
        let mut order = self.read_bin_order()?;
        let target = self.import_target(&file_name, &order);

        FileManager::copy_file(path, &target).map_err(|e| Self::io_error(&target, e))?;
        order.retain(|name| self.bin_dir.join(name).exists());
        order.push(Self::file_name_of(&target));
        self.write_bin_order(&order)?;

        info!("Imported {:?} into bin as {:?}", path, target);
        Ok(true)
    }

    async fn bin_item(&self, _bin: &BinId, index: usize) -> Result<Option<AssetRef>, HostError> {
        let files = self.bin_files()?;
        Ok(files.get(index).map(|path| {
            let name = Self::file_name_of(path);
            AssetRef {
                id: name.clone(),
                name,
                media_path: Some(path.clone()),
            }
        }))
    }

    async fn create_caption_track(&self, asset: &AssetRef, start_at_seconds: f64) -> Result<bool, HostError> {
        self.sequence()?;

        let Some(media_path) = asset.media_path.as_ref() else {
            warn!("Asset {} has no media file", asset.name);
            return Ok(false);
        };

        let text = self.read_text_file(media_path).await?;
        let document = match SrtDocument::parse(&text) {
            Ok(document) => document,
            Err(e) => {
                warn!("Asset {} is not a caption file: {}", asset.name, e);
                return Ok(false);
            }
        };

        let manifest = CaptionTrackManifest {
            asset,
            start_at_seconds,
            captions: document.captions,
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| HostError::Bridge(e.to_string()))?;

        let captions_dir = self.captions_dir();
        FileManager::ensure_dir(&captions_dir).map_err(|e| Self::io_error(&captions_dir, e))?;
        let stem = Path::new(&asset.name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| asset.id.clone());
        let manifest_path = captions_dir.join(format!("{}.track.json", stem));
        std::fs::write(&manifest_path, json).map_err(|e| Self::io_error(&manifest_path, e))?;

        info!("Caption track written to {:?}", manifest_path);
        Ok(true)
    }

    fn notify(&self, message: &str) {
        info!("[event panel] {}", message);
    }
}
