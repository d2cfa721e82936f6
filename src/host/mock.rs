/*!
 * In-memory host for testing.
 *
 * `MockHost` keeps files, bins and sequence state in memory and records every
 * interaction, so the workflow can be exercised without a host application:
 * - `MockHost::new()` - active sequence, empty bin, imports accepted
 * - `with_import_policy(..)` - reject imports, or only accept BOM-prefixed files
 * - `with_probe(..)` / `with_playhead(..)` - scripted sequence answers
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::HostError;
use crate::file_utils::FileManager;
use crate::host::{AssetRef, BinId, DurationStrategy, HostBridge};
use crate::srt_encoder::{SrtEncoding, UTF8_BOM};

/// How the mock reacts to an import request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPolicy {
    /// Every import adds an item to the bin
    AcceptAll,
    /// Only files starting with a UTF-8 BOM are imported
    RequireBom,
    /// Nothing is ever imported (the host still reports success)
    RejectAll,
}

/// A recorded import request
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub accepted: bool,
}

#[derive(Debug)]
struct MockState {
    active_sequence: bool,
    probes: HashMap<DurationStrategy, Result<Option<f64>, HostError>>,
    playhead: Result<Option<f64>, HostError>,
    files: HashMap<PathBuf, Vec<u8>>,
    fail_writes: bool,
    bin: Option<BinId>,
    bin_items: Vec<AssetRef>,
    import_policy: ImportPolicy,
    hide_imported_assets: bool,
    caption_track_result: bool,
    imports: Vec<ImportRecord>,
    caption_tracks: Vec<(AssetRef, f64)>,
    notifications: Vec<String>,
}

/// Scriptable in-memory [`HostBridge`]
#[derive(Debug)]
pub struct MockHost {
    state: Mutex<MockState>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    /// Active sequence with no duration information, one empty bin
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                active_sequence: true,
                probes: HashMap::new(),
                playhead: Ok(None),
                files: HashMap::new(),
                fail_writes: false,
                bin: Some(BinId("root".to_string())),
                bin_items: Vec::new(),
                import_policy: ImportPolicy::AcceptAll,
                hide_imported_assets: false,
                caption_track_result: true,
                imports: Vec::new(),
                caption_tracks: Vec::new(),
                notifications: Vec::new(),
            }),
        }
    }

    /// A host with no open sequence
    pub fn without_sequence() -> Self {
        let host = Self::new();
        host.state.lock().active_sequence = false;
        host
    }

    /// Place a file in the in-memory file system
    pub fn with_file(self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.state.lock().files.insert(path.into(), bytes.into());
        self
    }

    /// Script the answer to one duration probe
    pub fn with_probe(self, strategy: DurationStrategy, answer: Result<Option<f64>, HostError>) -> Self {
        self.state.lock().probes.insert(strategy, answer);
        self
    }

    pub fn with_playhead(self, answer: Result<Option<f64>, HostError>) -> Self {
        self.state.lock().playhead = answer;
        self
    }

    pub fn with_import_policy(self, policy: ImportPolicy) -> Self {
        self.state.lock().import_policy = policy;
        self
    }

    /// Make every write fail
    pub fn with_failing_writes(self) -> Self {
        self.state.lock().fail_writes = true;
        self
    }

    /// Remove the insertion bin
    pub fn without_bin(self) -> Self {
        self.state.lock().bin = None;
        self
    }

    /// Pre-populate the bin with unrelated items
    pub fn with_existing_items(self, count: usize) -> Self {
        {
            let mut state = self.state.lock();
            for i in 0..count {
                state.bin_items.push(AssetRef {
                    id: format!("existing-{}", i),
                    name: format!("clip_{}.mov", i),
                    media_path: None,
                });
            }
        }
        self
    }

    /// Count imports in the bin but never hand them back from `bin_item`
    pub fn with_hidden_imports(self) -> Self {
        self.state.lock().hide_imported_assets = true;
        self
    }

    pub fn with_caption_track_result(self, result: bool) -> Self {
        self.state.lock().caption_track_result = result;
        self
    }

    /// Bytes currently stored at `path`
    pub fn file(&self, path: &Path) -> Option<Vec<u8>> {
        self.state.lock().files.get(path).cloned()
    }

    pub fn imports(&self) -> Vec<ImportRecord> {
        self.state.lock().imports.clone()
    }

    pub fn caption_tracks(&self) -> Vec<(AssetRef, f64)> {
        self.state.lock().caption_tracks.clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.state.lock().notifications.clone()
    }

    pub fn bin_items(&self) -> Vec<AssetRef> {
        self.state.lock().bin_items.clone()
    }
}

#[async_trait]
impl HostBridge for MockHost {
    async fn has_active_sequence(&self) -> Result<bool, HostError> {
        Ok(self.state.lock().active_sequence)
    }

    async fn probe_sequence_duration(&self, strategy: DurationStrategy) -> Result<Option<f64>, HostError> {
        let state = self.state.lock();
        if !state.active_sequence {
            return Err(HostError::NoActiveSequence);
        }
        state.probes.get(&strategy).cloned().unwrap_or(Ok(None))
    }

    async fn playhead_position(&self) -> Result<Option<f64>, HostError> {
        let state = self.state.lock();
        if !state.active_sequence {
            return Err(HostError::NoActiveSequence);
        }
        state.playhead.clone()
    }

    async fn file_exists(&self, path: &Path) -> bool {
        self.state.lock().files.contains_key(path)
    }

    async fn read_text_file(&self, path: &Path) -> Result<String, HostError> {
        let state = self.state.lock();
        let bytes = state.files.get(path).ok_or_else(|| HostError::Io {
            path: path.to_path_buf(),
            message: "file not found".to_string(),
        })?;
        FileManager::decode_script_bytes(bytes).ok_or_else(|| HostError::Io {
            path: path.to_path_buf(),
            message: "no readable text".to_string(),
        })
    }

    async fn write_text_file(&self, path: &Path, text: &str, encoding: SrtEncoding) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(HostError::Io {
                path: path.to_path_buf(),
                message: "write refused".to_string(),
            });
        }
        state.files.insert(path.to_path_buf(), encoding.encode(text));
        Ok(())
    }

    async fn insertion_bin(&self) -> Result<Option<BinId>, HostError> {
        Ok(self.state.lock().bin.clone())
    }

    async fn bin_item_count(&self, _bin: &BinId) -> Result<usize, HostError> {
        Ok(self.state.lock().bin_items.len())
    }

    async fn import_file(&self, path: &Path, _bin: &BinId) -> Result<bool, HostError> {
        let mut state = self.state.lock();
        let bytes = state.files.get(path).cloned().unwrap_or_default();

        let bom = UTF8_BOM.to_string();
        let accepted = !bytes.is_empty()
            && match state.import_policy {
                ImportPolicy::AcceptAll => true,
                ImportPolicy::RequireBom => bytes.starts_with(bom.as_bytes()),
                ImportPolicy::RejectAll => false,
            };

        if accepted {
            let n = state.bin_items.len();
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            state.bin_items.push(AssetRef {
                id: format!("import-{}", n),
                name,
                media_path: Some(path.to_path_buf()),
            });
        }

        state.imports.push(ImportRecord {
            path: path.to_path_buf(),
            bytes,
            accepted,
        });

        // Mirrors hosts that report success regardless of outcome
        Ok(true)
    }

    async fn bin_item(&self, _bin: &BinId, index: usize) -> Result<Option<AssetRef>, HostError> {
        let state = self.state.lock();
        let item = state.bin_items.get(index).cloned();
        if state.hide_imported_assets {
            return Ok(item.filter(|asset| !asset.id.starts_with("import-")));
        }
        Ok(item)
    }

    async fn create_caption_track(&self, asset: &AssetRef, start_at_seconds: f64) -> Result<bool, HostError> {
        let mut state = self.state.lock();
        state.caption_tracks.push((asset.clone(), start_at_seconds));
        Ok(state.caption_track_result)
    }

    fn notify(&self, message: &str) {
        self.state.lock().notifications.push(message.to_string());
    }
}
