//! Board persistence.
//!
//! Boards are stored as versioned JSON:
//!
//! ```text
//! {
//!   "format": "refboard",
//!   "version": 1,
//!   "id": "<uuid>",
//!   "name": "Moodboard",
//!   "viewport": { "pan_x": 0.0, "pan_y": 0.0, "zoom": 1.0 },
//!   "policy": "embedded" | "referenced",
//!   "assets": [
//!     { "width": 640, "height": 480, "origin": "file",
//!       "relative": "refs/a.png", "absolute": "/home/me/refs/a.png",
//!       "data": "<base64 png>" }
//!   ],
//!   "items": [
//!     { "asset": 0, "x": 10.0, "y": 20.0, "scale": 1.0, "rotation": 0.0, "z_order": 0 }
//!   ]
//! }
//! ```
//!
//! Each distinct asset is written once and items refer to it by index, so
//! shared assets stay shared after a round trip. An asset record carries
//! `data` when embedded; otherwise it must carry at least one path. Paths
//! are tried relative to the board file first, then absolute.

use crate::asset::{AssetStore, ContentHash, ImageAsset, SharedAsset};
use crate::board::BoardDocument;
use crate::codec::{ImageCodec, format_hint_for_path};
use crate::constants::{BOARD_FORMAT_TAG, BOARD_FORMAT_VERSION, CONSOLIDATED_DIR_SUFFIX, SLOW_BOARD_IO_MS};
use crate::error::{LoadError, WriteError};
use crate::perf::measure_and_log;
use crate::profile_scope;
use crate::types::{AssetId, AssetOrigin, ItemId, Point, Viewport};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ============================================================================
// Schema
// ============================================================================

/// How asset pixels are persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetPolicy {
    /// PNG copy inside the board file; loads without external files
    #[default]
    Embedded,
    /// Path to the source file, re-decoded at load time
    Referenced,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BoardFile {
    pub format: String,
    pub version: u32,
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub policy: AssetPolicy,
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub origin: AssetOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute: Option<String>,
    /// Base64 PNG
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub asset: usize,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    #[serde(default)]
    pub rotation: f32,
    pub z_order: i64,
}

#[derive(Deserialize)]
struct VersionProbe {
    format: Option<String>,
    version: u32,
}

// ============================================================================
// Options and reports
// ============================================================================

#[derive(Clone, Copy, Debug, Default)]
pub struct SaveOptions {
    pub policy: AssetPolicy,
    /// Copy every source file into `<stem>_images/` and reference the copies.
    /// Implies `AssetPolicy::Referenced`.
    pub consolidate: bool,
}

impl SaveOptions {
    pub fn embedded() -> Self {
        Self {
            policy: AssetPolicy::Embedded,
            consolidate: false,
        }
    }

    pub fn referenced() -> Self {
        Self {
            policy: AssetPolicy::Referenced,
            consolidate: false,
        }
    }

    pub fn consolidated() -> Self {
        Self {
            policy: AssetPolicy::Referenced,
            consolidate: true,
        }
    }

    fn effective_policy(&self) -> AssetPolicy {
        if self.consolidate {
            AssetPolicy::Referenced
        } else {
            self.policy
        }
    }
}

#[derive(Debug, Clone)]
pub struct SaveReport {
    pub path: PathBuf,
    pub items: usize,
    pub assets: usize,
    /// Image files copied or written beside the board
    pub files_written: usize,
}

/// An asset whose source could not be decoded at load time.
///
/// The affected items are on the board with a placeholder asset.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingAsset {
    pub path: PathBuf,
    pub reason: String,
    pub items: Vec<ItemId>,
}

pub struct LoadedBoard {
    pub document: BoardDocument,
    pub missing: Vec<MissingAsset>,
}

// ============================================================================
// Serializer
// ============================================================================

/// Converts documents to and from board files.
#[derive(Clone)]
pub struct BoardSerializer {
    codec: Arc<dyn ImageCodec>,
}

impl BoardSerializer {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self { codec }
    }

    /// Serialize without touching the filesystem.
    ///
    /// Referenced assets are written with absolute paths only. Pasted images
    /// have no file to point at, so they fail with `MissingSourcePath` under the
    /// referenced policy; use [`save_to_path`](Self::save_to_path) for those.
    pub fn to_bytes(&self, doc: &BoardDocument, options: &SaveOptions) -> Result<Vec<u8>, WriteError> {
        let file = self.build_file(doc, options.effective_policy(), None, None)?;
        Ok(serde_json::to_vec_pretty(&file)?)
    }

    /// Write `doc` to `path` atomically. On error the previous file is untouched.
    pub fn save_to_path(
        &self,
        doc: &BoardDocument,
        path: &Path,
        options: &SaveOptions,
    ) -> Result<SaveReport, WriteError> {
        profile_scope!("board_save");
        measure_and_log("board_save", SLOW_BOARD_IO_MS, || self.save_inner(doc, path, options))
    }

    fn save_inner(
        &self,
        doc: &BoardDocument,
        path: &Path,
        options: &SaveOptions,
    ) -> Result<SaveReport, WriteError> {
        let path = std::path::absolute(path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut sink = ImageSink::new(images_dir_for(&path), options.consolidate);

        let file = self.build_file(doc, options.effective_policy(), Some(&base_dir), Some(&mut sink))?;
        let bytes = serde_json::to_vec_pretty(&file)?;
        write_atomic(&path, &bytes)?;

        let report = SaveReport {
            path,
            items: file.items.len(),
            assets: file.assets.len(),
            files_written: sink.files_written,
        };
        info!(
            path = %report.path.display(),
            items = report.items,
            assets = report.assets,
            files_written = report.files_written,
            policy = ?file.policy,
            "Saved board"
        );
        Ok(report)
    }

    fn build_file(
        &self,
        doc: &BoardDocument,
        policy: AssetPolicy,
        base_dir: Option<&Path>,
        mut sink: Option<&mut ImageSink>,
    ) -> Result<BoardFile, WriteError> {
        let mut index_of: HashMap<AssetId, usize> = HashMap::new();
        let mut assets = Vec::new();
        let mut items = Vec::with_capacity(doc.len());

        for item in doc.items() {
            let asset = item.asset();
            let index = match index_of.get(&asset.id()) {
                Some(&index) => index,
                None => {
                    let record = self.asset_record(asset, item.id(), policy, base_dir, sink.as_deref_mut())?;
                    assets.push(record);
                    index_of.insert(asset.id(), assets.len() - 1);
                    assets.len() - 1
                }
            };
            let position = item.position();
            items.push(ItemRecord {
                asset: index,
                x: position.x,
                y: position.y,
                scale: item.scale(),
                rotation: item.rotation(),
                z_order: item.z_order() as i64,
            });
        }

        Ok(BoardFile {
            format: BOARD_FORMAT_TAG.to_string(),
            version: BOARD_FORMAT_VERSION,
            id: doc.id(),
            name: doc.name().to_string(),
            viewport: *doc.viewport(),
            policy,
            assets,
            items,
        })
    }

    fn asset_record(
        &self,
        asset: &SharedAsset,
        item: ItemId,
        policy: AssetPolicy,
        base_dir: Option<&Path>,
        sink: Option<&mut ImageSink>,
    ) -> Result<AssetRecord, WriteError> {
        let mut record = AssetRecord {
            width: asset.width(),
            height: asset.height(),
            origin: asset.origin(),
            relative: None,
            absolute: None,
            data: None,
        };

        // Placeholders keep their original reference whatever the policy.
        let target = if asset.is_missing() {
            Some(asset.source_path().ok_or(WriteError::MissingSourcePath(item))?.to_path_buf())
        } else if policy == AssetPolicy::Embedded {
            let png = self.codec.encode_png(asset.pixels())?;
            record.data = Some(STANDARD.encode(png));
            asset.source_path().map(Path::to_path_buf)
        } else {
            Some(match (asset.source_path(), sink) {
                (Some(src), Some(sink)) if sink.consolidate => sink.copy_source(src)?,
                (Some(src), _) => src.to_path_buf(),
                (None, Some(sink)) => sink.write_png(asset, self.codec.as_ref())?,
                (None, None) => return Err(WriteError::MissingSourcePath(item)),
            })
        };

        if let Some(target) = target {
            let absolute = std::path::absolute(&target).unwrap_or(target);
            record.relative = base_dir
                .and_then(|base| relative_path(&absolute, base))
                .map(|p| path_to_string(&p));
            record.absolute = Some(path_to_string(&absolute));
        }
        Ok(record)
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Read a board file. Relative asset paths resolve against the file's directory.
    pub fn load_from_path(&self, path: &Path, store: &mut AssetStore) -> Result<LoadedBoard, LoadError> {
        profile_scope!("board_load");
        measure_and_log("board_load", SLOW_BOARD_IO_MS, || -> Result<LoadedBoard, LoadError> {
            let path = std::path::absolute(path)?;
            let bytes = fs::read(&path)?;
            let loaded = self.from_bytes(&bytes, path.parent(), store)?;
            info!(
                path = %path.display(),
                items = loaded.document.len(),
                missing = loaded.missing.len(),
                "Loaded board"
            );
            Ok(loaded)
        })
    }

    /// Parse a board. Fails as a whole on format problems; missing external
    /// assets are reported per item instead.
    pub fn from_bytes(
        &self,
        bytes: &[u8],
        base_dir: Option<&Path>,
        store: &mut AssetStore,
    ) -> Result<LoadedBoard, LoadError> {
        let probe: VersionProbe = serde_json::from_slice(bytes)?;
        if probe.format.as_deref() != Some(BOARD_FORMAT_TAG) {
            return Err(LoadError::Corrupt("not a board file".to_string()));
        }
        if probe.version > BOARD_FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: probe.version,
                supported: BOARD_FORMAT_VERSION,
            });
        }
        if probe.version == 0 {
            return Err(LoadError::Corrupt("version 0".to_string()));
        }

        let file: BoardFile = serde_json::from_slice(bytes)?;
        if !file.viewport.is_valid() {
            return Err(LoadError::Corrupt("invalid viewport".to_string()));
        }

        let mut assets = Vec::with_capacity(file.assets.len());
        let mut missing: Vec<MissingAsset> = Vec::new();
        let mut missing_slot: HashMap<usize, usize> = HashMap::new();
        for (index, record) in file.assets.iter().enumerate() {
            match self.load_asset(record, base_dir, store)? {
                AssetLoad::Ready(asset) => assets.push(asset),
                AssetLoad::Missing(placeholder, report) => {
                    warn!(path = %report.path.display(), reason = %report.reason, "Missing asset");
                    missing_slot.insert(index, missing.len());
                    missing.push(report);
                    assets.push(placeholder);
                }
            }
        }

        let mut document = BoardDocument::new(file.name);
        document.set_id(file.id);
        document.set_viewport(file.viewport);

        let mut records = file.items;
        records.sort_by_key(|r| r.z_order);
        for record in records {
            let asset = assets
                .get(record.asset)
                .ok_or_else(|| LoadError::Corrupt(format!("item refers to unknown asset {}", record.asset)))?;
            let corrupt = |e: crate::error::BoardError| LoadError::Corrupt(e.to_string());
            let id = document
                .add_item(Arc::clone(asset), Point::new(record.x, record.y))
                .map_err(corrupt)?;
            document.resize_item(id, record.scale).map_err(corrupt)?;
            document.rotate_item(id, record.rotation).map_err(corrupt)?;
            if let Some(&slot) = missing_slot.get(&record.asset) {
                missing[slot].items.push(id);
            }
        }

        debug!(items = document.len(), assets = assets.len(), "Parsed board");
        Ok(LoadedBoard { document, missing })
    }

    fn load_asset(
        &self,
        record: &AssetRecord,
        base_dir: Option<&Path>,
        store: &mut AssetStore,
    ) -> Result<AssetLoad, LoadError> {
        let recorded_path = record.absolute.as_ref().map(PathBuf::from).or_else(|| {
            record
                .relative
                .as_ref()
                .map(|rel| base_dir.map(|b| b.join(rel)).unwrap_or_else(|| PathBuf::from(rel)))
        });

        if let Some(data) = &record.data {
            let bytes = STANDARD
                .decode(data)
                .map_err(|e| LoadError::Corrupt(format!("embedded image: {}", e)))?;
            let asset = self
                .decode_shared(&bytes, Some("png"), recorded_path, record.origin, store)
                .map_err(|e| LoadError::Corrupt(format!("embedded image: {}", e)))?;
            return Ok(AssetLoad::Ready(asset));
        }

        let mut candidates = Vec::new();
        if let (Some(rel), Some(base)) = (&record.relative, base_dir) {
            candidates.push(base.join(rel));
        }
        if let Some(abs) = &record.absolute {
            candidates.push(PathBuf::from(abs));
        }
        let Some(primary) = recorded_path else {
            return Err(LoadError::Corrupt("asset has neither data nor path".to_string()));
        };
        if candidates.is_empty() {
            candidates.push(primary.clone());
        }

        let mut reason = "file not found".to_string();
        for candidate in candidates {
            let bytes = match fs::read(&candidate) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    reason = e.to_string();
                    continue;
                }
            };
            let hint = format_hint_for_path(&candidate);
            match self.decode_shared(&bytes, hint.as_deref(), Some(candidate.clone()), record.origin, store) {
                Ok(asset) => return Ok(AssetLoad::Ready(asset)),
                Err(e) => reason = e.to_string(),
            }
        }

        let placeholder = Arc::new(ImageAsset::placeholder(record.width, record.height, Some(primary.clone())));
        Ok(AssetLoad::Missing(
            placeholder,
            MissingAsset {
                path: primary,
                reason,
                items: Vec::new(),
            },
        ))
    }

    fn decode_shared(
        &self,
        bytes: &[u8],
        hint: Option<&str>,
        source_path: Option<PathBuf>,
        origin: AssetOrigin,
        store: &mut AssetStore,
    ) -> Result<SharedAsset, crate::error::DecodeError> {
        let hash = ContentHash::of(bytes);
        if let Some(existing) = store.lookup(&hash) {
            // Same pixels from somewhere else must not take over this record's path.
            if existing.origin() == origin && existing.source_path() == source_path.as_deref() {
                return Ok(existing);
            }
        }
        let pixels = self.codec.decode(bytes, hint)?;
        Ok(store.insert(ImageAsset::new(pixels, source_path, origin, Some(hash))))
    }
}

enum AssetLoad {
    Ready(SharedAsset),
    Missing(SharedAsset, MissingAsset),
}

// ============================================================================
// Image files beside the board
// ============================================================================

/// `<dir>/<stem>_images` for a board saved at `<dir>/<stem>.json`.
pub fn images_dir_for(board_path: &Path) -> PathBuf {
    let stem = board_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("board");
    let dir = board_path.parent().unwrap_or(Path::new(""));
    dir.join(format!("{}{}", stem, CONSOLIDATED_DIR_SUFFIX))
}

struct ImageSink {
    dir: PathBuf,
    consolidate: bool,
    copied: HashMap<PathBuf, PathBuf>,
    taken: HashSet<PathBuf>,
    files_written: usize,
}

impl ImageSink {
    fn new(dir: PathBuf, consolidate: bool) -> Self {
        Self {
            dir,
            consolidate,
            copied: HashMap::new(),
            taken: HashSet::new(),
            files_written: 0,
        }
    }

    fn copy_source(&mut self, src: &Path) -> Result<PathBuf, WriteError> {
        let src = std::path::absolute(src)?;
        if let Some(dest) = self.copied.get(&src) {
            return Ok(dest.clone());
        }
        if src.parent() == Some(self.dir.as_path()) {
            self.taken.insert(src.clone());
            self.copied.insert(src.clone(), src.clone());
            return Ok(src);
        }

        let dest = self.unique_dest(&src);
        fs::create_dir_all(&self.dir)?;
        fs::copy(&src, &dest)?;
        self.files_written += 1;
        debug!(from = %src.display(), to = %dest.display(), "Consolidated image");
        self.copied.insert(src, dest.clone());
        Ok(dest)
    }

    fn unique_dest(&mut self, src: &Path) -> PathBuf {
        let stem = src.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
        let ext = src.extension().and_then(|s| s.to_str());
        let name = |suffix: String| match ext {
            Some(ext) => format!("{}{}.{}", stem, suffix, ext),
            None => format!("{}{}", stem, suffix),
        };
        let mut candidate = self.dir.join(name(String::new()));
        let mut n = 1;
        // Files already in the folder belong to earlier saves.
        while self.taken.contains(&candidate) || candidate.exists() {
            candidate = self.dir.join(name(format!("_{}", n)));
            n += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    fn write_png(&mut self, asset: &ImageAsset, codec: &dyn ImageCodec) -> Result<PathBuf, WriteError> {
        let name = match asset.content_hash() {
            Some(hash) => format!("pasted_{}.png", hash.short()),
            None => format!("pasted_{}.png", asset.id().0),
        };
        let dest = self.dir.join(name);
        if self.taken.insert(dest.clone()) {
            let png = codec.encode_png(asset.pixels())?;
            fs::create_dir_all(&self.dir)?;
            fs::write(&dest, png)?;
            self.files_written += 1;
            debug!(to = %dest.display(), "Wrote pasted image");
        }
        Ok(dest)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| WriteError::IoFailure(e.error))?;
    Ok(())
}

/// `path` expressed relative to the directory `base`, with `..` as needed.
/// `None` when the two share no root (e.g. different drives).
pub fn relative_path(path: &Path, base: &Path) -> Option<PathBuf> {
    if !path.is_absolute() || !base.is_absolute() {
        return None;
    }
    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return None;
    }

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &path_parts[common..] {
        rel.push(part.as_os_str());
    }
    Some(rel)
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
