//! Image assets and the payloads they are created from.
//!
//! An [`ImageAsset`] is the decoded raster behind one or more board items.
//! It is immutable once created and shared through [`SharedAsset`]; the
//! last item to drop its reference frees the pixels.

use crate::codec::{ImageCodec, format_hint_for_path, is_supported_path};
use crate::error::{DecodeError, ImportError};
use crate::types::{AssetId, AssetOrigin};
use image::RgbaImage;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

fn next_asset_id() -> AssetId {
    AssetId(NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed))
}

/// Shared handle to an asset. Items hold one each.
pub type SharedAsset = Arc<ImageAsset>;

/// SHA-256 of the encoded bytes an asset was decoded from.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short hex prefix for log lines
    pub fn short(&self) -> String {
        self.0[..6].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short())
    }
}

/// A decoded raster and where it came from.
pub struct ImageAsset {
    id: AssetId,
    pixels: RgbaImage,
    width: u32,
    height: u32,
    source_path: Option<PathBuf>,
    origin: AssetOrigin,
    content_hash: Option<ContentHash>,
    missing: bool,
}

impl ImageAsset {
    pub fn new(
        pixels: RgbaImage,
        source_path: Option<PathBuf>,
        origin: AssetOrigin,
        content_hash: Option<ContentHash>,
    ) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            id: next_asset_id(),
            pixels,
            width,
            height,
            source_path,
            origin,
            content_hash,
            missing: false,
        }
    }

    /// Stand-in for an asset whose source could not be found at load time.
    ///
    /// Keeps the recorded dimensions so the item stays hit-testable, but
    /// carries no pixels.
    pub fn placeholder(width: u32, height: u32, source_path: Option<PathBuf>) -> Self {
        Self {
            id: next_asset_id(),
            pixels: RgbaImage::new(0, 0),
            width,
            height,
            source_path,
            origin: AssetOrigin::File,
            content_hash: None,
            missing: true,
        }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn origin(&self) -> AssetOrigin {
        self.origin
    }

    pub fn content_hash(&self) -> Option<ContentHash> {
        self.content_hash
    }

    /// True for load-time placeholders that have no raster.
    pub fn is_missing(&self) -> bool {
        self.missing
    }

    /// Human-readable label: the file name, or "pasted image".
    pub fn display_name(&self) -> String {
        match &self.source_path {
            Some(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("Unknown")
                .to_string(),
            None => "pasted image".to_string(),
        }
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("source_path", &self.source_path)
            .field("origin", &self.origin)
            .field("missing", &self.is_missing())
            .finish()
    }
}

// ============================================================================
// Dedup cache
// ============================================================================

/// Content-hash keyed cache of live assets.
///
/// Holds only weak references: an asset is freed as soon as the last item
/// referring to it is gone, whether or not it is still listed here.
#[derive(Default)]
pub struct AssetStore {
    by_hash: HashMap<ContentHash, Weak<ImageAsset>>,
    enabled: bool,
}

impl AssetStore {
    pub fn new(enabled: bool) -> Self {
        Self {
            by_hash: HashMap::new(),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A live asset decoded from identical bytes, if dedup is on.
    pub fn lookup(&self, hash: &ContentHash) -> Option<SharedAsset> {
        if !self.enabled {
            return None;
        }
        self.by_hash.get(hash).and_then(Weak::upgrade)
    }

    /// Share `asset`, registering it for dedup when it has a content hash.
    pub fn insert(&mut self, asset: ImageAsset) -> SharedAsset {
        let shared = Arc::new(asset);
        if self.enabled {
            if let Some(hash) = shared.content_hash() {
                self.by_hash.insert(hash, Arc::downgrade(&shared));
            }
        }
        shared
    }

    /// Drop entries whose asset has already been freed.
    pub fn purge(&mut self) {
        self.by_hash.retain(|_, weak| weak.strong_count() > 0);
    }

    /// Number of cached assets still referenced by some item.
    pub fn live_count(&self) -> usize {
        self.by_hash
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn clear(&mut self) {
        self.by_hash.clear();
    }
}

// ============================================================================
// Drop / paste payloads
// ============================================================================

/// Normalized drag-drop or clipboard payload.
///
/// Host transports convert their untyped data into one of these before it
/// reaches the engine.
#[derive(Clone, Debug)]
pub enum DropPayload {
    /// A local file path
    File(PathBuf),
    /// Encoded image bytes without a file behind them
    Bytes {
        bytes: Vec<u8>,
        mime_hint: Option<String>,
    },
}

impl DropPayload {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DropPayload::File(path.into())
    }

    pub fn bytes(bytes: Vec<u8>, mime_hint: Option<&str>) -> Self {
        DropPayload::Bytes {
            bytes,
            mime_hint: mime_hint.map(str::to_string),
        }
    }

    /// Label used in failure reports.
    pub fn label(&self) -> String {
        match self {
            DropPayload::File(path) => path.display().to_string(),
            DropPayload::Bytes { mime_hint, .. } => match mime_hint {
                Some(mime) => format!("pasted {}", mime),
                None => "pasted image".to_string(),
            },
        }
    }

    /// Fetch the encoded bytes. Reads the file for `File` payloads.
    ///
    /// File paths with an unknown extension are rejected before any IO.
    pub fn read(self) -> Result<RawPayload, ImportError> {
        match self {
            DropPayload::File(path) => {
                if !is_supported_path(&path) {
                    let ext = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("(none)")
                        .to_string();
                    return Err(DecodeError::UnsupportedFormat(ext).into());
                }
                let bytes = std::fs::read(&path).map_err(|source| ImportError::Read {
                    path: path.clone(),
                    source,
                })?;
                Ok(RawPayload {
                    hint: format_hint_for_path(&path),
                    bytes,
                    source_path: Some(path),
                    origin: AssetOrigin::File,
                })
            }
            DropPayload::Bytes { bytes, mime_hint } => Ok(RawPayload {
                bytes,
                hint: mime_hint,
                source_path: None,
                origin: AssetOrigin::Clipboard,
            }),
        }
    }
}

/// Encoded bytes plus the provenance they will carry once decoded.
pub struct RawPayload {
    pub bytes: Vec<u8>,
    pub hint: Option<String>,
    pub source_path: Option<PathBuf>,
    pub origin: AssetOrigin,
}

impl RawPayload {
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of(&self.bytes)
    }

    pub fn decode(&self, codec: &dyn ImageCodec) -> Result<RgbaImage, DecodeError> {
        codec.decode(&self.bytes, self.hint.as_deref())
    }
}

/// Output of a decode: raster plus provenance, not yet shared.
pub struct DecodedImage {
    pub pixels: RgbaImage,
    pub hash: ContentHash,
    pub source_path: Option<PathBuf>,
    pub origin: AssetOrigin,
}

impl DecodedImage {
    /// Read and decode a payload. Safe to call off the interaction thread.
    pub fn from_payload(payload: DropPayload, codec: &dyn ImageCodec) -> Result<Self, ImportError> {
        let raw = payload.read()?;
        let pixels = raw.decode(codec)?;
        Ok(Self {
            hash: raw.content_hash(),
            pixels,
            source_path: raw.source_path,
            origin: raw.origin,
        })
    }

    pub fn into_asset(self) -> ImageAsset {
        ImageAsset::new(self.pixels, self.source_path, self.origin, Some(self.hash))
    }
}
