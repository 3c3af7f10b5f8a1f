//! Controller state - the InteractionController struct and its sub-structs.

use crate::asset::AssetStore;
use crate::board::{BoardDocument, PlacementSnapshot};
use crate::board_file::BoardSerializer;
use crate::codec::ImageCodec;
use crate::decode_queue::{DecodeQueue, DecodeTicket};
use crate::input::InputState;
use crate::perf::PerfStats;
use crate::settings::BoardSettings;
use crate::types::Point;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// Sub-structs
// =============================================================================

/// Canvas interaction state - the document and the gesture acting on it
pub struct CanvasState {
    /// The board; always present, replaced wholesale on load
    pub document: BoardDocument,
    /// Input state machine
    pub input_state: InputState,
    /// Render surface size in screen pixels
    pub surface_size: (f32, f32),
    /// Last pointer position seen, in screen coordinates
    pub last_pointer: Option<Point>,
    /// Placement captured at gesture start, restored on cancel
    pub gesture_snapshot: Option<PlacementSnapshot>,
    /// The current gesture has moved or resized something
    pub gesture_changed: bool,
}

/// A submitted decode waiting to become an item
#[derive(Clone, Copy, Debug)]
pub struct PendingImport {
    /// Document generation the import was started against
    pub generation: u64,
    /// Canvas position of the first item of the batch
    pub anchor: Point,
    /// Position within the batch, for cascading
    pub index: usize,
    /// Centre the image on the anchor instead of placing its corner there
    pub centered: bool,
}

/// Import pipeline state - decode queue and dedup cache
pub struct ImportState {
    pub assets: AssetStore,
    /// Created on show, dropped on close
    pub queue: Option<DecodeQueue>,
    pub pending: HashMap<DecodeTicket, PendingImport>,
    /// Bumped whenever the document is replaced or torn down
    pub generation: u64,
}

/// Session state - settings, persistence and visibility
pub struct SessionState {
    pub settings: BoardSettings,
    pub codec: Arc<dyn ImageCodec>,
    pub serializer: BoardSerializer,
    /// File the board was last loaded from or saved to
    pub board_path: Option<PathBuf>,
    pub visible: bool,
    /// Unsaved changes
    pub dirty: bool,
}

// =============================================================================
// InteractionController
// =============================================================================

/// The single owner of a board: translates input into document mutations.
///
/// Everything runs on the caller's thread. Decoding may happen on worker
/// threads but completions are only applied from [`process_decodes`], so the
/// document has exactly one writer.
///
/// [`process_decodes`]: InteractionController::process_decodes
pub struct InteractionController {
    pub(crate) canvas: CanvasState,
    pub(crate) imports: ImportState,
    pub(crate) session: SessionState,
    pub(crate) perf: PerfStats,
}

impl InteractionController {
    pub fn document(&self) -> &BoardDocument {
        &self.canvas.document
    }

    pub fn input_state(&self) -> &InputState {
        &self.canvas.input_state
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.session.settings
    }

    pub fn board_path(&self) -> Option<&Path> {
        self.session.board_path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.session.dirty
    }

    pub fn is_visible(&self) -> bool {
        self.session.visible
    }

    /// Decodes submitted but not yet applied.
    pub fn pending_imports(&self) -> usize {
        self.imports.pending.len()
    }

    pub fn asset_store(&self) -> &AssetStore {
        &self.imports.assets
    }

    pub fn perf_stats(&self) -> &PerfStats {
        &self.perf
    }

    pub fn surface_size(&self) -> (f32, f32) {
        self.canvas.surface_size
    }

    pub fn set_surface_size(&mut self, width: f32, height: f32) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.canvas.surface_size = (width, height);
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.session.dirty = true;
    }
}
