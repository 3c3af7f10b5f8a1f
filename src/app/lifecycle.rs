//! Controller lifecycle - construction and host panel hooks.
//!
//! A host may show, hide and close its panel any number of times. Closing
//! releases every asset the controller holds; showing again starts from an
//! empty board with a fresh decode queue.

use super::InteractionController;
use crate::app::state::{CanvasState, ImportState, SessionState};
use crate::asset::AssetStore;
use crate::board::BoardDocument;
use crate::board_file::BoardSerializer;
use crate::codec::{ImageCodec, ImageCrateCodec};
use crate::decode_queue::DecodeQueue;
use crate::input::InputState;
use crate::perf::PerfStats;
use crate::settings::BoardSettings;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Surface size assumed until the host reports one.
const DEFAULT_SURFACE_SIZE: (f32, f32) = (1280.0, 800.0);

impl InteractionController {
    pub fn new(settings: BoardSettings) -> Self {
        Self::with_codec(settings, Arc::new(ImageCrateCodec))
    }

    /// Build a controller decoding through `codec`.
    pub fn with_codec(settings: BoardSettings, codec: Arc<dyn ImageCodec>) -> Self {
        let settings = settings.sanitized();
        let mut document = BoardDocument::default();
        document.set_selection_mode(settings.selection_mode);

        Self {
            canvas: CanvasState {
                document,
                input_state: InputState::default(),
                surface_size: DEFAULT_SURFACE_SIZE,
                last_pointer: None,
                gesture_snapshot: None,
                gesture_changed: false,
            },
            imports: ImportState {
                assets: AssetStore::new(settings.dedup_assets),
                queue: Some(DecodeQueue::new(settings.decode_workers, Arc::clone(&codec))),
                pending: HashMap::new(),
                generation: 0,
            },
            session: SessionState {
                serializer: BoardSerializer::new(Arc::clone(&codec)),
                codec,
                settings,
                board_path: None,
                visible: true,
                dirty: false,
            },
            perf: PerfStats::new(),
        }
    }

    /// Panel became visible.
    pub fn on_show(&mut self) {
        self.ensure_queue();
        self.session.visible = true;
        debug!("Board shown");
    }

    /// Panel hidden but kept alive. Any gesture in progress is committed as is.
    pub fn on_hide(&mut self) {
        self.canvas.input_state.reset();
        self.canvas.gesture_snapshot = None;
        self.canvas.last_pointer = None;
        self.session.visible = false;
        debug!("Board hidden");
    }

    /// Panel torn down: cancel decodes, stop workers, release every asset.
    pub fn on_close(&mut self) {
        self.cancel_pending_imports();
        // Joins the worker threads.
        self.imports.queue = None;

        let released = self.canvas.document.clear().len();
        self.canvas.document = BoardDocument::default();
        self.canvas.document.set_selection_mode(self.session.settings.selection_mode);
        self.canvas.input_state.reset();
        self.canvas.gesture_snapshot = None;
        self.canvas.last_pointer = None;
        self.imports.assets.clear();
        self.imports.generation += 1;

        self.session.board_path = None;
        self.session.visible = false;
        self.session.dirty = false;
        info!(items = released, "Board closed");
    }

    pub(crate) fn ensure_queue(&mut self) -> &mut DecodeQueue {
        let workers = self.session.settings.decode_workers;
        let codec = &self.session.codec;
        self.imports
            .queue
            .get_or_insert_with(|| DecodeQueue::new(workers, Arc::clone(codec)))
    }

    /// Replace the document and invalidate everything tied to the old one.
    pub(crate) fn install_document(&mut self, mut document: BoardDocument) {
        self.cancel_pending_imports();
        document.set_selection_mode(self.session.settings.selection_mode);
        self.canvas.document = document;
        self.canvas.input_state.reset();
        self.canvas.gesture_snapshot = None;
        self.imports.generation += 1;
        self.imports.assets.purge();
    }
}
