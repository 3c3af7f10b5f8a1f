//! Keyboard and menu commands - delete, cancel, select all, z order, resize.

use crate::app::InteractionController;
use crate::error::{BoardError, BoardResult};
use tracing::debug;

impl InteractionController {
    /// Remove every selected item. Returns how many were removed.
    ///
    /// Assets no other item uses are released with them.
    pub fn delete_selected(&mut self) -> usize {
        if self.canvas.input_state.is_gesture() {
            self.canvas.input_state.reset();
            self.canvas.gesture_snapshot = None;
        }
        let removed = self.canvas.document.remove_selected();
        let count = removed.len();
        drop(removed);
        self.imports.assets.purge();
        if count > 0 {
            self.mark_dirty();
            debug!(count, "Deleted selection");
        }
        count
    }

    /// Abort the current gesture, or the paste being decoded.
    ///
    /// An aborted gesture puts placement and selection back as they were
    /// when it started. Returns false if there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        if let Some(ticket) = self.canvas.input_state.paste_ticket() {
            self.cancel_import(ticket);
            self.canvas.input_state.reset();
            debug!(?ticket, "Paste cancelled");
            return true;
        }
        if !self.canvas.input_state.is_gesture() {
            return false;
        }
        if let Some(snapshot) = self.canvas.gesture_snapshot.take() {
            self.canvas.document.restore(&snapshot);
        }
        self.canvas.input_state.reset();
        self.canvas.gesture_changed = false;
        debug!("Gesture cancelled");
        true
    }

    pub fn select_all(&mut self) {
        let ids: Vec<_> = self.canvas.document.items().iter().map(|item| item.id()).collect();
        self.canvas.document.select_many(&ids, false);
    }

    pub fn clear_selection(&mut self) {
        self.canvas.document.clear_selection();
    }

    /// Set every selected item to the absolute `scale`, for example one of
    /// [`RESIZE_PRESETS`](crate::constants::RESIZE_PRESETS).
    ///
    /// The scale is checked before anything changes. Returns how many items
    /// were resized.
    pub fn resize_selected(&mut self, scale: f32) -> BoardResult<usize> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(BoardError::InvalidScale(scale));
        }
        let ids = self.canvas.document.selected_ids();
        for &id in &ids {
            self.canvas.document.resize_item(id, scale)?;
        }
        if !ids.is_empty() {
            self.mark_dirty();
        }
        Ok(ids.len())
    }

    /// Set every selected item to the absolute rotation `degrees`.
    pub fn rotate_selected(&mut self, degrees: f32) -> BoardResult<usize> {
        if !degrees.is_finite() {
            return Err(BoardError::InvalidRotation(degrees));
        }
        let ids = self.canvas.document.selected_ids();
        for &id in &ids {
            self.canvas.document.rotate_item(id, degrees)?;
        }
        if !ids.is_empty() {
            self.mark_dirty();
        }
        Ok(ids.len())
    }

    pub fn bring_selection_to_front(&mut self) -> bool {
        if self.canvas.document.selection_count() == 0 {
            return false;
        }
        self.canvas.document.bring_selection_to_front();
        self.mark_dirty();
        true
    }

    pub fn send_selection_to_back(&mut self) -> bool {
        if self.canvas.document.selection_count() == 0 {
            return false;
        }
        self.canvas.document.send_selection_to_back();
        self.mark_dirty();
        true
    }

    /// Lay every item out in a grid and fit the result into view.
    pub fn arrange_grid(&mut self) -> bool {
        if self.canvas.document.is_empty() {
            return false;
        }
        self.canvas.document.arrange_grid();
        self.fit_all_to_view();
        self.mark_dirty();
        true
    }
}
