//! Pointer down handling - selection, drag/resize/rubber band initiation.
//!
//! ## Performance Notes
//!
//! Pointer down is a hot path during interaction. Hit testing goes through
//! the R-tree scene index, so the cost is O(log n) in the item count.
//!
//! Enable profiling with `cargo build --features profiling` to see timing.

use crate::app::InteractionController;
use crate::constants::RESIZE_CORNER_SIZE;
use crate::input::coords::CoordinateConverter;
use crate::profile_scope;
use crate::types::{Corner, ItemId, Modifiers, Point};
use tracing::debug;

impl InteractionController {
    /// Pointer pressed at `screen`. Returns true if a redraw is needed.
    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) -> bool {
        profile_scope!("pointer_down");
        if !screen.is_finite() {
            return false;
        }
        self.canvas.last_pointer = Some(screen);
        if self.canvas.input_state.is_gesture() {
            return false;
        }

        let viewport = *self.canvas.document.viewport();
        let canvas_pos = CoordinateConverter::screen_to_canvas(screen, &viewport);
        let snapshot = self.canvas.document.snapshot();
        self.canvas.gesture_changed = false;

        // Handles of selected items take priority over the items beneath them
        if let Some((id, corner)) = self.handle_at(screen) {
            if let Some(item) = self.canvas.document.item(id) {
                let anchor = corner.opposite();
                let anchor_point = item.corner_position(anchor);
                let handle_start = item.corner_position(corner);
                let start_scale = item.scale();
                self.canvas.input_state.start_resizing(id, anchor, anchor_point, handle_start, start_scale);
                self.canvas.gesture_snapshot = Some(snapshot);
                debug!(item = %id, ?corner, "Resize started");
                return true;
            }
        }

        let doc = &mut self.canvas.document;
        match doc.topmost_at(canvas_pos) {
            Some(id) => {
                let was_selected = doc.item(id).is_some_and(|item| item.is_selected());
                if modifiers.shift {
                    if doc.select(id, true).is_err() {
                        return false;
                    }
                    // Shift-click on a selected item only deselects it
                    if !doc.item(id).is_some_and(|item| item.is_selected()) {
                        return true;
                    }
                } else if !was_selected && doc.select(id, false).is_err() {
                    return false;
                }
                let Some(origin) = doc.item(id).map(|item| item.position()) else {
                    return false;
                };
                self.canvas.input_state.start_dragging(id, canvas_pos - origin);
                debug!(item = %id, "Drag started");
            }
            None => {
                if !modifiers.shift {
                    doc.clear_selection();
                }
                self.canvas.input_state.start_rubber_band(canvas_pos, modifiers.shift);
                debug!("Rubber band started");
            }
        }
        self.canvas.gesture_snapshot = Some(snapshot);
        true
    }

    /// Corner handle under `screen`, searching selected items topmost first.
    ///
    /// Handles are hit in screen space so they stay grabbable at any zoom.
    pub fn handle_at(&self, screen: Point) -> Option<(ItemId, Corner)> {
        let doc = &self.canvas.document;
        let viewport = doc.viewport();
        doc.items()
            .iter()
            .rev()
            .filter(|item| item.is_selected())
            .find_map(|item| {
                Corner::ALL.into_iter().find_map(|corner| {
                    let handle = CoordinateConverter::canvas_to_screen(item.corner_position(corner), viewport);
                    (handle.distance(screen) <= RESIZE_CORNER_SIZE).then_some((item.id(), corner))
                })
            })
    }
}
