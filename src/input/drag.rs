//! Pointer move handling - drag, resize and rubber band updates.

use crate::app::InteractionController;
use crate::board::handle_scale;
use crate::input::InputState;
use crate::input::coords::CoordinateConverter;
use crate::profile_scope;
use crate::types::Point;
use tracing::warn;

impl InteractionController {
    /// Pointer moved to `screen`. Returns true if a redraw is needed.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        profile_scope!("pointer_move");
        if !screen.is_finite() {
            return false;
        }
        self.canvas.last_pointer = Some(screen);
        let viewport = *self.canvas.document.viewport();
        let canvas_pos = CoordinateConverter::screen_to_canvas(screen, &viewport);

        match self.canvas.input_state.clone() {
            InputState::Dragging { item, grab_offset } => {
                let doc = &mut self.canvas.document;
                let Some(current) = doc.item(item).map(|i| i.position()) else {
                    // Removed mid-gesture
                    self.canvas.input_state.reset();
                    return false;
                };
                let delta = canvas_pos - grab_offset - current;
                if delta == Point::ZERO {
                    return false;
                }
                // The whole selection follows the grabbed item
                let mut ids = doc.selected_ids();
                if !ids.contains(&item) {
                    ids = vec![item];
                }
                match doc.move_items(&ids, delta.x, delta.y) {
                    Ok(()) => {
                        self.canvas.gesture_changed = true;
                        true
                    }
                    Err(e) => {
                        warn!(item = %item, error = %e, "Drag rejected");
                        false
                    }
                }
            }
            InputState::Resizing {
                item,
                anchor,
                anchor_point,
                handle_start,
                start_scale,
            } => {
                let scale = handle_scale(start_scale, anchor_point, handle_start, canvas_pos);
                match self.canvas.document.resize_item_about(item, anchor, scale) {
                    Ok(()) => {
                        self.canvas.gesture_changed = true;
                        true
                    }
                    Err(e) => {
                        warn!(item = %item, error = %e, "Resize rejected");
                        self.canvas.input_state.reset();
                        false
                    }
                }
            }
            InputState::RubberBandSelecting { .. } => {
                self.canvas.input_state.set_rubber_band_current(canvas_pos);
                true
            }
            InputState::Idle | InputState::Pasting { .. } => false,
        }
    }
}
