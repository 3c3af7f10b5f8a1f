//! Pointer up handling - commit the gesture, finish rubber band selection.

use crate::app::InteractionController;
use crate::constants::MIN_MARQUEE_SIZE;
use crate::input::InputState;
use crate::input::coords::CoordinateConverter;
use crate::profile_scope;
use crate::types::{Point, Rect};
use tracing::debug;

impl InteractionController {
    /// Pointer released at `screen`. Returns true if a redraw is needed.
    ///
    /// Moves and resizes are already applied while the pointer moves, so
    /// releasing only ends the gesture.
    pub fn pointer_up(&mut self, screen: Point) -> bool {
        profile_scope!("pointer_up");
        if !self.canvas.input_state.is_gesture() {
            return false;
        }
        self.pointer_move(screen);

        let state = std::mem::take(&mut self.canvas.input_state);
        self.canvas.gesture_snapshot = None;
        match state {
            InputState::Dragging { item, .. } | InputState::Resizing { item, .. } => {
                if self.canvas.gesture_changed {
                    self.mark_dirty();
                }
                debug!(item = %item, changed = self.canvas.gesture_changed, "Gesture committed");
            }
            InputState::RubberBandSelecting { start, current, .. } => {
                let band = Rect::from_corners(start, current);
                let on_screen = CoordinateConverter::rect_to_screen(&band, self.canvas.document.viewport());
                // A click without movement only clears the selection
                if on_screen.width() >= MIN_MARQUEE_SIZE || on_screen.height() >= MIN_MARQUEE_SIZE {
                    let hits = self.canvas.document.hit_test_rect(&band);
                    self.canvas.document.select_many(&hits, true);
                    debug!(hits = hits.len(), "Rubber band selection");
                }
            }
            InputState::Idle | InputState::Pasting { .. } => {}
        }
        self.canvas.gesture_changed = false;
        true
    }
}
