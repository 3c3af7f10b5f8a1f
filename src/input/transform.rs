//! Viewport transformations - wheel zoom and pan, fit to view.

use crate::app::InteractionController;
use crate::constants::{FIT_VIEW_PADDING, SCROLL_LINE_PIXELS};
use crate::input::coords::CoordinateConverter;
use crate::types::{Modifiers, Point, Viewport};
use tracing::debug;

/// Wheel movement as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollDelta {
    /// Notched wheel; one unit per line
    Lines { x: f32, y: f32 },
    /// Trackpad; screen pixels
    Pixels { x: f32, y: f32 },
}

impl ScrollDelta {
    /// Delta in screen pixels.
    pub fn pixels(self) -> Point {
        match self {
            ScrollDelta::Lines { x, y } => Point::new(x * SCROLL_LINE_PIXELS, y * SCROLL_LINE_PIXELS),
            ScrollDelta::Pixels { x, y } => Point::new(x, y),
        }
    }

    /// Vertical delta in wheel lines.
    pub fn lines_y(self) -> f32 {
        match self {
            ScrollDelta::Lines { y, .. } => y,
            ScrollDelta::Pixels { y, .. } => y / SCROLL_LINE_PIXELS,
        }
    }
}

impl InteractionController {
    /// Convert a surface position to canvas coordinates.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        CoordinateConverter::screen_to_canvas(screen, self.canvas.document.viewport())
    }

    /// Wheel over the surface. With control held it zooms around the
    /// cursor, positive `y` zooming in. Otherwise it pans.
    pub fn handle_wheel(&mut self, screen: Point, delta: ScrollDelta, modifiers: Modifiers) -> bool {
        if !screen.is_finite() {
            return false;
        }
        if modifiers.control {
            let lines = delta.lines_y();
            if lines == 0.0 || !lines.is_finite() {
                return false;
            }
            let factor = self.session.settings.zoom_step.powf(lines);
            return self.zoom_around(factor, screen);
        }

        let pixels = delta.pixels();
        if pixels == Point::ZERO || !pixels.is_finite() {
            return false;
        }
        self.canvas.document.viewport_mut().pan_by(pixels.x, pixels.y);
        self.mark_dirty();
        true
    }

    /// Zoom by `factor` around the centre of the surface.
    pub fn zoom_by(&mut self, factor: f32) -> bool {
        let (w, h) = self.canvas.surface_size;
        self.zoom_around(factor, Point::new(w / 2.0, h / 2.0))
    }

    fn zoom_around(&mut self, factor: f32, screen: Point) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let changed = self.canvas.document.viewport_mut().zoom_around(factor, screen);
        if changed {
            self.mark_dirty();
            debug!(zoom = self.canvas.document.viewport().zoom, "Zoomed");
        }
        changed
    }

    /// Fit every item into the surface. Returns false on an empty board.
    pub fn fit_all_to_view(&mut self) -> bool {
        let Some(bounds) = self.canvas.document.bounds() else {
            return false;
        };
        let (w, h) = self.canvas.surface_size;
        self.canvas
            .document
            .viewport_mut()
            .fit_to_bounds(bounds, w, h, FIT_VIEW_PADDING);
        self.mark_dirty();
        debug!(viewport = ?self.canvas.document.viewport(), "Fit all to view");
        true
    }

    /// Back to 100% with the canvas origin at the top-left.
    pub fn reset_view(&mut self) {
        self.canvas.document.set_viewport(Viewport::default());
        self.mark_dirty();
    }
}
