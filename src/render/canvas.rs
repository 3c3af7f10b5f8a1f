//! Board rendering walk.
//!
//! ## Performance Notes
//!
//! Rendering happens every frame. Off-screen items are culled with one
//! scene index query for the visible canvas rectangle, so the per-frame
//! cost follows the number of visible items rather than the board size.
//!
//! Enable profiling with `cargo build --features profiling` to see timing.

use super::{DrawItem, RenderSurface};
use crate::app::InteractionController;
use crate::constants::RESIZE_CORNER_SIZE;
use crate::input::coords::CoordinateConverter;
use crate::profile_scope;
use crate::types::Corner;
use std::collections::HashSet;

/// Counts from the last render walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub drawn: usize,
    pub culled: usize,
}

impl InteractionController {
    /// Draw the board onto `surface`.
    pub fn render(&self, surface: &mut dyn RenderSurface) -> RenderStats {
        profile_scope!("render");
        let doc = &self.canvas.document;
        let viewport = doc.viewport();
        let (w, h) = self.canvas.surface_size;
        let visible_rect = CoordinateConverter::visible_canvas_rect(viewport, w, h);
        let visible: HashSet<_> = doc.hit_test_rect(&visible_rect).into_iter().collect();

        let mut stats = RenderStats::default();
        for item in doc.items() {
            if !visible.contains(&item.id()) {
                stats.culled += 1;
                continue;
            }
            let asset = item.asset();
            surface.draw_item(&DrawItem {
                id: item.id(),
                asset,
                quad: CoordinateConverter::quad_to_screen(&item.quad(), viewport),
                rotation: item.rotation(),
                screen_scale: item.scale() * viewport.zoom,
                selected: item.is_selected(),
                missing: asset.is_missing(),
            });
            stats.drawn += 1;
        }

        // Handles go above every item so they stay grabbable.
        for item in doc.items().iter().filter(|i| i.is_selected() && visible.contains(&i.id())) {
            for corner in Corner::ALL {
                let center = CoordinateConverter::canvas_to_screen(item.corner_position(corner), viewport);
                surface.draw_handle(center, RESIZE_CORNER_SIZE);
            }
        }

        if let Some(band) = self.canvas.input_state.rubber_band() {
            surface.draw_rubber_band(CoordinateConverter::rect_to_screen(&band, viewport));
        }
        stats
    }
}
