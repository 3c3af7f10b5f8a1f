//! Render surface adapter.
//!
//! The engine does not draw. It walks the board in z order and hands the
//! host one [`DrawItem`] per visible item through a [`RenderSurface`], with
//! every position already in screen coordinates.

mod canvas;

use crate::asset::ImageAsset;
use crate::types::{ItemId, Point, Quad, Rect};

/// One item to draw. Items arrive bottom to top.
#[derive(Debug)]
pub struct DrawItem<'a> {
    pub id: ItemId,
    pub asset: &'a ImageAsset,
    /// Footprint on screen, corners in `Corner::ALL` order
    pub quad: Quad,
    /// Degrees clockwise about the top-left corner
    pub rotation: f32,
    /// Pixels on screen per asset pixel
    pub screen_scale: f32,
    pub selected: bool,
    /// Placeholder standing in for a file that could not be loaded
    pub missing: bool,
}

/// Implemented by the host's drawing layer.
pub trait RenderSurface {
    fn draw_item(&mut self, item: &DrawItem<'_>);

    /// Resize handle of a selected item, `size` pixels across.
    fn draw_handle(&mut self, _center: Point, _size: f32) {}

    fn draw_rubber_band(&mut self, _rect: Rect) {}
}

pub use canvas::RenderStats;
