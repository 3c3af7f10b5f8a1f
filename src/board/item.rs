//! Placement state of a single image on the board.

use crate::asset::SharedAsset;
use crate::constants::{MAX_HANDLE_SCALE, MIN_HANDLE_SCALE};
use crate::error::{BoardError, BoardResult};
use crate::types::{Corner, ItemId, Point, Quad, Rect};

/// One placed image instance.
///
/// The origin `(x, y)` is the top-left corner of the unrotated image;
/// rotation pivots around it. Z order and selection are owned by the
/// document and only exposed read-only here.
#[derive(Clone, Debug)]
pub struct BoardItem {
    id: ItemId,
    asset: SharedAsset,
    x: f32,
    y: f32,
    scale: f32,
    rotation: f32,
    pub(crate) z_order: usize,
    pub(crate) selected: bool,
}

impl BoardItem {
    pub(crate) fn new(id: ItemId, asset: SharedAsset, position: Point) -> Self {
        Self {
            id,
            asset,
            x: position.x,
            y: position.y,
            scale: 1.0,
            rotation: 0.0,
            z_order: 0,
            selected: false,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn asset(&self) -> &SharedAsset {
        &self.asset
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Rotation in degrees, always in `[0, 360)`.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn z_order(&self) -> usize {
        self.z_order
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Displayed size in canvas units, before rotation.
    pub fn display_size(&self) -> (f32, f32) {
        (
            self.asset.width() as f32 * self.scale,
            self.asset.height() as f32 * self.scale,
        )
    }

    pub fn translate(&mut self, dx: f32, dy: f32) -> BoardResult<()> {
        self.set_position(Point::new(self.x + dx, self.y + dy))
    }

    pub fn set_position(&mut self, position: Point) -> BoardResult<()> {
        if !position.is_finite() {
            return Err(BoardError::InvalidPosition);
        }
        self.x = position.x;
        self.y = position.y;
        Ok(())
    }

    pub fn set_scale(&mut self, scale: f32) -> BoardResult<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(BoardError::InvalidScale(scale));
        }
        self.scale = scale;
        Ok(())
    }

    pub fn set_rotation(&mut self, degrees: f32) -> BoardResult<()> {
        self.rotation = normalize_rotation(degrees).ok_or(BoardError::InvalidRotation(degrees))?;
        Ok(())
    }

    pub(crate) fn replace_asset(&mut self, asset: SharedAsset) {
        self.asset = asset;
    }

    /// Footprint on the canvas.
    pub fn quad(&self) -> Quad {
        let (w, h) = self.display_size();
        let origin = self.position();
        let corners = Corner::ALL.map(|corner| {
            let (ux, uy) = corner.unit_offset();
            origin + Point::new(ux * w, uy * h).rotated(self.rotation)
        });
        Quad { corners }
    }

    pub fn aabb(&self) -> Rect {
        self.quad().aabb()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.quad().contains(p)
    }

    pub fn corner_position(&self, corner: Corner) -> Point {
        self.quad().corner(corner)
    }

    /// Set `scale` while keeping the `anchor` corner where it is on the canvas.
    pub fn resize_about(&mut self, anchor: Corner, scale: f32) -> BoardResult<()> {
        let fixed = self.corner_position(anchor);
        self.set_scale(scale)?;
        let (ux, uy) = anchor.unit_offset();
        let (w, h) = self.display_size();
        let offset = Point::new(ux * w, uy * h).rotated(self.rotation);
        self.set_position(fixed - offset)
    }
}

/// Wrap into `[0, 360)`. `None` for non-finite input.
pub fn normalize_rotation(degrees: f32) -> Option<f32> {
    if !degrees.is_finite() {
        return None;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    Some(if wrapped >= 360.0 { 0.0 } else { wrapped })
}

/// Scale reached by dragging a resize handle from `handle_start` to `pointer`
/// while `anchor` stays fixed.
pub fn handle_scale(start_scale: f32, anchor: Point, handle_start: Point, pointer: Point) -> f32 {
    let start_len = handle_start.distance(anchor);
    if start_len <= f32::EPSILON || !pointer.is_finite() {
        return start_scale;
    }
    let ratio = pointer.distance(anchor) / start_len;
    (start_scale * ratio).clamp(MIN_HANDLE_SCALE, MAX_HANDLE_SCALE)
}
