//! Coordinate conversion between the render surface and the canvas.
//!
//! `screen = canvas * zoom + pan`, with screen coordinates relative to the
//! top-left of the render surface.

use crate::types::{Point, Quad, Rect, Viewport};

pub struct CoordinateConverter;

impl CoordinateConverter {
    #[inline]
    pub fn screen_to_canvas(screen: Point, viewport: &Viewport) -> Point {
        Point::new(
            (screen.x - viewport.pan_x) / viewport.zoom,
            (screen.y - viewport.pan_y) / viewport.zoom,
        )
    }

    #[inline]
    pub fn canvas_to_screen(canvas: Point, viewport: &Viewport) -> Point {
        Point::new(
            canvas.x * viewport.zoom + viewport.pan_x,
            canvas.y * viewport.zoom + viewport.pan_y,
        )
    }

    /// Convert a delta from screen to canvas (for drag operations)
    #[inline]
    pub fn delta_screen_to_canvas(delta: Point, zoom: f32) -> Point {
        Point::new(delta.x / zoom, delta.y / zoom)
    }

    #[inline]
    pub fn delta_canvas_to_screen(delta: Point, zoom: f32) -> Point {
        Point::new(delta.x * zoom, delta.y * zoom)
    }

    pub fn quad_to_screen(quad: &Quad, viewport: &Viewport) -> Quad {
        Quad {
            corners: quad.corners.map(|p| Self::canvas_to_screen(p, viewport)),
        }
    }

    pub fn rect_to_screen(rect: &Rect, viewport: &Viewport) -> Rect {
        Rect::from_corners(
            Self::canvas_to_screen(rect.min, viewport),
            Self::canvas_to_screen(rect.max, viewport),
        )
    }

    /// Canvas area covered by a surface of `width` x `height`.
    pub fn visible_canvas_rect(viewport: &Viewport, width: f32, height: f32) -> Rect {
        Rect::from_corners(
            Self::screen_to_canvas(Point::ZERO, viewport),
            Self::screen_to_canvas(Point::new(width, height), viewport),
        )
    }
}
