//! Core types for the reference board.
//!
//! This module defines the small value types shared by every part of the
//! engine: identifiers, canvas geometry, the viewport transform and the
//! selection/origin enums that are persisted in board files.

use crate::constants::{MAX_ZOOM, MIN_ZOOM};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a placed item, unique within one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Identifier of a decoded image asset, unique for the whole process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// A point in canvas (or screen) coordinates. Y grows downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn distance(self, other: Point) -> f32 {
        (self - other).length()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Rotate around the origin by `degrees` (clockwise on a y-down canvas).
    pub fn rotated(self, degrees: f32) -> Point {
        if degrees == 0.0 {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An axis-aligned rectangle, always normalized so `min <= max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Build a rectangle from any two opposite corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_origin_size(origin: Point, width: f32, height: f32) -> Self {
        Self::from_corners(origin, Point::new(origin.x + width, origin.y + height))
    }

    /// Smallest rectangle containing every point, `None` for an empty iterator.
    pub fn bounding<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = Rect { min: first, max: first };
        for p in iter {
            rect.min.x = rect.min.x.min(p.x);
            rect.min.y = rect.min.y.min(p.y);
            rect.max.x = rect.max.x.max(p.x);
            rect.max.y = rect.max.y.max(p.y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
}

/// The footprint of an item: four corners in `Corner::ALL` order.
///
/// A rotated rectangle in general, so hit tests go through the edges
/// rather than the bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => self.corners[0],
            Corner::TopRight => self.corners[1],
            Corner::BottomRight => self.corners[2],
            Corner::BottomLeft => self.corners[3],
        }
    }

    pub fn aabb(&self) -> Rect {
        let [a, b, c, d] = self.corners;
        Rect {
            min: Point::new(a.x.min(b.x).min(c.x).min(d.x), a.y.min(b.y).min(c.y).min(d.y)),
            max: Point::new(a.x.max(b.x).max(c.x).max(d.x), a.y.max(b.y).max(c.y).max(d.y)),
        }
    }

    /// Point-in-convex-polygon, edges inclusive.
    pub fn contains(&self, p: Point) -> bool {
        let mut positive = false;
        let mut negative = false;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
            if cross > 1e-4 {
                positive = true;
            } else if cross < -1e-4 {
                negative = true;
            }
            if positive && negative {
                return false;
            }
        }
        true
    }

    /// Separating-axis test against an axis-aligned rectangle.
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        if !self.aabb().intersects(rect) {
            return false;
        }
        let rect_corners = rect.corners();
        // The rect's own axes are covered by the AABB check above.
        for i in 0..2 {
            let edge = self.corners[i + 1] - self.corners[i];
            let axis = Point::new(-edge.y, edge.x);
            if axis.length() <= f32::EPSILON {
                continue;
            }
            let (q_min, q_max) = project(&self.corners, axis);
            let (r_min, r_max) = project(&rect_corners, axis);
            if q_max < r_min || r_max < q_min {
                return false;
            }
        }
        true
    }
}

fn project(points: &[Point; 4], axis: Point) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for p in points {
        let d = p.x * axis.x + p.y * axis.y;
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Corner of an item's (possibly rotated) footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomRight => Corner::TopLeft,
            Corner::BottomLeft => Corner::TopRight,
        }
    }

    /// Position of the corner on the unit square, `(0|1, 0|1)`.
    pub fn unit_offset(self) -> (f32, f32) {
        match self {
            Corner::TopLeft => (0.0, 0.0),
            Corner::TopRight => (1.0, 0.0),
            Corner::BottomRight => (1.0, 1.0),
            Corner::BottomLeft => (0.0, 1.0),
        }
    }
}

// ============================================================================
// Viewport
// ============================================================================

/// The pan/zoom transform through which the canvas is viewed.
///
/// `screen = canvas * zoom + pan`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn is_valid(&self) -> bool {
        self.pan_x.is_finite() && self.pan_y.is_finite() && self.zoom.is_finite() && self.zoom > 0.0
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Multiply the zoom by `factor`, keeping the canvas point under `screen_anchor` fixed.
    ///
    /// Returns false if the clamped zoom did not change.
    pub fn zoom_around(&mut self, factor: f32, screen_anchor: Point) -> bool {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if !new_zoom.is_finite() || (new_zoom - self.zoom).abs() <= f32::EPSILON * self.zoom {
            return false;
        }
        let canvas_x = (screen_anchor.x - self.pan_x) / self.zoom;
        let canvas_y = (screen_anchor.y - self.pan_y) / self.zoom;
        self.zoom = new_zoom;
        self.pan_x = screen_anchor.x - canvas_x * new_zoom;
        self.pan_y = screen_anchor.y - canvas_y * new_zoom;
        true
    }

    /// Fit `bounds` into a surface of `surface_w` x `surface_h`, keeping aspect ratio.
    pub fn fit_to_bounds(&mut self, bounds: Rect, surface_w: f32, surface_h: f32, padding: f32) {
        let avail_w = (surface_w - 2.0 * padding).max(1.0);
        let avail_h = (surface_h - 2.0 * padding).max(1.0);
        let w = bounds.width().max(f32::EPSILON);
        let h = bounds.height().max(f32::EPSILON);
        let zoom = (avail_w / w).min(avail_h / h).clamp(MIN_ZOOM, MAX_ZOOM);
        let center = bounds.center();
        self.zoom = zoom;
        self.pan_x = surface_w / 2.0 - center.x * zoom;
        self.pan_y = surface_h / 2.0 - center.y * zoom;
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Where an asset's bytes came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetOrigin {
    #[default]
    File,
    Clipboard,
}

/// Selection policy for the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// At most one item selected at a time
    Single,
    /// Shift-click toggles, rubber band adds
    #[default]
    Multi,
}

/// Keyboard modifiers delivered with pointer events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        control: false,
    };

    pub const CONTROL: Modifiers = Modifiers {
        shift: false,
        control: true,
    };
}
