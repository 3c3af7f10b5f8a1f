//! Input state machine - the single source of truth for the current gesture.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Dragging             (pointer down on an item)
//! Idle -> Resizing             (pointer down on a selected item's corner handle)
//! Idle -> RubberBandSelecting  (pointer down on empty canvas)
//! Idle -> Pasting              (paste handed to the decode queue)
//!
//! Dragging | Resizing | RubberBandSelecting -> Idle   (pointer up, commits)
//! Dragging | Resizing | RubberBandSelecting -> Idle   (cancel, restores snapshot)
//! Pasting -> Idle              (paste decoded, or cancelled)
//! ```
//!
//! All positions are canvas coordinates.

use crate::decode_queue::DecodeTicket;
use crate::types::{Corner, ItemId, Point, Rect};

#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No active gesture
    #[default]
    Idle,

    /// Moving an item (and the rest of the selection with it)
    Dragging {
        /// Item under the pointer at gesture start
        item: ItemId,
        /// Pointer position minus item origin
        grab_offset: Point,
    },

    /// Scaling an item from one of its corner handles
    Resizing {
        item: ItemId,
        /// Corner that stays fixed
        anchor: Corner,
        anchor_point: Point,
        handle_start: Point,
        start_scale: f32,
    },

    /// Drag-selecting with a rectangle
    RubberBandSelecting {
        start: Point,
        current: Point,
        /// Shift was held: the band adds to the existing selection
        additive: bool,
    },

    /// A paste is being decoded in the background
    Pasting { ticket: DecodeTicket },
}

impl InputState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// True for pointer gestures that a cancel can roll back.
    pub fn is_gesture(&self) -> bool {
        matches!(
            self,
            Self::Dragging { .. } | Self::Resizing { .. } | Self::RubberBandSelecting { .. }
        )
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, Self::Resizing { .. })
    }

    pub fn is_rubber_band_selecting(&self) -> bool {
        matches!(self, Self::RubberBandSelecting { .. })
    }

    pub fn is_pasting(&self) -> bool {
        matches!(self, Self::Pasting { .. })
    }

    pub fn dragged_item(&self) -> Option<ItemId> {
        match self {
            Self::Dragging { item, .. } => Some(*item),
            _ => None,
        }
    }

    pub fn resized_item(&self) -> Option<ItemId> {
        match self {
            Self::Resizing { item, .. } => Some(*item),
            _ => None,
        }
    }

    /// Item the current gesture acts on, if any.
    pub fn active_item(&self) -> Option<ItemId> {
        self.dragged_item().or_else(|| self.resized_item())
    }

    pub fn paste_ticket(&self) -> Option<DecodeTicket> {
        match self {
            Self::Pasting { ticket } => Some(*ticket),
            _ => None,
        }
    }

    /// Current rubber band rectangle in canvas coordinates.
    pub fn rubber_band(&self) -> Option<Rect> {
        match self {
            Self::RubberBandSelecting { start, current, .. } => Some(Rect::from_corners(*start, *current)),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    pub fn start_dragging(&mut self, item: ItemId, grab_offset: Point) {
        *self = Self::Dragging { item, grab_offset };
    }

    pub fn start_resizing(
        &mut self,
        item: ItemId,
        anchor: Corner,
        anchor_point: Point,
        handle_start: Point,
        start_scale: f32,
    ) {
        *self = Self::Resizing {
            item,
            anchor,
            anchor_point,
            handle_start,
            start_scale,
        };
    }

    pub fn start_rubber_band(&mut self, start: Point, additive: bool) {
        *self = Self::RubberBandSelecting {
            start,
            current: start,
            additive,
        };
    }

    pub fn set_rubber_band_current(&mut self, point: Point) {
        if let Self::RubberBandSelecting { current, .. } = self {
            *current = point;
        }
    }

    pub fn start_pasting(&mut self, ticket: DecodeTicket) {
        *self = Self::Pasting { ticket };
    }
}
