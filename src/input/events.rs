//! Tagged input events.
//!
//! Hosts can call the handler methods directly or translate their native
//! events into [`BoardEvent`] and feed them through
//! [`handle_event`](InteractionController::handle_event).

use crate::app::InteractionController;
use crate::asset::DropPayload;
use crate::error::BoardError;
use crate::input::{ImportReport, ScrollDelta};
use crate::types::{Modifiers, Point};

#[derive(Clone, Debug)]
pub enum BoardEvent {
    PointerDown { position: Point, modifiers: Modifiers },
    PointerMove { position: Point },
    PointerUp { position: Point },
    Wheel {
        position: Point,
        delta: ScrollDelta,
        modifiers: Modifiers,
    },
    Drop {
        position: Point,
        payloads: Vec<DropPayload>,
    },
    Paste { payloads: Vec<DropPayload> },
    DeleteSelected,
    /// Escape
    Cancel,
    SelectAll,
    BringToFront,
    SendToBack,
    ResizeSelected(f32),
    FitAll,
    ArrangeGrid,
    ClearAll,
    SurfaceResized { width: f32, height: f32 },
}

#[derive(Debug)]
pub enum EventOutcome {
    Unchanged,
    Redraw,
    Imported(ImportReport),
    Rejected(BoardError),
}

impl EventOutcome {
    fn redraw_if(changed: bool) -> Self {
        if changed { Self::Redraw } else { Self::Unchanged }
    }

    pub fn needs_redraw(&self) -> bool {
        match self {
            Self::Unchanged | Self::Rejected(_) => false,
            Self::Redraw => true,
            Self::Imported(report) => !report.added.is_empty(),
        }
    }
}

impl InteractionController {
    pub fn handle_event(&mut self, event: BoardEvent) -> EventOutcome {
        match event {
            BoardEvent::PointerDown { position, modifiers } => {
                EventOutcome::redraw_if(self.pointer_down(position, modifiers))
            }
            BoardEvent::PointerMove { position } => EventOutcome::redraw_if(self.pointer_move(position)),
            BoardEvent::PointerUp { position } => EventOutcome::redraw_if(self.pointer_up(position)),
            BoardEvent::Wheel {
                position,
                delta,
                modifiers,
            } => EventOutcome::redraw_if(self.handle_wheel(position, delta, modifiers)),
            BoardEvent::Drop { position, payloads } => EventOutcome::Imported(self.handle_drop(position, payloads)),
            BoardEvent::Paste { payloads } => EventOutcome::Imported(self.handle_paste(payloads)),
            BoardEvent::DeleteSelected => EventOutcome::redraw_if(self.delete_selected() > 0),
            BoardEvent::Cancel => EventOutcome::redraw_if(self.cancel()),
            BoardEvent::SelectAll => {
                self.select_all();
                EventOutcome::Redraw
            }
            BoardEvent::BringToFront => EventOutcome::redraw_if(self.bring_selection_to_front()),
            BoardEvent::SendToBack => EventOutcome::redraw_if(self.send_selection_to_back()),
            BoardEvent::ResizeSelected(scale) => match self.resize_selected(scale) {
                Ok(count) => EventOutcome::redraw_if(count > 0),
                Err(e) => EventOutcome::Rejected(e),
            },
            BoardEvent::FitAll => EventOutcome::redraw_if(self.fit_all_to_view()),
            BoardEvent::ArrangeGrid => EventOutcome::redraw_if(self.arrange_grid()),
            BoardEvent::ClearAll => EventOutcome::redraw_if(self.clear_all() > 0),
            BoardEvent::SurfaceResized { width, height } => {
                self.set_surface_size(width, height);
                EventOutcome::Redraw
            }
        }
    }
}
