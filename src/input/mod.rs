//! Pointer, wheel, keyboard and drop input for the board.
//!
//! Every handler is a method on [`InteractionController`](crate::app::InteractionController)
//! taking screen coordinates relative to the render surface.
//!
//! ## Architecture
//!
//! The input system uses an explicit state machine (`InputState`) to track
//! the current gesture. Handlers convert to canvas coordinates once, then
//! mutate the document through its own operations so z order and the scene
//! index stay consistent.
//!
//! ## Modules
//!
//! - `state` - Input state machine enum and helper methods
//! - `mouse_down` - Pointer down (selection, drag/resize/rubber band start)
//! - `drag` - Pointer move (drag, resize, rubber band update)
//! - `mouse_up` - Pointer up (commit gesture, rubber band selection)
//! - `transform` - Wheel zoom and pan, fit to view
//! - `drop` - Drop and paste import through the decode queue
//! - `keyboard` - Delete, cancel, z order and resize commands
//! - `events` - Tagged event enum for hosts that prefer a single entry point

pub mod coords;
mod drag;
mod drop;
mod events;
mod keyboard;
mod mouse_down;
mod mouse_up;
mod state;
mod transform;

pub use drop::{ImportFailure, ImportReport};
pub use events::{BoardEvent, EventOutcome};
pub use state::InputState;
pub use transform::ScrollDelta;
