//! Application module - the InteractionController and its session logic.
//!
//! This module is organized into several submodules:
//! - `state` - The InteractionController struct definition and sub-structs
//! - `lifecycle` - Construction and host show/hide/close hooks
//! - `board_management` - New, load, save, consolidate, clear and relink
//!
//! Input handling lives in [`crate::input`] and rendering in
//! [`crate::render`], both as further `impl InteractionController` blocks.

mod board_management;
mod lifecycle;
pub(crate) mod state;

pub use state::{CanvasState, ImportState, InteractionController, PendingImport, SessionState};
