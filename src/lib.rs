//! refboard - a reference-image board engine.
//!
//! Images are dropped or pasted onto an infinite canvas, arranged by
//! moving, scaling, rotating and restacking them, and saved to a versioned
//! board file. The engine does no windowing or drawing of its own: a host
//! feeds it input through [`InteractionController`] and receives draw calls
//! through [`render::RenderSurface`].
//!
//! ```text
//! host input -> InteractionController -> BoardDocument (+ SceneIndex)
//!                      |                        |
//!                 DecodeQueue              BoardSerializer -> board file
//! ```

pub mod app;
pub mod asset;
pub mod board;
pub mod board_file;
pub mod codec;
pub mod constants;
pub mod decode_queue;
pub mod error;
pub mod input;
pub mod logging;
pub mod perf;
pub mod render;
pub mod settings;
pub mod spatial_index;
pub mod types;

pub use app::InteractionController;
pub use asset::{AssetStore, DropPayload, ImageAsset, SharedAsset};
pub use board::{BoardDocument, BoardItem, PlacementSnapshot};
pub use board_file::{AssetPolicy, BoardSerializer, LoadedBoard, MissingAsset, SaveOptions, SaveReport};
pub use codec::{ImageCodec, ImageCrateCodec};
pub use error::{BoardError, BoardResult, DecodeError, ImportError, LoadError, WriteError};
pub use input::{BoardEvent, EventOutcome, ImportFailure, ImportReport, InputState, ScrollDelta};
pub use settings::BoardSettings;
pub use spatial_index::SceneIndex;
pub use types::{AssetOrigin, Corner, ItemId, Modifiers, Point, Quad, Rect, SelectionMode, Viewport};
