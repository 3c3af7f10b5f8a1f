//! Engine-wide constants.
//!
//! Centralizes magic numbers and default values to make the codebase
//! more maintainable and self-documenting.

// ============================================================================
// Board File Format
// ============================================================================

/// Format marker written into every board file
pub const BOARD_FORMAT_TAG: &str = "refboard";

/// Current board file format version
pub const BOARD_FORMAT_VERSION: u32 = 1;

/// File extension for saved boards
pub const BOARD_FILE_EXTENSION: &str = "json";

/// Suffix of the folder receiving consolidated or pasted images
pub const CONSOLIDATED_DIR_SUFFIX: &str = "_images";

/// Name used for boards created without one
pub const DEFAULT_BOARD_NAME: &str = "Untitled Board";

// ============================================================================
// Zoom & Pan
// ============================================================================

/// Minimum zoom level
pub const MIN_ZOOM: f32 = 0.001;

/// Maximum zoom level
pub const MAX_ZOOM: f32 = 100.0;

/// Default wheel zoom factor per notch
pub const DEFAULT_ZOOM_STEP: f32 = 1.15;

/// Pixels panned per scroll line
pub const SCROLL_LINE_PIXELS: f32 = 20.0;

/// Padding in screen pixels kept around content by fit-to-view
pub const FIT_VIEW_PADDING: f32 = 20.0;

// ============================================================================
// Item Placement
// ============================================================================

/// Offset between successive items of one drop batch (canvas units)
pub const DEFAULT_DROP_CASCADE_OFFSET: f32 = 24.0;

/// Smallest scale reachable by dragging a resize handle
pub const MIN_HANDLE_SCALE: f32 = 0.1;

/// Largest scale reachable by dragging a resize handle
pub const MAX_HANDLE_SCALE: f32 = 10.0;

/// Absolute scales offered for the selection
pub const RESIZE_PRESETS: [f32; 8] = [0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0];

/// Columns used by grid layout
pub const GRID_COLUMNS: usize = 4;

/// Spacing between cells in grid layout (canvas units)
pub const GRID_SPACING: f32 = 10.0;

// ============================================================================
// Input Handling
// ============================================================================

/// Size of the resize corner area in screen pixels
pub const RESIZE_CORNER_SIZE: f32 = 12.0;

/// Minimum size for rubber band selection to trigger (prevents accidental selection)
pub const MIN_MARQUEE_SIZE: f32 = 5.0;

// ============================================================================
// Decoding
// ============================================================================

/// File extensions accepted from drops
pub const SUPPORTED_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff", "exr",
];

/// Default number of background decode workers
pub const DEFAULT_DECODE_WORKERS: usize = 2;

/// Threshold after which a single decode is logged as slow (ms)
pub const SLOW_DECODE_MS: f64 = 250.0;

/// Threshold after which a save or load is logged as slow (ms)
pub const SLOW_BOARD_IO_MS: f64 = 500.0;

/// Threshold for `profile_scope!` timers (ms)
pub const PROFILE_SCOPE_THRESHOLD_MS: f64 = 1.0;
