//! Global constants for the editing engine

/// Maximum number of annotation-set snapshots kept for undo.
pub const UNDO_HISTORY_SIZE: usize = 50;

/// Multiplier applied per wheel notch when zooming in (divided when zooming out).
pub const ZOOM_STEP: f64 = 1.1;

/// Lower bound for the zoom level
pub const ZOOM_MIN: f64 = 0.01;

/// Upper bound for the zoom level
pub const ZOOM_MAX: f64 = 100.0;

/// Fraction of the viewport the image occupies after fit-to-viewport.
pub const FIT_MARGIN: f64 = 0.95;

/// Side length of a resize handle square, in view pixels.
pub const HANDLE_SIZE: f64 = 10.0;

/// Extra tolerance around a handle square, in view pixels.
pub const HANDLE_HALO: f64 = 5.0;

/// Tolerance around shape bodies, in view pixels.
pub const BODY_HIT_TOLERANCE: f64 = 1.0;

/// A drawn box must exceed this extent on both axes (world pixels) to be kept.
pub const MIN_DRAW_EXTENT: f64 = 2.0;

/// Minimum extent a box keeps when resized with the fine-resize controls.
pub const MIN_FINE_RESIZE_EXTENT: f64 = 1.0;

/// Minimum number of vertices for a committed polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Label tab drawn above a shape's top-left corner (view pixels).
pub const LABEL_TAB_WIDTH: f64 = 60.0;
/// Label tab height (view pixels).
pub const LABEL_TAB_HEIGHT: f64 = 16.0;

/// Decimal places written for normalized coordinates.
pub const COORD_PRECISION: usize = 6;

/// Name of the class list file at the dataset root.
pub const CLASSES_FILENAME: &str = "classes.txt";

/// Name of the directory holding label files in the `images/` + `labels/` layout.
pub const LABELS_DIR_NAME: &str = "labels";

/// Supported image extensions (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];
