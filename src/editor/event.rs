//! Input and output vocabulary of an editing session.
//!
//! The host forwards pointer and key input using the types here and drains
//! [`EditorEvent`]s afterwards to refresh its list boxes, inspector and
//! canvas. The session never touches widgets itself.

use std::path::PathBuf;

/// Discrete intents emitted by the session for its host.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A new annotation was appended at `index`
    ShapeAdded { index: usize },
    /// The annotation at `index` became selected
    ShapeSelected { index: usize },
    /// The selection was cleared
    ShapeDeselected,
    /// A move, resize, nudge or class change of `index` was committed
    ShapeCommitted { index: usize },
    /// The annotation at `index` was removed; later indices shifted down
    ShapeDeleted { index: usize },
    /// Draw mode changed
    ModeToggled { mode: Option<DrawMode> },
    /// The annotation set was replaced by an undo snapshot
    HistoryRestored,
    /// The label file could not be decoded; the set was opened empty and saving is blocked
    LoadFailed { path: PathBuf, message: String },
    /// Writing the label file failed; the in-memory edit is kept
    PersistFailed { path: PathBuf, message: String },
}

/// Which shape a press starts drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Box,
    Polygon,
}

impl DrawMode {
    pub fn name(&self) -> &'static str {
        match self {
            DrawMode::Box => "box",
            DrawMode::Polygon => "polygon",
        }
    }
}

/// Pointer button of a press event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// One-pixel arrow-key move of the selected annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Left,
    Right,
    Up,
    Down,
}

impl Nudge {
    /// World-space delta for one press.
    pub fn delta(&self) -> (f64, f64) {
        match self {
            Nudge::Left => (-1.0, 0.0),
            Nudge::Right => (1.0, 0.0),
            Nudge::Up => (0.0, -1.0),
            Nudge::Down => (0.0, 1.0),
        }
    }
}

/// Far edge of a box adjusted by fine resize controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// `x2`
    Right,
    /// `y2`
    Bottom,
}

/// Keys the session understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Escape,
    Delete,
    Undo,
    Arrow(Nudge),
    ToggleBoxMode,
    TogglePolygonMode,
}
