//! yolo_editor - YOLO Annotation Editing Engine
//!
//! Loads per-image YOLO label files, turns them into editable box and
//! polygon shapes in image-pixel space, and drives the pointer/keyboard
//! interaction used to draw, select, move, resize, relabel and delete them.
//! Every committed edit is written back to the label file.
//!
//! ## Quick start
//!
//! ```rust
//! use yolo_editor::config::EditorPreferences;
//! use yolo_editor::editor::{DrawMode, EditorSession, PointerButton};
//! use yolo_editor::format::MemoryLabelStore;
//! use yolo_editor::model::{ImageSize, Point};
//!
//! let prefs = EditorPreferences::default();
//! let mut session = EditorSession::new(MemoryLabelStore::default(), &prefs);
//! session.set_viewport_size(800.0, 600.0);
//! session.open_labels("frame.txt".into(), ImageSize::new(800, 600));
//!
//! session.set_draw_mode(Some(DrawMode::Box));
//! session.press(Point::new(100.0, 100.0), PointerButton::Primary);
//! session.drag(Point::new(200.0, 180.0));
//! session.release(Point::new(200.0, 180.0));
//!
//! assert_eq!(session.annotations().len(), 1);
//! ```

pub mod config;
pub mod constants;
pub mod editor;
pub mod format;
pub mod model;
pub mod project;
pub mod scan_worker;
pub mod undo;
pub mod viewport;
