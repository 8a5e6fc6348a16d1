//! YOLO label format: line codec, errors and per-image label storage.
//!
//! ## Usage
//!
//! ```rust
//! use yolo_editor::format::{decode_line, encode};
//! use yolo_editor::model::{Geometry, ImageSize, Rect};
//!
//! let size = ImageSize::new(800, 600);
//! let line = encode(0, &Geometry::Box(Rect::new(100.0, 100.0, 300.0, 250.0)), size);
//! assert_eq!(line, "0 0.250000 0.291667 0.250000 0.250000");
//!
//! let ann = decode_line(&line, 1, size).unwrap();
//! assert_eq!(ann.class_id(), 0);
//! ```

mod error;
mod store;
pub mod yolo;

#[cfg(test)]
mod tests;

pub use error::{DecodeError, DecodeErrorKind, FormatError, PersistAction, PersistError};
pub use store::{FsLabelStore, LabelStore, MemoryLabelStore, encode_set, label_path_for};
pub use yolo::{decode_document, decode_line, encode, encode_document};
