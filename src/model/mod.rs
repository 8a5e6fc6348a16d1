//! Data models for the annotation editor.

mod annotation;
mod classes;
mod geometry;

pub use annotation::{Annotation, BoxCorner, Geometry, HandleRef, ImageSize, ShapeKind};
pub use classes::{ClassList, UNKNOWN_CLASS_LABEL};
pub use geometry::{Point, Rect, polygon_contains};
