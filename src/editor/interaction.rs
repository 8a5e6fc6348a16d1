//! Pointer interaction state of an editing session.

use crate::constants::MIN_POLYGON_VERTICES;
use crate::model::{Geometry, HandleRef, Point, Rect};

/// What the pointer is currently doing. Exactly one state is active.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Drawing a box - anchored at the press point, far corner follows the pointer.
    DrawingBox { anchor: Point, current: Point },
    /// Drawing a polygon - vertices added so far (world space).
    DrawingPolygon { vertices: Vec<Point> },
    /// Moving a whole annotation.
    Moving {
        index: usize,
        /// Geometry at press time
        original: Geometry,
        /// World position of the press
        anchor: Point,
    },
    /// Dragging one handle of an annotation.
    Resizing {
        index: usize,
        original: Geometry,
        handle: HandleRef,
        anchor: Point,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Check if a new shape is being drawn.
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            Interaction::DrawingBox { .. } | Interaction::DrawingPolygon { .. }
        )
    }

    /// Check if an existing annotation is being moved or resized.
    pub fn is_editing(&self) -> bool {
        matches!(
            self,
            Interaction::Moving { .. } | Interaction::Resizing { .. }
        )
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::DrawingBox { .. } => "drawing box",
            Interaction::DrawingPolygon { .. } => "drawing polygon",
            Interaction::Moving { .. } => "moving",
            Interaction::Resizing { .. } => "resizing",
        }
    }

    /// Geometry of the shape being drawn, for live preview.
    ///
    /// A polygon preview is returned even before it has enough vertices.
    pub fn preview(&self) -> Option<Geometry> {
        match self {
            Interaction::DrawingBox { anchor, current } => {
                Some(Geometry::Box(Rect::from_corners(*anchor, *current)))
            }
            Interaction::DrawingPolygon { vertices } if !vertices.is_empty() => {
                Some(Geometry::Polygon(vertices.clone()))
            }
            _ => None,
        }
    }

    /// Convert a finished drawing to a committable shape.
    ///
    /// Boxes must exceed `min_extent` in both directions; polygons need at
    /// least three vertices. Anything else yields `None`.
    pub fn to_shape(&self, min_extent: f64) -> Option<Geometry> {
        match self {
            Interaction::DrawingBox { anchor, current } => {
                let dx = (current.x - anchor.x).abs();
                let dy = (current.y - anchor.y).abs();
                if dx > min_extent && dy > min_extent {
                    Some(Geometry::Box(Rect::from_corners(*anchor, *current).normalized()))
                } else {
                    None
                }
            }
            Interaction::DrawingPolygon { vertices } if vertices.len() >= MIN_POLYGON_VERTICES => {
                Some(Geometry::Polygon(vertices.clone()))
            }
            _ => None,
        }
    }
}
