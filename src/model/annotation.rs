//! Annotation data model: a class id bound to a box or polygon in image pixels.

use super::geometry::{Point, Rect};
use crate::format::yolo;

/// Dimensions of the image an annotation set belongs to, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero width or height cannot be used for normalization.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn width_f64(&self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f64(&self) -> f64 {
        f64::from(self.height)
    }
}

/// Shape kind of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Box,
    Polygon,
}

impl ShapeKind {
    /// Get the display name for this shape kind.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Box => "Box",
            ShapeKind::Polygon => "Polygon",
        }
    }
}

/// Corner of a box, named by compass direction on the normalized rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxCorner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl BoxCorner {
    /// All corners in handle drawing order.
    pub const ALL: [BoxCorner; 4] = [
        BoxCorner::NorthWest,
        BoxCorner::NorthEast,
        BoxCorner::SouthWest,
        BoxCorner::SouthEast,
    ];

    /// Position of this corner on `rect` (normalized first).
    pub fn of(&self, rect: &Rect) -> Point {
        let r = rect.normalized();
        match self {
            BoxCorner::NorthWest => Point::new(r.x1, r.y1),
            BoxCorner::NorthEast => Point::new(r.x2, r.y1),
            BoxCorner::SouthWest => Point::new(r.x1, r.y2),
            BoxCorner::SouthEast => Point::new(r.x2, r.y2),
        }
    }
}

/// Identity of a resize handle on a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleRef {
    /// One of the four corners of a box
    Corner(BoxCorner),
    /// Vertex index of a polygon
    Vertex(usize),
}

/// Geometry of an annotation in absolute image-pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Box given by two corners, normalized once committed.
    Box(Rect),
    /// Closed polygon, at least three vertices once committed.
    Polygon(Vec<Point>),
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Box(_) => ShapeKind::Box,
            Geometry::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// Axis-aligned bounds of the geometry, always normalized.
    ///
    /// An empty polygon has a zero rectangle at the origin.
    pub fn bounding_rect(&self) -> Rect {
        match self {
            Geometry::Box(rect) => rect.normalized(),
            Geometry::Polygon(vertices) => Rect::bounding(vertices).unwrap_or_default(),
        }
    }

    /// Copy of this geometry shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Geometry {
        match self {
            Geometry::Box(rect) => Geometry::Box(rect.translated(dx, dy)),
            Geometry::Polygon(vertices) => {
                Geometry::Polygon(vertices.iter().map(|p| p.offset(dx, dy)).collect())
            }
        }
    }

    /// Same geometry with box corners ordered. Polygons are returned unchanged.
    pub fn normalized(&self) -> Geometry {
        match self {
            Geometry::Box(rect) => Geometry::Box(rect.normalized()),
            Geometry::Polygon(_) => self.clone(),
        }
    }

    /// All resize handles with their world positions.
    pub fn handles(&self) -> Vec<(HandleRef, Point)> {
        match self {
            Geometry::Box(rect) => BoxCorner::ALL
                .iter()
                .map(|corner| (HandleRef::Corner(*corner), corner.of(rect)))
                .collect(),
            Geometry::Polygon(vertices) => vertices
                .iter()
                .enumerate()
                .map(|(i, p)| (HandleRef::Vertex(i), *p))
                .collect(),
        }
    }

    /// World position of a handle, or `None` if it does not belong to this geometry.
    pub fn handle_position(&self, handle: HandleRef) -> Option<Point> {
        match (self, handle) {
            (Geometry::Box(rect), HandleRef::Corner(corner)) => Some(corner.of(rect)),
            (Geometry::Polygon(vertices), HandleRef::Vertex(i)) => vertices.get(i).copied(),
            _ => None,
        }
    }
}

/// A single annotation on the current image.
///
/// Geometry is only mutated through the methods below so that
/// `bounding_rect` always matches the geometry and the cached encoded line
/// is dropped on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    class_id: u32,
    geometry: Geometry,
    bounding_rect: Rect,
    encoded_line: Option<String>,
}

impl Annotation {
    /// Create an annotation without an encoded line.
    pub fn new(class_id: u32, geometry: Geometry) -> Self {
        let bounding_rect = geometry.bounding_rect();
        Self {
            class_id,
            geometry,
            bounding_rect,
            encoded_line: None,
        }
    }

    /// Create an annotation and encode it for `image_size` immediately.
    pub fn encoded(class_id: u32, geometry: Geometry, image_size: ImageSize) -> Self {
        let mut annotation = Self::new(class_id, geometry);
        annotation.refresh_encoding(image_size);
        annotation
    }

    pub fn class_id(&self) -> u32 {
        self.class_id
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn bounding_rect(&self) -> Rect {
        self.bounding_rect
    }

    /// Cached encoded line, `None` while an edit has not been re-encoded yet.
    pub fn cached_line(&self) -> Option<&str> {
        self.encoded_line.as_deref()
    }

    /// Encoded line for `image_size`, re-encoding first if the cache is stale.
    pub fn encoded_line(&mut self, image_size: ImageSize) -> &str {
        if self.encoded_line.is_none() {
            self.refresh_encoding(image_size);
        }
        self.encoded_line.as_deref().unwrap_or_default()
    }

    /// Re-derive the encoded line from the current geometry.
    pub fn refresh_encoding(&mut self, image_size: ImageSize) {
        self.encoded_line = Some(yolo::encode(self.class_id, &self.geometry, image_size));
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.geometry = self.geometry.translated(dx, dy);
        self.touched();
    }

    /// Move one polygon vertex. Returns false for boxes or an out-of-range index.
    pub fn set_vertex(&mut self, index: usize, x: f64, y: f64) -> bool {
        let Geometry::Polygon(vertices) = &mut self.geometry else {
            return false;
        };
        let Some(vertex) = vertices.get_mut(index) else {
            return false;
        };
        *vertex = Point::new(x, y);
        self.touched();
        true
    }

    /// Move one box corner, keeping the other three fixed. Returns false for polygons.
    ///
    /// The corner is resolved against the normalized box, so the result may be
    /// inverted if the corner is dragged past the opposite edge.
    pub fn set_corner(&mut self, corner: BoxCorner, x: f64, y: f64) -> bool {
        let Geometry::Box(rect) = &mut self.geometry else {
            return false;
        };
        let mut r = rect.normalized();
        match corner {
            BoxCorner::NorthWest => {
                r.x1 = x;
                r.y1 = y;
            }
            BoxCorner::NorthEast => {
                r.x2 = x;
                r.y1 = y;
            }
            BoxCorner::SouthWest => {
                r.x1 = x;
                r.y2 = y;
            }
            BoxCorner::SouthEast => {
                r.x2 = x;
                r.y2 = y;
            }
        }
        *rect = r;
        self.touched();
        true
    }

    /// Set the box's right (`x2`) or bottom (`y2`) edge directly. Returns false for polygons.
    pub(crate) fn set_far_edge(&mut self, horizontal: bool, value: f64) -> bool {
        let Geometry::Box(rect) = &mut self.geometry else {
            return false;
        };
        if horizontal {
            rect.x2 = value;
        } else {
            rect.y2 = value;
        }
        self.touched();
        true
    }

    pub fn set_class(&mut self, class_id: u32) {
        self.class_id = class_id;
        self.encoded_line = None;
    }

    /// Replace the whole geometry (used to restore a drag snapshot).
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
        self.touched();
    }

    /// Order box corners so that `x1 <= x2` and `y1 <= y2`.
    pub fn normalize(&mut self) {
        if matches!(&self.geometry, Geometry::Box(rect) if !rect.is_normalized()) {
            self.geometry = self.geometry.normalized();
            self.touched();
        }
    }

    fn touched(&mut self) {
        self.bounding_rect = self.geometry.bounding_rect();
        self.encoded_line = None;
    }
}
