//! Plain geometry value types shared by the model, viewport and hit tester.

use serde::{Deserialize, Serialize};

/// A 2D point. Used for both world (image pixel) and view (screen pixel) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin, also the sentinel returned by degenerate transforms.
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Return this point shifted by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// An axis-aligned rectangle stored as two corners.
///
/// The corners are not required to be ordered: while a box is being dragged
/// `x1` may exceed `x2`. Use [`Rect::normalized`] to get `x1 <= x2, y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a rectangle spanning two corner points (order preserved).
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    /// Smallest rectangle containing all points, or `None` for an empty set.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut rect = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            rect.x1 = rect.x1.min(p.x);
            rect.y1 = rect.y1.min(p.y);
            rect.x2 = rect.x2.max(p.x);
            rect.y2 = rect.y2.max(p.y);
        }
        Some(rect)
    }

    /// Same rectangle with `x1 <= x2` and `y1 <= y2`.
    pub fn normalized(&self) -> Self {
        Self::new(
            self.x1.min(self.x2),
            self.y1.min(self.y2),
            self.x1.max(self.x2),
            self.y1.max(self.y2),
        )
    }

    pub fn is_normalized(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Absolute width, independent of corner order.
    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).abs()
    }

    /// Absolute height, independent of corner order.
    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).abs()
    }

    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn expanded(&self, amount: f64) -> Self {
        let n = self.normalized();
        Self::new(n.x1 - amount, n.y1 - amount, n.x2 + amount, n.y2 + amount)
    }

    /// Check if a point is inside the rectangle (edges inclusive).
    pub fn contains(&self, point: Point) -> bool {
        let n = self.normalized();
        point.x >= n.x1 && point.x <= n.x2 && point.y >= n.y1 && point.y <= n.y2
    }
}

/// Ray casting point-in-polygon test. Fewer than three vertices never contain anything.
pub fn polygon_contains(vertices: &[Point], point: Point) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_normalized() {
        let r = Rect::new(50.0, 80.0, 10.0, 20.0);
        assert!(!r.is_normalized());
        assert_eq!(r.normalized(), Rect::new(10.0, 20.0, 50.0, 80.0));
        assert_eq!(r.width(), 40.0);
        assert_eq!(r.height(), 60.0);
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 110.0, 110.0);
        assert!(r.contains(Point::new(50.0, 50.0)));
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(!r.contains(Point::new(5.0, 50.0)));
        // Reversed corners behave the same
        assert!(Rect::new(110.0, 110.0, 10.0, 10.0).contains(Point::new(50.0, 50.0)));
    }

    #[test]
    fn test_bounding_of_points() {
        let pts = [
            Point::new(3.0, 9.0),
            Point::new(-1.0, 4.0),
            Point::new(7.0, 2.0),
        ];
        assert_eq!(Rect::bounding(&pts), Some(Rect::new(-1.0, 2.0, 7.0, 9.0)));
        assert_eq!(Rect::bounding(&[]), None);
    }

    #[test]
    fn test_polygon_contains() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        assert!(polygon_contains(&square, Point::new(50.0, 50.0)));
        assert!(!polygon_contains(&square, Point::new(150.0, 50.0)));
        assert!(!polygon_contains(&square[..2], Point::new(50.0, 0.0)));
    }

    #[test]
    fn test_polygon_concave_notch() {
        // U shape: the notch between the arms is outside
        let u = [
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 60.0),
            Point::new(70.0, 60.0),
            Point::new(70.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        assert!(!polygon_contains(&u, Point::new(50.0, 20.0)));
        assert!(polygon_contains(&u, Point::new(15.0, 20.0)));
        assert!(polygon_contains(&u, Point::new(50.0, 80.0)));
    }
}
