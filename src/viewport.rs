//! Viewport transform between world (image pixel) and view (screen pixel) space.
//!
//! The image center is drawn at the viewport center shifted by the pan
//! offset, scaled by the zoom level:
//!
//! ```text
//! view = viewport_center + pan + (world - image_center) * zoom
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{FIT_MARGIN, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};
use crate::model::{ImageSize, Point};

/// What stays fixed on screen while zooming with the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomAnchor {
    /// Scale around the current pan position (viewport center)
    #[default]
    Center,
    /// Keep the world point under the cursor fixed
    Cursor,
}

/// Zoom level, pan offset and the sizes they are relative to.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    viewport_width: f64,
    viewport_height: f64,
    image_width: f64,
    image_height: f64,
    fit_margin: f64,
    zoom_step: f64,
    anchor: ZoomAnchor,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(FIT_MARGIN, ZOOM_STEP, ZoomAnchor::Center)
    }
}

impl Viewport {
    /// Create a viewport with no image and no surface yet (zoom 1, no pan).
    pub fn new(fit_margin: f64, zoom_step: f64, anchor: ZoomAnchor) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            viewport_width: 0.0,
            viewport_height: 0.0,
            image_width: 0.0,
            image_height: 0.0,
            fit_margin,
            zoom_step,
            anchor,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan_offset(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    pub fn viewport_size(&self) -> (f64, f64) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn anchor(&self) -> ZoomAnchor {
        self.anchor
    }

    /// Set zoom and pan directly. Zoom is not clamped here.
    pub fn set_transform(&mut self, zoom: f64, pan_x: f64, pan_y: f64) {
        self.zoom = zoom;
        self.pan_x = pan_x;
        self.pan_y = pan_y;
    }

    /// Record a new image and fit it.
    pub fn set_image_size(&mut self, size: ImageSize) {
        self.image_width = size.width_f64();
        self.image_height = size.height_f64();
        self.fit_to_viewport();
    }

    /// Record a new viewport (drawing surface) size and refit.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.fit_to_viewport();
    }

    /// Scale the image to fill the viewport (times the fit margin) and clear the pan.
    ///
    /// Does nothing until both the image and the surface have usable sizes.
    pub fn fit_to_viewport(&mut self) {
        if self.viewport_width <= 1.0
            || self.viewport_height <= 1.0
            || self.image_width <= 0.0
            || self.image_height <= 0.0
        {
            log::trace!("Fit skipped: viewport or image size not known yet");
            return;
        }
        let scale_w = self.viewport_width / self.image_width;
        let scale_h = self.viewport_height / self.image_height;
        self.zoom = scale_w.min(scale_h) * self.fit_margin;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        log::debug!("🔍 Fit to viewport: {:.3}x", self.zoom);
    }

    fn center(&self) -> (f64, f64) {
        (
            self.viewport_width / 2.0 + self.pan_x,
            self.viewport_height / 2.0 + self.pan_y,
        )
    }

    pub fn world_to_view(&self, world: Point) -> Point {
        let (cx, cy) = self.center();
        Point::new(
            cx + (world.x - self.image_width / 2.0) * self.zoom,
            cy + (world.y - self.image_height / 2.0) * self.zoom,
        )
    }

    /// Inverse of [`Viewport::world_to_view`]. A zero zoom maps everything to the origin.
    pub fn view_to_world(&self, view: Point) -> Point {
        if self.zoom == 0.0 {
            return Point::ORIGIN;
        }
        let (cx, cy) = self.center();
        Point::new(
            (view.x - cx) / self.zoom + self.image_width / 2.0,
            (view.y - cy) / self.zoom + self.image_height / 2.0,
        )
    }

    /// Convert a view-space length to world space.
    pub fn view_len_to_world(&self, len: f64) -> f64 {
        if self.zoom == 0.0 { 0.0 } else { len / self.zoom }
    }

    /// Apply a pan delta in view pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Zoom by whole wheel notches (positive zooms in).
    ///
    /// With [`ZoomAnchor::Center`] only the zoom changes. With
    /// [`ZoomAnchor::Cursor`] the pan is adjusted so the world point under
    /// `cursor` stays under it.
    pub fn zoom_by_wheel(&mut self, notches: i32, cursor: Point) {
        if notches == 0 {
            return;
        }
        let factor = self.zoom_step.powi(notches);
        let new_zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);

        if self.anchor == ZoomAnchor::Cursor && self.zoom != 0.0 {
            self.zoom_to_cursor(new_zoom, cursor);
        } else {
            self.zoom = new_zoom;
        }
        log::debug!("🔍 Zoom: {:.2}x", self.zoom);
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * self.zoom_step).min(ZOOM_MAX);
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / self.zoom_step).max(ZOOM_MIN);
    }

    /// Set a new zoom while keeping the world point under `cursor` fixed.
    fn zoom_to_cursor(&mut self, new_zoom: f64, cursor: Point) {
        // Cursor position relative to the viewport center
        let rel_x = cursor.x - self.viewport_width / 2.0;
        let rel_y = cursor.y - self.viewport_height / 2.0;

        // Image-space offset from the image center under the cursor
        let img_x = (rel_x - self.pan_x) / self.zoom;
        let img_y = (rel_y - self.pan_y) / self.zoom;

        self.pan_x = rel_x - img_x * new_zoom;
        self.pan_y = rel_y - img_y * new_zoom;
        self.zoom = new_zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn viewport(zoom: f64, pan: (f64, f64)) -> Viewport {
        let mut vp = Viewport::default();
        vp.set_viewport_size(800.0, 600.0);
        vp.set_image_size(ImageSize::new(800, 600));
        vp.set_transform(zoom, pan.0, pan.1);
        vp
    }

    #[test]
    fn test_identity_at_zoom_one() {
        let vp = viewport(1.0, (0.0, 0.0));
        let p = vp.world_to_view(Point::new(100.0, 100.0));
        assert!(approx_eq(p.x, 100.0));
        assert!(approx_eq(p.y, 100.0));
    }

    #[test]
    fn test_round_trip_many_transforms() {
        let transforms = [
            (1.0, (0.0, 0.0)),
            (0.37, (12.0, -40.5)),
            (2.5, (-300.0, 120.0)),
            (13.0, (0.25, 0.75)),
        ];
        let points = [
            Point::new(0.0, 0.0),
            Point::new(799.0, 599.0),
            Point::new(-50.0, 1200.0),
            Point::new(123.456, 78.9),
        ];
        for (zoom, pan) in transforms {
            let vp = viewport(zoom, pan);
            for p in points {
                let back = vp.view_to_world(vp.world_to_view(p));
                assert!((back.x - p.x).abs() < 1e-6, "{:?} -> {:?}", p, back);
                assert!((back.y - p.y).abs() < 1e-6, "{:?} -> {:?}", p, back);
            }
        }
    }

    #[test]
    fn test_zero_zoom_returns_origin() {
        let mut vp = viewport(1.0, (0.0, 0.0));
        vp.set_transform(0.0, 5.0, 5.0);
        assert_eq!(vp.view_to_world(Point::new(300.0, 200.0)), Point::ORIGIN);
        assert_eq!(vp.view_len_to_world(10.0), 0.0);
    }

    #[test]
    fn test_fit_uses_smaller_scale_and_margin() {
        let mut vp = Viewport::default();
        vp.set_image_size(ImageSize::new(1600, 600));
        vp.set_viewport_size(800.0, 600.0);
        assert!(approx_eq(vp.zoom(), 0.5 * FIT_MARGIN));
        assert_eq!(vp.pan_offset(), (0.0, 0.0));
    }

    #[test]
    fn test_fit_is_idempotent() {
        let mut vp = Viewport::default();
        vp.set_viewport_size(1024.0, 768.0);
        vp.set_image_size(ImageSize::new(640, 480));
        vp.pan_by(40.0, 10.0);

        vp.fit_to_viewport();
        let first = (vp.zoom(), vp.pan_offset());
        vp.fit_to_viewport();
        assert_eq!((vp.zoom(), vp.pan_offset()), first);
    }

    #[test]
    fn test_fit_waits_for_sizes() {
        let mut vp = Viewport::default();
        vp.set_viewport_size(800.0, 600.0);
        // No image yet
        assert_eq!(vp.zoom(), 1.0);
        vp.set_image_size(ImageSize::new(0, 0));
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn test_center_anchored_wheel_keeps_pan() {
        let mut vp = viewport(1.0, (30.0, -20.0));
        vp.zoom_by_wheel(1, Point::new(10.0, 10.0));
        assert!(approx_eq(vp.zoom(), ZOOM_STEP));
        assert_eq!(vp.pan_offset(), (30.0, -20.0));

        vp.zoom_by_wheel(-1, Point::new(10.0, 10.0));
        assert!(approx_eq(vp.zoom(), 1.0));
    }

    #[test]
    fn test_cursor_anchored_wheel_keeps_point_under_cursor() {
        let mut vp = Viewport::new(FIT_MARGIN, ZOOM_STEP, ZoomAnchor::Cursor);
        vp.set_viewport_size(800.0, 600.0);
        vp.set_image_size(ImageSize::new(800, 600));
        vp.set_transform(1.0, 50.0, 30.0);

        let cursor = Point::new(150.0, 120.0);
        let before = vp.view_to_world(cursor);
        vp.zoom_by_wheel(3, cursor);
        let after = vp.view_to_world(cursor);

        assert!(approx_eq(vp.zoom(), ZOOM_STEP.powi(3)));
        assert!((before.x - after.x).abs() < 1e-6);
        assert!((before.y - after.y).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut vp = viewport(ZOOM_MAX, (0.0, 0.0));
        vp.zoom_in();
        assert_eq!(vp.zoom(), ZOOM_MAX);
        vp.set_transform(ZOOM_MIN, 0.0, 0.0);
        vp.zoom_by_wheel(-5, Point::ORIGIN);
        assert_eq!(vp.zoom(), ZOOM_MIN);
    }

    #[test]
    fn test_pan_moves_view_not_world() {
        let mut vp = viewport(2.0, (0.0, 0.0));
        let before = vp.world_to_view(Point::new(10.0, 10.0));
        vp.pan_by(5.0, -7.0);
        let after = vp.world_to_view(Point::new(10.0, 10.0));
        assert!(approx_eq(after.x - before.x, 5.0));
        assert!(approx_eq(after.y - before.y, -7.0));
        assert_eq!(vp.zoom(), 2.0);
    }
}
