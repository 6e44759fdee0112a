//! View transform of the canvas (zoom and pan)
//!
//! Purely presentational: annotations always live in image coordinates and
//! the viewport only converts pointer positions.

use crate::domain::Point;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 32.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    zoom: f32,
    /// View-space position of the image origin
    pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::ZERO,
        }
    }
}

impl Viewport {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Multiply the zoom, keeping the image point under `anchor` in place
    pub fn zoom_at(&mut self, factor: f32, anchor: Point) {
        if !factor.is_finite() || factor <= 0.0 || !anchor.is_finite() {
            return;
        }
        let fixed = self.view_to_image(anchor);
        self.set_zoom(self.zoom * factor);
        self.pan = Point::new(anchor.x - fixed.x * self.zoom, anchor.y - fixed.y * self.zoom);
    }

    pub fn pan_by(&mut self, delta: Point) {
        if delta.is_finite() {
            self.pan = self.pan.offset(delta);
        }
    }

    pub fn view_to_image(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.zoom, (p.y - self.pan.y) / self.zoom)
    }

    pub fn image_to_view(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan.x, p.y * self.zoom + self.pan.y)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_is_clamped() {
        let mut v = Viewport::default();
        v.set_zoom(100.0);
        assert_eq!(v.zoom(), MAX_ZOOM);
        v.set_zoom(0.0);
        assert_eq!(v.zoom(), MIN_ZOOM);
        v.set_zoom(f32::NAN);
        assert_eq!(v.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut v = Viewport::default();
        v.pan_by(Point::new(10.0, -5.0));
        let anchor = Point::new(50.0, 40.0);
        let before = v.view_to_image(anchor);
        v.zoom_at(2.5, anchor);
        assert!(v.view_to_image(anchor).approx_eq(before));
        assert_eq!(v.zoom(), 2.5);
    }

    #[test]
    fn test_conversions_are_inverse() {
        let mut v = Viewport::default();
        v.set_zoom(3.0);
        v.pan_by(Point::new(7.0, 11.0));
        let p = Point::new(12.5, -4.0);
        assert!(v.view_to_image(v.image_to_view(p)).approx_eq(p));
        v.reset();
        assert_eq!(v, Viewport::default());
    }
}
