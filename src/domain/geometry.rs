//! Geometric types for annotation coordinates and image regions
//!
//! Floating point types (`Point`, `Size`, `Rect`) carry annotation geometry
//! in base-image coordinates. `PixelRect` is the integer form used whenever
//! a region of the base image itself is addressed.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Tolerance used by approximate comparisons
pub const EPSILON: f32 = 1e-3;

/// A point (or a delta) in image coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset this point by a delta
    pub fn offset(self, delta: Point) -> Point {
        Point::new(self.x + delta.x, self.y + delta.y)
    }

    /// Component-wise difference `self - other`
    pub fn delta_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn negated(self) -> Point {
        Point::new(-self.x, -self.y)
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Rotate this point around `center` by `degrees` (clockwise in screen space)
    pub fn rotated_around(self, center: Point, degrees: f32) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Point::new(
            center.x + dx * cos - dy * sin,
            center.y + dx * sin + dy * cos,
        )
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn approx_eq(self, other: Point) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }
}

/// Width and height in image units
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle with origin and (possibly negative) size
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// The min/max rectangle spanned by two arbitrary points
    pub fn from_points(a: Point, b: Point) -> Self {
        let (min_x, max_x) = if a.x < b.x { (a.x, b.x) } else { (b.x, a.x) };
        let (min_y, max_y) = if a.y < b.y { (a.y, b.y) } else { (b.y, a.y) };
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Bounding rectangle of a set of points, `None` when empty
    pub fn bounding<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Same rectangle with non-negative width and height
    pub fn standardized(self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self::new(x, y, width, height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn min_x(&self) -> f32 {
        self.x.min(self.x + self.width)
    }

    pub fn min_y(&self) -> f32 {
        self.y.min(self.y + self.height)
    }

    pub fn max_x(&self) -> f32 {
        self.x.max(self.x + self.width)
    }

    pub fn max_y(&self) -> f32 {
        self.y.max(self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Whether the point lies inside (edges inclusive)
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// Whether the two rectangles overlap (edges inclusive)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x() <= other.max_x()
            && other.min_x() <= self.max_x()
            && self.min_y() <= other.max_y()
            && other.min_y() <= self.max_y()
    }

    /// Overlapping region with positive area, if any
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.min_x().max(other.min_x());
        let top = self.min_y().max(other.min_y());
        let right = self.max_x().min(other.max_x());
        let bottom = self.max_y().min(other.max_y());
        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    pub fn translate(&self, delta: Point) -> Rect {
        Rect::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Grow (positive) or shrink (negative) on every side
    pub fn outset(&self, amount: f32) -> Rect {
        let r = self.standardized();
        Rect::new(
            r.x - amount,
            r.y - amount,
            r.width + amount * 2.0,
            r.height + amount * 2.0,
        )
    }

    /// Expand around the center so each side is at least `floor`
    pub fn with_min_extent(&self, floor: f32) -> Rect {
        let r = self.standardized();
        let center = r.center();
        let width = r.width.max(floor);
        let height = r.height.max(floor);
        Rect::new(center.x - width * 0.5, center.y - height * 0.5, width, height)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    pub fn approx_eq(&self, other: &Rect) -> bool {
        let a = self.standardized();
        let b = other.standardized();
        (a.x - b.x).abs() <= EPSILON
            && (a.y - b.y).abs() <= EPSILON
            && (a.width - b.width).abs() <= EPSILON
            && (a.height - b.height).abs() <= EPSILON
    }

    /// Whole-pixel rectangle with the origin and size rounded to the nearest pixel
    pub fn to_pixel_rect(&self) -> PixelRect {
        let r = self.standardized();
        let left = r.x.round() as i32;
        let top = r.y.round() as i32;
        PixelRect::new(
            left,
            top,
            left + r.width.round() as i32,
            top + r.height.round() as i32,
        )
    }
}

/// Integer rectangle addressing pixels of an image
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    /// Create a new rectangle from coordinates
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle covering a whole image of the given size
    pub fn of_image(width: u32, height: u32) -> Self {
        Self::new(
            0,
            0,
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: PixelRect) -> Option<PixelRect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if left < right && top < bottom {
            Some(PixelRect {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Convert to dimensions (NonZeroU32 width and height)
    pub fn dimensions(self) -> Option<RectDimension> {
        if self.width() <= 0 || self.height() <= 0 {
            return None;
        }
        let width = NonZeroU32::new(self.width().unsigned_abs())?;
        let height = NonZeroU32::new(self.height().unsigned_abs())?;
        Some(RectDimension { width, height })
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(
            self.left as f32,
            self.top as f32,
            self.width() as f32,
            self.height() as f32,
        )
    }
}

/// Non-zero dimensions of a rectangle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RectDimension {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl RectDimension {
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_normalizes() {
        let r = Rect::from_points(Point::new(30.0, 5.0), Point::new(10.0, 25.0));
        assert_eq!(r, Rect::new(10.0, 5.0, 20.0, 20.0));
    }

    #[test]
    fn test_standardized_flips_negative_extent() {
        let r = Rect::new(50.0, 50.0, -20.0, -10.0).standardized();
        assert_eq!(r, Rect::new(30.0, 40.0, 20.0, 10.0));
    }

    #[test]
    fn test_intersection_requires_positive_area() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(a.intersection(&b).is_none());
        assert!(a.intersects(&b));

        let c = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection(&c), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn test_with_min_extent_keeps_center() {
        let r = Rect::new(10.0, 10.0, 0.0, 4.0).with_min_extent(10.0);
        assert!(r.approx_eq(&Rect::new(5.0, 7.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let p = Point::new(10.0, 0.0).rotated_around(Point::ZERO, 90.0);
        assert!(p.approx_eq(Point::new(0.0, 10.0)));
    }

    #[test]
    fn test_pixel_rect_intersect_and_dimensions() {
        let image = PixelRect::of_image(120, 90);
        let crop = PixelRect::new(100, 80, 150, 120);
        let clipped = image.intersect(crop).unwrap();
        assert_eq!(clipped, PixelRect::new(100, 80, 120, 90));
        let dims = clipped.dimensions().unwrap();
        assert_eq!((dims.width(), dims.height()), (20, 10));
        assert!(PixelRect::new(5, 5, 5, 9).dimensions().is_none());
    }

    #[test]
    fn test_to_pixel_rect_rounds() {
        let r = Rect::new(19.6, 10.2, 50.1, 39.8).to_pixel_rect();
        assert_eq!(r, PixelRect::new(20, 10, 70, 50));
    }
}
