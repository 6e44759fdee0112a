//! Shared geometry calculations for annotation rendering

use crate::domain::{Point, Rect};

/// Arrow geometry constants
pub mod arrow {
    use crate::domain::Point;

    /// Stroke width at which the head has its nominal size
    pub const THICKNESS: f32 = 4.0;
    /// Nominal arrowhead size in image units
    pub const HEAD_SIZE: f32 = 16.0;
    /// Arrowhead angle from shaft in radians (35 degrees)
    pub const HEAD_ANGLE: f32 = 0.610_865_2; // 35.0_f32.to_radians()
    /// Minimum arrow length to be drawn
    pub const MIN_LENGTH: f32 = 5.0;

    /// Head length for a given stroke width
    pub fn head_size(width: f32) -> f32 {
        HEAD_SIZE * (width / THICKNESS).max(0.5)
    }

    /// Calculate the two outer points of the arrow head at `end`
    pub fn head_points(start: Point, end: Point, head_size: f32) -> Option<(Point, Point)> {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let length = (dx * dx + dy * dy).sqrt();
        if length < MIN_LENGTH {
            return None;
        }

        // Unit direction vector (pointing from start to end)
        let nx = dx / length;
        let ny = dy / length;

        let cos_a = HEAD_ANGLE.cos();
        let sin_a = HEAD_ANGLE.sin();

        // First head line (rotated clockwise from arrow direction)
        let head1 = Point::new(
            end.x + (-nx * cos_a + ny * sin_a) * head_size,
            end.y + (-nx * sin_a - ny * cos_a) * head_size,
        );

        // Second head line (rotated counter-clockwise)
        let head2 = Point::new(
            end.x + (-nx * cos_a - ny * sin_a) * head_size,
            end.y + (nx * sin_a - ny * cos_a) * head_size,
        );

        Some((head1, head2))
    }
}

/// Shape (rectangle/ellipse) geometry constants
pub mod shape {
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Number of Chaikin corner-cutting passes applied to pencil strokes
pub const SMOOTHING_PASSES: usize = 2;

/// Upper bound on smoothed point count
const MAX_SMOOTHED_POINTS: usize = 4096;

/// Calculate ellipse center and radii from a bounding box
#[inline]
pub fn ellipse_from_bounds(frame: &Rect) -> (Point, f32, f32) {
    let frame = frame.standardized();
    let rx = (frame.width * 0.5).max(1.0);
    let ry = (frame.height * 0.5).max(1.0);
    (frame.center(), rx, ry)
}

/// One pass of Chaikin corner cutting; endpoints are kept
pub fn chaikin(points: &[Point]) -> Vec<Point> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len() * 2);
    out.push(*first);
    for w in points.windows(2) {
        let (p0, p1) = (w[0], w[1]);
        out.push(Point::new(0.75 * p0.x + 0.25 * p1.x, 0.75 * p0.y + 0.25 * p1.y));
        out.push(Point::new(0.25 * p0.x + 0.75 * p1.x, 0.25 * p0.y + 0.75 * p1.y));
    }
    out.push(*last);
    out
}

/// Smooth a freehand path for drawing
pub fn smooth_path(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    for _ in 0..SMOOTHING_PASSES {
        if pts.len() * 2 > MAX_SMOOTHED_POINTS {
            break;
        }
        pts = chaikin(&pts);
    }
    pts
}
