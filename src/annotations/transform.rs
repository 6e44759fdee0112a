//! Geometry engine: pure transforms over annotations
//!
//! Every function takes an annotation by reference and returns a new one of
//! the same kind (or nothing when the result would be degenerate). Identity,
//! z-order, visibility and style always carry over unchanged.

use crate::capture::image::BaseImage;
use crate::domain::{Annotation, AnnotationKind, Handle, Point, Rect, SampleSource};

/// Smallest width/height a resize may produce
pub const MIN_DIMENSION: f32 = 8.0;

/// Floor applied to the editable frame of thin line-like shapes
pub const MIN_EDITABLE_EXTENT: f32 = 10.0;

/// Rectangle spanned by a drag from `start` to `current`
pub fn frame_from_points(start: Point, current: Point) -> Rect {
    Rect::from_points(start, current)
}

/// Sample descriptor for a region-sampling annotation covering `frame`
pub fn sample_source_for(frame: &Rect, image: &BaseImage) -> SampleSource {
    let region = image
        .pixel_bounds()
        .intersect(frame.to_pixel_rect())
        .unwrap_or_default();
    SampleSource {
        image: image.fingerprint(),
        region,
    }
}

/// Check if the annotation can be resized through handles
pub fn supports_resize(annotation: &Annotation) -> bool {
    !matches!(
        annotation.kind,
        AnnotationKind::Text(_) | AnnotationKind::Counter(_)
    )
}

/// Check if the annotation can be rotated through handles
pub fn supports_rotation(annotation: &Annotation) -> bool {
    matches!(
        annotation.kind,
        AnnotationKind::Rectangle(_)
            | AnnotationKind::Ellipse(_)
            | AnnotationKind::Text(_)
            | AnnotationKind::Pencil(_)
            | AnnotationKind::Line(_)
    )
}

/// Current rotation angle; zero for variants that bake rotation into points
pub fn rotation_degrees(annotation: &Annotation) -> f32 {
    annotation.rotation()
}

/// Normalized frame used for hit-testing, handles and as resize source
pub fn editable_frame(annotation: &Annotation) -> Rect {
    match &annotation.kind {
        AnnotationKind::Rectangle(r) => r.frame.standardized(),
        AnnotationKind::Ellipse(e) => e.frame.standardized(),
        AnnotationKind::Blur(b) => b.frame.standardized(),
        AnnotationKind::Pixelate(p) => p.frame.standardized(),
        AnnotationKind::Spotlight(s) => s.frame.standardized(),
        AnnotationKind::Crop(c) => c.frame.standardized(),
        AnnotationKind::Text(t) => Rect::from_origin_size(t.position, t.size).standardized(),
        AnnotationKind::Counter(c) => Rect::new(
            c.center.x - c.radius,
            c.center.y - c.radius,
            c.radius * 2.0,
            c.radius * 2.0,
        ),
        AnnotationKind::Line(_)
        | AnnotationKind::Arrow(_)
        | AnnotationKind::Highlighter(_)
        | AnnotationKind::Pencil(_) => Rect::bounding(annotation.points())
            .unwrap_or_default()
            .with_min_extent(MIN_EDITABLE_EXTENT),
    }
}

/// Shift every coordinate by `delta`
///
/// Region-sampling annotations keep sampling the same source image; their
/// region follows the frame.
pub fn translate(annotation: &Annotation, delta: Point) -> Option<Annotation> {
    if !delta.is_finite() {
        return None;
    }
    let mut next = annotation.clone();
    match &mut next.kind {
        AnnotationKind::Rectangle(r) => r.frame = r.frame.translate(delta),
        AnnotationKind::Ellipse(e) => e.frame = e.frame.translate(delta),
        AnnotationKind::Line(l) => {
            l.start = l.start.offset(delta);
            l.end = l.end.offset(delta);
        }
        AnnotationKind::Arrow(a) => {
            a.start = a.start.offset(delta);
            a.end = a.end.offset(delta);
        }
        AnnotationKind::Highlighter(h) => {
            h.start = h.start.offset(delta);
            h.end = h.end.offset(delta);
        }
        AnnotationKind::Pencil(p) => {
            for point in &mut p.points {
                *point = point.offset(delta);
            }
        }
        AnnotationKind::Text(t) => t.position = t.position.offset(delta),
        AnnotationKind::Counter(c) => c.center = c.center.offset(delta),
        AnnotationKind::Blur(b) => {
            b.frame = b.frame.translate(delta);
            b.source.region = b.frame.to_pixel_rect();
        }
        AnnotationKind::Pixelate(p) => {
            p.frame = p.frame.translate(delta);
            p.source.region = p.frame.to_pixel_rect();
        }
        AnnotationKind::Spotlight(s) => s.frame = s.frame.translate(delta),
        AnnotationKind::Crop(c) => c.frame = c.frame.translate(delta),
    }
    Some(next)
}

/// Translate and rebuild any sample source against a replacement image
///
/// Used when the base image itself changes (crop): the sampled pixels
/// now come from `image`, clipped to its bounds.
pub fn translate_onto(
    annotation: &Annotation,
    delta: Point,
    image: &BaseImage,
) -> Option<Annotation> {
    let mut next = translate(annotation, delta)?;
    match &mut next.kind {
        AnnotationKind::Blur(b) => b.source = sample_source_for(&b.frame, image),
        AnnotationKind::Pixelate(p) => p.source = sample_source_for(&p.frame, image),
        _ => {}
    }
    Some(next)
}

/// Proportionally map `point` from `from` into `to`
fn remap(point: Point, from: &Rect, to: &Rect) -> Point {
    let from_w = if from.width == 0.0 { 1.0 } else { from.width };
    let from_h = if from.height == 0.0 { 1.0 } else { from.height };
    Point::new(
        to.x + ((point.x - from.x) / from_w) * to.width,
        to.y + ((point.y - from.y) / from_h) * to.height,
    )
}

/// Fit the annotation into `to_frame`
///
/// Frame-based variants adopt the frame; point-based variants remap every
/// point proportionally from `from_frame`. Returns `None` below
/// [`MIN_DIMENSION`] or for variants that cannot be resized.
pub fn resize(annotation: &Annotation, from_frame: &Rect, to_frame: &Rect) -> Option<Annotation> {
    if !supports_resize(annotation) || !to_frame.is_finite() {
        return None;
    }
    let to = to_frame.standardized();
    if to.width < MIN_DIMENSION || to.height < MIN_DIMENSION {
        return None;
    }
    let from = from_frame.standardized();
    let mut next = annotation.clone();
    match &mut next.kind {
        AnnotationKind::Rectangle(r) => r.frame = to,
        AnnotationKind::Ellipse(e) => e.frame = to,
        AnnotationKind::Spotlight(s) => s.frame = to,
        AnnotationKind::Crop(c) => c.frame = to,
        AnnotationKind::Blur(b) => {
            b.frame = to;
            b.source.region = to.to_pixel_rect();
        }
        AnnotationKind::Pixelate(p) => {
            p.frame = to;
            p.source.region = to.to_pixel_rect();
        }
        AnnotationKind::Line(l) => {
            l.start = remap(l.start, &from, &to);
            l.end = remap(l.end, &from, &to);
        }
        AnnotationKind::Arrow(a) => {
            a.start = remap(a.start, &from, &to);
            a.end = remap(a.end, &from, &to);
        }
        AnnotationKind::Highlighter(h) => {
            h.start = remap(h.start, &from, &to);
            h.end = remap(h.end, &from, &to);
        }
        AnnotationKind::Pencil(p) => {
            for point in &mut p.points {
                *point = remap(*point, &from, &to);
            }
        }
        AnnotationKind::Text(_) | AnnotationKind::Counter(_) => return None,
    }
    Some(next)
}

/// Set the absolute rotation to `to_degrees`
///
/// Rectangle, ellipse and text store the angle. Pencil and line have no
/// angle field: their points are rotated about the editable-frame center by
/// the difference from their current angle (always zero), so a rotate
/// gesture must always start from the annotation as it was at gesture start.
pub fn rotate(annotation: &Annotation, to_degrees: f32) -> Option<Annotation> {
    if !supports_rotation(annotation) || !to_degrees.is_finite() {
        return None;
    }
    let angle = to_degrees.rem_euclid(360.0);
    let mut next = annotation.clone();
    match &mut next.kind {
        AnnotationKind::Rectangle(r) => r.rotation = angle,
        AnnotationKind::Ellipse(e) => e.rotation = angle,
        AnnotationKind::Text(t) => t.rotation = angle,
        AnnotationKind::Line(_) | AnnotationKind::Pencil(_) => {
            let delta = to_degrees - rotation_degrees(annotation);
            let center = editable_frame(annotation).center();
            match &mut next.kind {
                AnnotationKind::Line(l) => {
                    l.start = l.start.rotated_around(center, delta);
                    l.end = l.end.rotated_around(center, delta);
                }
                AnnotationKind::Pencil(p) => {
                    for point in &mut p.points {
                        *point = point.rotated_around(center, delta);
                    }
                }
                _ => {}
            }
        }
        _ => return None,
    }
    Some(next)
}

/// Move only the dragged edges of `original` to `pointer`
///
/// The result is raw: dragging past the opposite edge yields a negative
/// extent, which [`resize`] standardizes.
pub fn rect_for_resize(handle: Handle, original: &Rect, pointer: Point) -> Rect {
    let r = original.standardized();
    let (mut left, mut top, mut right, mut bottom) = (r.x, r.y, r.x + r.width, r.y + r.height);
    match handle {
        Handle::NW => {
            left = pointer.x;
            top = pointer.y;
        }
        Handle::N => top = pointer.y,
        Handle::NE => {
            right = pointer.x;
            top = pointer.y;
        }
        Handle::E => right = pointer.x,
        Handle::SE => {
            right = pointer.x;
            bottom = pointer.y;
        }
        Handle::S => bottom = pointer.y,
        Handle::SW => {
            left = pointer.x;
            bottom = pointer.y;
        }
        Handle::W => left = pointer.x,
    }
    Rect::new(left, top, right - left, bottom - top)
}
