//! Image rendering for annotations using tiny-skia
//!
//! Every annotation kind is drawn onto a premultiplied [`Pixmap`] through a
//! caller-supplied transform that maps image coordinates to pixmap pixels.

use image::RgbaImage;
use tiny_skia::{
    BlendMode, ColorU8, FillRule, IntSize, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Stroke, StrokeDash, Transform,
};

use super::effects::{EffectCache, EffectKey};
use super::geometry::{self, arrow, shape};
use super::text::TextEngine;
use crate::capture::image::BaseImage;
use crate::domain::{
    Annotation, AnnotationKind, ArrowAnnotation, ArrowHead, Color, CounterAnnotation, FontSpec,
    Point, Rect, StrokeStyle, TextAnnotation,
};

/// Everything a single annotation draw may need besides the target
pub struct DrawContext<'a> {
    pub base: &'a BaseImage,
    pub effects: &'a mut EffectCache,
    pub text: &'a dyn TextEngine,
}

/// Copy an image into a premultiplied pixmap
pub fn pixmap_from_rgba(img: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(img.width(), img.height())?;
    let data = img
        .pixels()
        .flat_map(|p| {
            let c = ColorU8::from_rgba(p[0], p[1], p[2], p[3]).premultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    Pixmap::from_vec(data, size)
}

/// Copy a pixmap back into a straight-alpha image
pub fn rgba_from_pixmap(pixmap: &Pixmap) -> Option<RgbaImage> {
    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
}

fn paint_for(color: Color) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn stroke_for(style: &StrokeStyle) -> Stroke {
    let width = style.width.max(0.5);
    Stroke {
        width,
        line_cap: if style.dashed {
            LineCap::Butt
        } else {
            LineCap::Round
        },
        line_join: LineJoin::Round,
        dash: if style.dashed {
            StrokeDash::new(vec![width * 3.0, width * 2.0], 0.0)
        } else {
            None
        },
        ..Default::default()
    }
}

/// Rotation about `center` applied before `transform`
fn rotated(transform: Transform, degrees: f32, center: Point) -> Transform {
    if degrees == 0.0 {
        transform
    } else {
        transform.pre_concat(Transform::from_rotate_at(degrees, center.x, center.y))
    }
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(center: Point, rx: f32, ry: f32) -> Option<Path> {
    let (cx, cy) = (center.x, center.y);
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    let mut pb = PathBuilder::new();

    // Start at top
    pb.move_to(cx, cy - ry);

    // Top to right
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);

    // Right to bottom
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);

    // Bottom to left
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);

    // Left to top
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);

    pb.close();
    pb.finish()
}

/// Rectangle path with optionally rounded corners
fn build_rect_path(frame: &Rect, radius: f32) -> Option<Path> {
    let r = frame.standardized();
    let radius = radius.min(r.width * 0.5).min(r.height * 0.5).max(0.0);
    let (left, top, right, bottom) = (r.min_x(), r.min_y(), r.max_x(), r.max_y());

    let mut pb = PathBuilder::new();
    if radius <= 0.0 {
        pb.move_to(left, top);
        pb.line_to(right, top);
        pb.line_to(right, bottom);
        pb.line_to(left, bottom);
        pb.close();
        return pb.finish();
    }

    let k = radius * (1.0 - shape::BEZIER_K);
    pb.move_to(left + radius, top);
    pb.line_to(right - radius, top);
    pb.cubic_to(right - k, top, right, top + k, right, top + radius);
    pb.line_to(right, bottom - radius);
    pb.cubic_to(right, bottom - k, right - k, bottom, right - radius, bottom);
    pb.line_to(left + radius, bottom);
    pb.cubic_to(left + k, bottom, left, bottom - k, left, bottom - radius);
    pb.line_to(left, top + radius);
    pb.cubic_to(left, top + k, left + k, top, left + radius, top);
    pb.close();
    pb.finish()
}

fn build_polyline(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
}

/// Fill and stroke a closed shape
fn draw_shape(
    pixmap: &mut Pixmap,
    path: &Path,
    stroke: &StrokeStyle,
    fill: Option<Color>,
    transform: Transform,
) {
    if let Some(fill) = fill {
        pixmap.fill_path(path, &paint_for(fill), FillRule::Winding, transform, None);
    }
    if stroke.width > 0.0 {
        pixmap.stroke_path(path, &paint_for(stroke.color), &stroke_for(stroke), transform, None);
    }
}

fn draw_arrow(pixmap: &mut Pixmap, a: &ArrowAnnotation, transform: Transform) {
    let paint = paint_for(a.stroke.color);
    let head_size = arrow::head_size(a.stroke.width);
    let head = match a.head {
        ArrowHead::None => None,
        _ => arrow::head_points(a.start, a.end, head_size),
    };

    // a filled head covers the last part of the shaft
    let shaft_end = match (a.head, head) {
        (ArrowHead::Filled, Some((h1, h2))) => {
            Point::new((h1.x + h2.x) * 0.5, (h1.y + h2.y) * 0.5)
        }
        _ => a.end,
    };
    if let Some(shaft) = build_polyline(&[a.start, shaft_end]) {
        pixmap.stroke_path(&shaft, &paint, &stroke_for(&a.stroke), transform, None);
    }

    let Some((h1, h2)) = head else {
        return;
    };
    let mut pb = PathBuilder::new();
    match a.head {
        ArrowHead::Filled => {
            pb.move_to(a.end.x, a.end.y);
            pb.line_to(h1.x, h1.y);
            pb.line_to(h2.x, h2.y);
            pb.close();
            if let Some(path) = pb.finish() {
                pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
        }
        _ => {
            pb.move_to(h1.x, h1.y);
            pb.line_to(a.end.x, a.end.y);
            pb.line_to(h2.x, h2.y);
            if let Some(path) = pb.finish() {
                let solid = StrokeStyle {
                    dashed: false,
                    ..a.stroke.clone()
                };
                pixmap.stroke_path(&path, &paint, &stroke_for(&solid), transform, None);
            }
        }
    }
}

fn draw_pencil(pixmap: &mut Pixmap, points: &[Point], stroke: &StrokeStyle, transform: Transform) {
    match points {
        [] => {}
        [dot] => {
            let radius = stroke.width.max(1.0) * 0.5;
            if let Some(path) = PathBuilder::from_circle(dot.x, dot.y, radius) {
                let paint = paint_for(stroke.color);
                pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
        }
        _ => {
            let smoothed = geometry::smooth_path(points);
            if let Some(path) = build_polyline(&smoothed) {
                let paint = paint_for(stroke.color);
                pixmap.stroke_path(&path, &paint, &stroke_for(stroke), transform, None);
            }
        }
    }
}

fn draw_text(
    pixmap: &mut Pixmap,
    t: &TextAnnotation,
    transform: Transform,
    engine: &dyn TextEngine,
) {
    let frame = Rect::from_origin_size(t.position, t.size);
    let transform = rotated(transform, t.rotation, frame.center());
    if let Some(background) = t.background {
        let padded = frame.outset(t.font.size * 0.2);
        if let Some(path) = build_rect_path(&padded, t.font.size * 0.2) {
            let paint = paint_for(background);
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
    }
    engine.paint(pixmap, &t.text, &t.font, t.position, t.color, transform);
}

fn draw_counter(
    pixmap: &mut Pixmap,
    c: &CounterAnnotation,
    transform: Transform,
    engine: &dyn TextEngine,
) {
    let Some(circle) = PathBuilder::from_circle(c.center.x, c.center.y, c.radius.max(1.0)) else {
        return;
    };
    pixmap.fill_path(&circle, &paint_for(c.color), FillRule::Winding, transform, None);

    let label = c.style.label(c.value);
    let font = FontSpec {
        name: String::from("Sans"),
        size: c.radius * 1.1,
        bold: true,
        italic: false,
    };
    let size = engine.measure(&label, &font);
    let origin = Point::new(c.center.x - size.width * 0.5, c.center.y - size.height * 0.5);
    engine.paint(pixmap, &label, &font, origin, Color::WHITE, transform);
}

/// Darken everything inside `canvas` except `hole`
pub fn dim_outside(
    pixmap: &mut Pixmap,
    canvas: &Rect,
    hole: &Rect,
    alpha: f32,
    transform: Transform,
) {
    let hole = hole.standardized();
    let (Some(outer), Some(inner)) = (
        tiny_skia::Rect::from_xywh(canvas.x, canvas.y, canvas.width, canvas.height),
        tiny_skia::Rect::from_xywh(hole.x, hole.y, hole.width, hole.height),
    ) else {
        return;
    };
    let mut pb = PathBuilder::new();
    pb.push_rect(outer);
    pb.push_rect(inner);
    let Some(path) = pb.finish() else {
        return;
    };
    pixmap.fill_path(
        &path,
        &paint_for(Color::BLACK.with_alpha(alpha)),
        FillRule::EvenOdd,
        transform,
        None,
    );
}

/// Paste the filtered region over the raw one
fn draw_region_effect(
    pixmap: &mut Pixmap,
    annotation: &Annotation,
    transform: Transform,
    ctx: &mut DrawContext<'_>,
) {
    let Some(key) = EffectKey::for_annotation(annotation, ctx.base) else {
        return;
    };
    let Some(processed) = ctx.effects.get_or_compute(key, ctx.base) else {
        return;
    };
    let Some(patch) = pixmap_from_rgba(processed) else {
        return;
    };
    let paint = PixmapPaint {
        blend_mode: BlendMode::Source,
        ..Default::default()
    };
    pixmap.draw_pixmap(
        key.region.left,
        key.region.top,
        patch.as_ref(),
        &paint,
        transform,
        None,
    );
}

/// Draw one annotation in image coordinates mapped through `transform`
pub fn draw_annotation(
    pixmap: &mut Pixmap,
    annotation: &Annotation,
    transform: Transform,
    ctx: &mut DrawContext<'_>,
) {
    match &annotation.kind {
        AnnotationKind::Rectangle(r) => {
            let t = rotated(transform, r.rotation, r.frame.standardized().center());
            if let Some(path) = build_rect_path(&r.frame, r.corner_radius) {
                draw_shape(pixmap, &path, &r.stroke, r.fill, t);
            }
        }
        AnnotationKind::Ellipse(e) => {
            let (center, rx, ry) = geometry::ellipse_from_bounds(&e.frame);
            let t = rotated(transform, e.rotation, center);
            if let Some(path) = build_ellipse_path(center, rx, ry) {
                draw_shape(pixmap, &path, &e.stroke, e.fill, t);
            }
        }
        AnnotationKind::Line(l) => {
            if let Some(path) = build_polyline(&[l.start, l.end]) {
                let paint = paint_for(l.stroke.color);
                pixmap.stroke_path(&path, &paint, &stroke_for(&l.stroke), transform, None);
            }
        }
        AnnotationKind::Arrow(a) => draw_arrow(pixmap, a, transform),
        AnnotationKind::Highlighter(h) => {
            if let Some(path) = build_polyline(&[h.start, h.end]) {
                let mut paint = paint_for(h.color);
                paint.blend_mode = BlendMode::Multiply;
                let stroke = Stroke {
                    width: h.width.max(1.0),
                    line_cap: LineCap::Square,
                    line_join: LineJoin::Round,
                    ..Default::default()
                };
                pixmap.stroke_path(&path, &paint, &stroke, transform, None);
            }
        }
        AnnotationKind::Pencil(p) => draw_pencil(pixmap, &p.points, &p.stroke, transform),
        AnnotationKind::Text(t) => draw_text(pixmap, t, transform, ctx.text),
        AnnotationKind::Counter(c) => draw_counter(pixmap, c, transform, ctx.text),
        AnnotationKind::Blur(_) | AnnotationKind::Pixelate(_) => {
            draw_region_effect(pixmap, annotation, transform, ctx)
        }
        AnnotationKind::Spotlight(s) => {
            let canvas = ctx.base.bounds();
            dim_outside(pixmap, &canvas, &s.frame, s.dim, transform);
        }
        // editing affordance only; the live overlay draws it
        AnnotationKind::Crop(_) => {}
    }
}
