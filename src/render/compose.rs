//! Compositing of the base image and annotations
//!
//! `render_final` produces the exported image; `render_live` produces the
//! editing preview with selection chrome on top.

use std::collections::HashSet;

use image::RgbaImage;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use super::effects::{EffectCache, EffectKey};
use super::image::{DrawContext, dim_outside, draw_annotation, pixmap_from_rgba, rgba_from_pixmap};
use super::text::TextEngine;
use crate::annotations::selection::{HandleLayout, Selection, handle_layout};
use crate::annotations::store::AnnotationStore;
use crate::annotations::transform::editable_frame;
use crate::domain::{Color, PixelRect, Point, Rect};

/// Selection accent color
const ACCENT: Color = Color::rgba(0.21, 0.52, 0.89, 1.0);
/// Opacity of the shade outside a pending crop
const CROP_SHADE: f32 = 0.5;

/// Transient editing state drawn over the live preview
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveOverlay {
    /// Rubber band of an in-progress marquee selection
    pub marquee: Option<Rect>,
    /// The crop tool is active: shade around the crop frame
    pub crop_tool_active: bool,
}

/// Region of the base image that ends up in the export
///
/// The pending crop frame clipped to the image, or the whole image when
/// there is no crop or the clip leaves nothing.
pub fn export_rect(store: &AnnotationStore) -> PixelRect {
    let bounds = store.base_image().pixel_bounds();
    store
        .crop()
        .map(|crop| editable_frame(crop).to_pixel_rect())
        .and_then(|frame| bounds.intersect(frame))
        .unwrap_or(bounds)
}

fn draw_content(
    pixmap: &mut Pixmap,
    store: &AnnotationStore,
    effects: &mut EffectCache,
    text: &dyn TextEngine,
    transform: Transform,
) {
    let mut ctx = DrawContext {
        base: store.base_image(),
        effects: &mut *effects,
        text,
    };
    for annotation in store.iter().filter(|a| a.visible && !a.is_crop()) {
        draw_annotation(pixmap, annotation, transform, &mut ctx);
    }
    // hidden annotations keep their entry so toggling visibility stays cheap
    let live: HashSet<EffectKey> = store
        .iter()
        .filter(|a| a.is_region_sampling())
        .filter_map(|a| EffectKey::for_annotation(a, store.base_image()))
        .collect();
    effects.retain_keys(&live);
}

/// Flatten the canvas for export
///
/// Draws every visible non-crop annotation in ascending z over the base
/// image, restricted to [`export_rect`].
pub fn render_final(
    store: &AnnotationStore,
    effects: &mut EffectCache,
    text: &dyn TextEngine,
) -> Option<RgbaImage> {
    let region = export_rect(store);
    let base = store.base_image().region(region)?;
    let mut pixmap = pixmap_from_rgba(&base)?;
    let transform = Transform::from_translate(-region.left as f32, -region.top as f32);
    draw_content(&mut pixmap, store, effects, text, transform);
    rgba_from_pixmap(&pixmap)
}

fn accent_paint(alpha: f32) -> Paint<'static> {
    let [r, g, b, a] = ACCENT.with_alpha(alpha).to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn outline_rect(pixmap: &mut Pixmap, frame: &Rect, rotation: f32, paint: &Paint, dashed: bool) {
    let f = frame.standardized();
    let Some(rect) = tiny_skia::Rect::from_xywh(f.x, f.y, f.width, f.height) else {
        return;
    };
    let path = PathBuilder::from_rect(rect);
    let stroke = Stroke {
        width: 1.0,
        dash: if dashed {
            StrokeDash::new(vec![4.0, 3.0], 0.0)
        } else {
            None
        },
        ..Default::default()
    };
    let center = f.center();
    let transform = Transform::from_rotate_at(rotation, center.x, center.y);
    pixmap.stroke_path(&path, paint, &stroke, transform, None);
}

fn draw_handles(pixmap: &mut Pixmap, layout: &HandleLayout) {
    let mut fill = Paint::default();
    fill.set_color_rgba8(255, 255, 255, 255);
    let border = accent_paint(1.0);
    let stroke = Stroke {
        width: 1.0,
        ..Default::default()
    };
    for (_, hotspot) in &layout.resize {
        let Some(rect) =
            tiny_skia::Rect::from_xywh(hotspot.x, hotspot.y, hotspot.width, hotspot.height)
        else {
            continue;
        };
        let path = PathBuilder::from_rect(rect);
        pixmap.fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
        pixmap.stroke_path(&path, &border, &stroke, Transform::identity(), None);
    }
    for (_, hotspot) in &layout.rotate {
        let Point { x, y } = hotspot.center();
        if let Some(path) = PathBuilder::from_circle(x, y, 2.5) {
            pixmap.fill_path(&path, &border, FillRule::Winding, Transform::identity(), None);
        }
    }
}

/// Editing preview at full image size
///
/// Draws the committed content, then selection outlines, the handles of a
/// single selection, the marquee rectangle and, while the crop tool is
/// active, shades everything outside the pending crop frame.
pub fn render_live(
    store: &AnnotationStore,
    selection: &Selection,
    effects: &mut EffectCache,
    text: &dyn TextEngine,
    overlay: &LiveOverlay,
) -> Option<RgbaImage> {
    let mut pixmap = pixmap_from_rgba(store.base_image().rgba())?;
    draw_content(&mut pixmap, store, effects, text, Transform::identity());

    let outline = accent_paint(1.0);
    for annotation in selection.ids().filter_map(|id| store.get(id)) {
        let frame = editable_frame(annotation);
        outline_rect(&mut pixmap, &frame, annotation.rotation(), &outline, true);
    }
    if let Some(layout) = handle_layout(store, selection) {
        draw_handles(&mut pixmap, &layout);
    }

    if let Some(marquee) = overlay.marquee {
        let m = marquee.standardized();
        if let Some(rect) = tiny_skia::Rect::from_xywh(m.x, m.y, m.width, m.height) {
            pixmap.fill_rect(rect, &accent_paint(0.15), Transform::identity(), None);
        }
        outline_rect(&mut pixmap, &m, 0.0, &outline, false);
    }

    if overlay.crop_tool_active
        && let Some(crop) = store.crop()
    {
        let frame = editable_frame(crop);
        let canvas = store.image_bounds();
        dim_outside(&mut pixmap, &canvas, &frame, CROP_SHADE, Transform::identity());
        let mut white = Paint::default();
        white.set_color_rgba8(255, 255, 255, 255);
        outline_rect(&mut pixmap, &frame, 0.0, &white, false);
    }

    rgba_from_pixmap(&pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::image::BaseImage;
    use crate::domain::{
        Annotation, AnnotationKind, CropAnnotation, RectangleAnnotation, StrokeStyle,
    };
    use crate::render::text::CellTextEngine;
    use image::Rgba;

    fn white_store(width: u32, height: u32) -> AnnotationStore {
        AnnotationStore::new(BaseImage::new(RgbaImage::from_pixel(
            width,
            height,
            Rgba([255, 255, 255, 255]),
        )))
    }

    fn add(store: &mut AnnotationStore, kind: AnnotationKind) -> Annotation {
        let a = store.prepare(kind);
        store.add(a.clone());
        a
    }

    fn red_box(frame: Rect) -> AnnotationKind {
        let red = Color::rgb(1.0, 0.0, 0.0);
        AnnotationKind::Rectangle(RectangleAnnotation {
            frame,
            rotation: 0.0,
            stroke: StrokeStyle {
                color: red,
                width: 2.0,
                dashed: false,
            },
            fill: Some(red),
            corner_radius: 0.0,
        })
    }

    #[test]
    fn test_final_render_uses_crop_region() {
        let mut store = white_store(100, 100);
        let frame = Rect::new(10.0, 70.0, 20.0, 20.0);
        add(&mut store, red_box(frame));
        add(&mut store, AnnotationKind::Crop(CropAnnotation { frame }));

        let mut effects = EffectCache::default();
        let out = render_final(&store, &mut effects, &CellTextEngine).unwrap();
        assert_eq!(out.dimensions(), (20, 20));
        let center = out.get_pixel(10, 10);
        assert!(center[0] > 200 && center[1] < 80 && center[2] < 80);
    }

    #[test]
    fn test_final_render_skips_hidden_and_crop() {
        let mut store = white_store(40, 40);
        let mut hidden = add(&mut store, red_box(Rect::new(0.0, 0.0, 40.0, 40.0)));
        hidden.visible = false;
        store.replace(hidden);

        let mut effects = EffectCache::default();
        let out = render_final(&store, &mut effects, &CellTextEngine).unwrap();
        assert_eq!(out.dimensions(), (40, 40));
        assert!(out.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_export_rect_ignores_crop_outside_image() {
        let mut store = white_store(50, 50);
        add(
            &mut store,
            AnnotationKind::Crop(CropAnnotation {
                frame: Rect::new(60.0, 60.0, 20.0, 20.0),
            }),
        );
        assert_eq!(export_rect(&store), PixelRect::new(0, 0, 50, 50));

        let mut store = white_store(50, 50);
        add(
            &mut store,
            AnnotationKind::Crop(CropAnnotation {
                frame: Rect::new(40.0, -10.0, 20.0, 20.0),
            }),
        );
        assert_eq!(export_rect(&store), PixelRect::new(40, 0, 50, 10));
    }

    #[test]
    fn test_live_render_keeps_full_size_and_shades_crop() {
        let mut store = white_store(60, 40);
        add(
            &mut store,
            AnnotationKind::Crop(CropAnnotation {
                frame: Rect::new(20.0, 10.0, 20.0, 20.0),
            }),
        );
        let selection = Selection::default();
        let mut effects = EffectCache::default();

        let overlay = LiveOverlay {
            marquee: None,
            crop_tool_active: true,
        };
        let out = render_live(&store, &selection, &mut effects, &CellTextEngine, &overlay).unwrap();
        assert_eq!(out.dimensions(), (60, 40));
        assert!(out.get_pixel(2, 2)[0] < 200);
        assert_eq!(out.get_pixel(30, 20), &Rgba([255, 255, 255, 255]));

        let idle = render_live(
            &store,
            &selection,
            &mut effects,
            &CellTextEngine,
            &LiveOverlay::default(),
        )
        .unwrap();
        assert_eq!(idle.get_pixel(2, 2), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_live_render_draws_selection_chrome() {
        let mut store = white_store(60, 60);
        let frame = Rect::new(20.0, 20.0, 20.0, 20.0);
        let a = add(
            &mut store,
            AnnotationKind::Rectangle(RectangleAnnotation {
                frame,
                rotation: 0.0,
                stroke: StrokeStyle {
                    width: 0.0,
                    ..StrokeStyle::default()
                },
                fill: None,
                corner_radius: 0.0,
            }),
        );
        let mut selection = Selection::default();
        selection.select_only(a.id);
        let mut effects = EffectCache::default();
        let out = render_live(
            &store,
            &selection,
            &mut effects,
            &CellTextEngine,
            &LiveOverlay::default(),
        )
        .unwrap();
        // resize handle at the south-east corner: white core, accent border
        assert_eq!(out.get_pixel(40, 40), &Rgba([255, 255, 255, 255]));
        let border = out.get_pixel(36, 40);
        assert!(border[2] > border[0]);
    }
}
