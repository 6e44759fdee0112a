//! Per-tool pointer gesture state machine
//!
//! Drag tools keep a live candidate in the store while the pointer moves
//! and re-commit it as a single `Add` on release. Select gestures work from
//! copies taken at pointer-down so repeated drags never accumulate error.

use crate::domain::{
    Annotation, AnnotationId, AnnotationKind, ArrowAnnotation, BlurAnnotation, CounterAnnotation,
    EllipseAnnotation, FontSpec, Handle, HandleHit, HighlighterAnnotation, LineAnnotation,
    Modifiers, PencilAnnotation, PixelateAnnotation, Point, RectangleAnnotation,
    SpotlightAnnotation, StrokeStyle, StylePalette, TextAnnotation, Tool,
};
use crate::render::LiveOverlay;
use crate::session::state::CanvasState;

use super::crop::crop_annotation;
use super::history::{Command, Snapshot};
use super::selection::{Marquee, handle_layout, topmost_at};
use super::transform::{
    editable_frame, frame_from_points, rect_for_resize, resize, rotate, sample_source_for,
    translate,
};

#[derive(Clone, Debug, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Drag tool pressed, no usable candidate yet
    Pressed { tool: Tool, start: Point },
    /// Drag tool with a live candidate in the store
    Dragging {
        tool: Tool,
        start: Point,
        live: AnnotationId,
    },
    Sketching {
        points: Vec<Point>,
        live: Option<AnnotationId>,
    },
    /// Click tool committed on press; reported on release
    Placed { id: AnnotationId },
    Cropping {
        before: Box<Snapshot>,
        start: Point,
    },
    Moving {
        before: Box<Snapshot>,
        origin: Point,
        originals: Vec<Annotation>,
    },
    Resizing {
        handle: Handle,
        original: Annotation,
    },
    Rotating {
        original: Annotation,
        center: Point,
        start_angle: f32,
    },
    Marquee(Marquee),
}

/// Pointer gesture interpreter for the active tool
#[derive(Clone, Debug, Default)]
pub struct ToolManager {
    gesture: Gesture,
}

fn stroke(palette: &StylePalette) -> StrokeStyle {
    StrokeStyle {
        color: palette.stroke_color,
        width: palette.stroke_width,
        dashed: palette.dashed,
    }
}

fn angle_degrees(center: Point, point: Point) -> f32 {
    (point.y - center.y).atan2(point.x - center.x).to_degrees()
}

/// Candidate shape for a drag from `start` to `current`
///
/// `None` for zero-area frames and zero-length lines.
fn drag_candidate(
    tool: Tool,
    start: Point,
    current: Point,
    canvas: &CanvasState,
) -> Option<AnnotationKind> {
    let palette = &canvas.palette;
    let frame = frame_from_points(start, current);
    let has_area = frame.width > 0.0 && frame.height > 0.0;
    let has_length = start != current;
    let fill = palette.fill_enabled.then_some(palette.fill_color);

    let kind = match tool {
        Tool::Rectangle if has_area => AnnotationKind::Rectangle(RectangleAnnotation {
            frame,
            rotation: 0.0,
            stroke: stroke(palette),
            fill,
            corner_radius: palette.corner_radius,
        }),
        Tool::Ellipse if has_area => AnnotationKind::Ellipse(EllipseAnnotation {
            frame,
            rotation: 0.0,
            stroke: stroke(palette),
            fill,
        }),
        Tool::Line if has_length => AnnotationKind::Line(LineAnnotation {
            start,
            end: current,
            stroke: stroke(palette),
        }),
        Tool::Arrow if has_length => AnnotationKind::Arrow(ArrowAnnotation {
            start,
            end: current,
            stroke: stroke(palette),
            head: palette.arrow_head,
        }),
        Tool::Highlighter if has_length => AnnotationKind::Highlighter(HighlighterAnnotation {
            start,
            end: current,
            color: palette.highlighter_color,
            width: palette.highlighter_width,
        }),
        Tool::Blur if has_area => AnnotationKind::Blur(BlurAnnotation {
            frame,
            radius: palette.blur_radius,
            source: sample_source_for(&frame, canvas.store.base_image()),
        }),
        Tool::Pixelate if has_area => AnnotationKind::Pixelate(PixelateAnnotation {
            frame,
            block_size: palette.pixel_block_size,
            source: sample_source_for(&frame, canvas.store.base_image()),
        }),
        Tool::Spotlight if has_area => AnnotationKind::Spotlight(SpotlightAnnotation {
            frame,
            dim: palette.spotlight_dim,
        }),
        _ => return None,
    };
    Some(kind)
}

fn pencil_candidate(points: &[Point], palette: &StylePalette) -> Option<AnnotationKind> {
    let first = points.first()?;
    if points.iter().all(|p| p == first) {
        return None;
    }
    Some(AnnotationKind::Pencil(PencilAnnotation {
        points: points.to_vec(),
        stroke: stroke(palette),
    }))
}

fn text_at(point: Point, canvas: &CanvasState) -> AnnotationKind {
    let palette = &canvas.palette;
    let font = FontSpec {
        name: palette.font_name.clone(),
        size: palette.font_size,
        bold: palette.bold,
        italic: palette.italic,
    };
    let text = palette.default_text.clone();
    let size = canvas.measure_text(&text, &font);
    AnnotationKind::Text(TextAnnotation {
        position: point,
        size,
        rotation: 0.0,
        text,
        font,
        color: palette.stroke_color,
        background: palette.text_background_color(),
    })
}

fn counter_at(point: Point, canvas: &CanvasState) -> AnnotationKind {
    let value = canvas
        .store
        .iter()
        .filter_map(|a| match &a.kind {
            AnnotationKind::Counter(c) => Some(c.value),
            _ => None,
        })
        .max()
        .map_or(1, |v| v.saturating_add(1));
    AnnotationKind::Counter(CounterAnnotation {
        center: point,
        radius: canvas.palette.counter_radius,
        value,
        style: canvas.palette.counter_style,
        color: canvas.palette.stroke_color,
    })
}

/// Put `kind` into the store under `live`, allocating an id on first use
fn place_live(
    canvas: &mut CanvasState,
    live: Option<AnnotationId>,
    kind: AnnotationKind,
) -> AnnotationId {
    match live.and_then(|id| canvas.store.get(id)) {
        Some(existing) => {
            let updated = Annotation { kind, ..existing.clone() };
            let id = updated.id;
            canvas.store.replace(updated);
            id
        }
        None => {
            let annotation = canvas.store.prepare(kind);
            let id = annotation.id;
            canvas.store.add(annotation);
            canvas.selection.select_only(id);
            id
        }
    }
}

/// Take the live candidate out and re-add it through the committing path
fn commit_live(canvas: &mut CanvasState, live: AnnotationId) -> Option<AnnotationId> {
    let annotation = canvas.store.remove(live)?;
    canvas.selection.prune(&canvas.store);
    canvas.commit_add(annotation)
}

fn drop_live(canvas: &mut CanvasState, live: AnnotationId) {
    canvas.store.remove(live);
    canvas.selection.prune(&canvas.store);
}

impl ToolManager {
    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    pub fn pointer_down(&mut self, canvas: &mut CanvasState, point: Point, tool: Tool) {
        self.pointer_down_with_modifiers(canvas, point, tool, Modifiers::NONE);
    }

    pub fn pointer_down_with_modifiers(
        &mut self,
        canvas: &mut CanvasState,
        point: Point,
        tool: Tool,
        modifiers: Modifiers,
    ) {
        if !point.is_finite() {
            return;
        }
        if !self.is_idle() {
            log::debug!("Pointer down during a gesture, cancelling it");
            self.cancel(canvas);
        }
        self.gesture = match tool {
            Tool::Select => Self::begin_select(canvas, point, modifiers),
            Tool::Pencil => Gesture::Sketching {
                points: vec![point],
                live: None,
            },
            Tool::Crop => Gesture::Cropping {
                before: Box::new(canvas.snapshot()),
                start: point,
            },
            tool if tool.is_click_tool() => {
                let kind = if tool == Tool::Text {
                    text_at(point, canvas)
                } else {
                    counter_at(point, canvas)
                };
                let annotation = canvas.store.prepare(kind);
                match canvas.commit_add(annotation) {
                    Some(id) => Gesture::Placed { id },
                    None => Gesture::Idle,
                }
            }
            tool if tool.is_drag_tool() => Gesture::Pressed { tool, start: point },
            _ => Gesture::Idle,
        };
    }

    fn begin_select(canvas: &mut CanvasState, point: Point, modifiers: Modifiers) -> Gesture {
        if !modifiers.additive
            && let Some(layout) = handle_layout(&canvas.store, &canvas.selection)
            && let Some(hit) = layout.hit(point)
            && let Some(original) = canvas.store.get(layout.target).cloned()
        {
            return match hit {
                HandleHit::Resize(handle) => Gesture::Resizing { handle, original },
                HandleHit::Rotate(_) => {
                    let center = editable_frame(&original).center();
                    Gesture::Rotating {
                        original,
                        center,
                        start_angle: angle_degrees(center, point),
                    }
                }
            };
        }

        let Some(id) = topmost_at(&canvas.store, point) else {
            return Gesture::Marquee(Marquee::begin(point, &canvas.selection, modifiers.additive));
        };
        if modifiers.additive {
            canvas.selection.toggle(id);
            return Gesture::Idle;
        }
        if !canvas.selection.contains(id) {
            canvas.selection.select_only(id);
        }
        Gesture::Moving {
            before: Box::new(canvas.snapshot()),
            origin: point,
            originals: canvas.selected_annotations(),
        }
    }

    pub fn pointer_dragged(&mut self, canvas: &mut CanvasState, point: Point) {
        if !point.is_finite() {
            return;
        }
        match &mut self.gesture {
            Gesture::Idle | Gesture::Placed { .. } => {}
            Gesture::Pressed { tool, start } => {
                let (tool, start) = (*tool, *start);
                if let Some(kind) = drag_candidate(tool, start, point, canvas) {
                    let live = place_live(canvas, None, kind);
                    self.gesture = Gesture::Dragging { tool, start, live };
                }
            }
            Gesture::Dragging { tool, start, live } => {
                let (tool, start, id) = (*tool, *start, *live);
                match drag_candidate(tool, start, point, canvas) {
                    Some(kind) => {
                        place_live(canvas, Some(id), kind);
                    }
                    None => {
                        drop_live(canvas, id);
                        self.gesture = Gesture::Pressed { tool, start };
                    }
                }
            }
            Gesture::Sketching { points, live } => {
                if points.last() == Some(&point) {
                    return;
                }
                points.push(point);
                if let Some(kind) = pencil_candidate(points, &canvas.palette) {
                    *live = Some(place_live(canvas, *live, kind));
                }
            }
            Gesture::Cropping { start, .. } => {
                let frame = frame_from_points(*start, point);
                if frame.width > 0.0 && frame.height > 0.0 {
                    let crop = crop_annotation(&mut canvas.store, frame);
                    canvas.store.replace(crop);
                }
            }
            Gesture::Moving {
                origin, originals, ..
            } => {
                let delta = point.delta_from(*origin);
                for original in originals.iter() {
                    if let Some(moved) = translate(original, delta) {
                        canvas.store.replace(moved);
                    }
                }
            }
            Gesture::Resizing { handle, original } => {
                let from = editable_frame(original);
                let to = rect_for_resize(*handle, &from, point);
                // below the minimum size the last valid shape stays
                if let Some(resized) = resize(original, &from, &to) {
                    canvas.store.replace(resized);
                }
            }
            Gesture::Rotating {
                original,
                center,
                start_angle,
            } => {
                let turn = angle_degrees(*center, point) - *start_angle;
                if let Some(rotated) = rotate(original, original.rotation() + turn) {
                    canvas.store.replace(rotated);
                }
            }
            Gesture::Marquee(marquee) => {
                marquee.update(point, &canvas.store, &mut canvas.selection);
            }
        }
    }

    /// Finish the gesture; returns the id of a newly committed annotation
    pub fn pointer_up(&mut self, canvas: &mut CanvasState, point: Point) -> Option<AnnotationId> {
        if point.is_finite() {
            self.pointer_dragged(canvas, point);
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Pressed { .. } => None,
            Gesture::Placed { id } => Some(id),
            Gesture::Dragging { live, .. } => commit_live(canvas, live),
            Gesture::Sketching { live, .. } => live.and_then(|id| commit_live(canvas, id)),
            Gesture::Cropping { before, .. } => {
                canvas.commit_snapshot(*before);
                None
            }
            Gesture::Moving {
                before, originals, ..
            } => {
                match originals.as_slice() {
                    [single] => {
                        if let Some(current) = canvas.store.get(single.id).cloned()
                            && current != *single
                        {
                            canvas.history.record(Command::Modify {
                                old: single.clone(),
                                new: current,
                            });
                        }
                    }
                    _ => {
                        canvas.commit_snapshot(*before);
                    }
                }
                None
            }
            Gesture::Resizing { original, .. } | Gesture::Rotating { original, .. } => {
                if let Some(current) = canvas.store.get(original.id).cloned()
                    && current != original
                {
                    canvas.history.record(Command::Modify {
                        old: original,
                        new: current,
                    });
                }
                None
            }
            Gesture::Marquee(marquee) => {
                marquee.finish(point, &canvas.store, &mut canvas.selection);
                None
            }
        }
    }

    /// Abandon the gesture without recording anything
    pub fn cancel(&mut self, canvas: &mut CanvasState) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Pressed { .. } | Gesture::Placed { .. } => {}
            Gesture::Marquee(_) => {}
            Gesture::Dragging { live, .. } => drop_live(canvas, live),
            Gesture::Sketching { live, .. } => {
                if let Some(live) = live {
                    drop_live(canvas, live);
                }
            }
            Gesture::Cropping { before, .. } | Gesture::Moving { before, .. } => {
                canvas.store.restore(&before);
                canvas.selection = before.selection.clone();
            }
            Gesture::Resizing { original, .. } | Gesture::Rotating { original, .. } => {
                canvas.store.replace(original);
            }
        }
    }

    /// Transient chrome for the live preview
    pub fn overlay(&self, tool: Tool) -> LiveOverlay {
        let marquee = match &self.gesture {
            Gesture::Marquee(m) if m.is_dragging() => Some(m.rect()),
            _ => None,
        };
        LiveOverlay {
            marquee,
            crop_tool_active: tool == Tool::Crop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::image::BaseImage;
    use crate::domain::{Rect, StyleChange};
    use image::{Rgba, RgbaImage};

    fn canvas() -> CanvasState {
        CanvasState::new(BaseImage::new(RgbaImage::from_pixel(
            200,
            200,
            Rgba([255, 255, 255, 255]),
        )))
    }

    fn drag(
        tm: &mut ToolManager,
        c: &mut CanvasState,
        tool: Tool,
        from: Point,
        to: Point,
    ) -> Option<AnnotationId> {
        tm.pointer_down(c, from, tool);
        let mid = Point::new((from.x + to.x) * 0.5, (from.y + to.y) * 0.5);
        tm.pointer_dragged(c, mid);
        tm.pointer_dragged(c, to);
        tm.pointer_up(c, to)
    }

    #[test]
    fn test_rectangle_gesture_commits_and_selects() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        tm.pointer_down(&mut c, Point::new(10.0, 10.0), Tool::Rectangle);
        tm.pointer_dragged(&mut c, Point::new(30.0, 30.0));
        let id = tm.pointer_up(&mut c, Point::new(30.0, 30.0)).unwrap();

        assert_eq!(c.selection.active(), Some(id));
        assert!(c.store.contains(id));
        assert_eq!(c.store.len(), 1);
        assert_eq!(c.history.undo_depth(), 1);
        let frame = editable_frame(c.store.get(id).unwrap());
        assert!(frame.approx_eq(&Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!(tm.is_idle());

        assert!(c.undo());
        assert!(c.store.is_empty());
        assert!(c.selection.is_empty());
    }

    #[test]
    fn test_zero_area_drag_produces_nothing() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        let p = Point::new(10.0, 10.0);
        assert!(drag(&mut tm, &mut c, Tool::Ellipse, p, Point::new(40.0, 10.0)).is_none());
        assert!(drag(&mut tm, &mut c, Tool::Arrow, p, p).is_none());
        assert!(c.store.is_empty());
        assert!(!c.can_undo());
    }

    #[test]
    fn test_candidate_collapsing_back_removes_live() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        tm.pointer_down(&mut c, Point::new(10.0, 10.0), Tool::Rectangle);
        tm.pointer_dragged(&mut c, Point::new(50.0, 50.0));
        assert_eq!(c.store.len(), 1);
        tm.pointer_dragged(&mut c, Point::new(50.0, 10.0));
        assert!(c.store.is_empty());
        assert!(tm.pointer_up(&mut c, Point::new(50.0, 10.0)).is_none());
        assert!(!c.can_undo());
    }

    #[test]
    fn test_pencil_collects_points() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        tm.pointer_down(&mut c, Point::new(0.0, 0.0), Tool::Pencil);
        tm.pointer_dragged(&mut c, Point::new(5.0, 5.0));
        tm.pointer_dragged(&mut c, Point::new(5.0, 5.0));
        tm.pointer_dragged(&mut c, Point::new(10.0, 0.0));
        let id = tm.pointer_up(&mut c, Point::new(12.0, 3.0)).unwrap();
        assert_eq!(c.store.get(id).unwrap().points().len(), 4);
        assert_eq!(c.history.undo_depth(), 1);

        // a click without motion draws nothing
        tm.pointer_down(&mut c, Point::new(50.0, 50.0), Tool::Pencil);
        assert!(tm.pointer_up(&mut c, Point::new(50.0, 50.0)).is_none());
        assert_eq!(c.store.len(), 1);
    }

    #[test]
    fn test_click_tools_commit_on_press() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        tm.pointer_down(&mut c, Point::new(20.0, 20.0), Tool::Counter);
        assert_eq!(c.store.len(), 1);
        let first = tm.pointer_up(&mut c, Point::new(20.0, 20.0)).unwrap();
        tm.pointer_down(&mut c, Point::new(60.0, 20.0), Tool::Counter);
        let second = tm.pointer_up(&mut c, Point::new(60.0, 20.0)).unwrap();
        let value = |id| match &c.store.get(id).unwrap().kind {
            AnnotationKind::Counter(counter) => counter.value,
            _ => 0,
        };
        assert_eq!((value(first), value(second)), (1, 2));

        tm.pointer_down(&mut c, Point::new(100.0, 100.0), Tool::Text);
        let text = tm.pointer_up(&mut c, Point::new(100.0, 100.0)).unwrap();
        let AnnotationKind::Text(t) = &c.store.get(text).unwrap().kind else {
            panic!("not text");
        };
        assert_eq!(t.text, c.palette.default_text);
        assert!(t.size.width > 0.0);
        assert_eq!(c.selection.single(), Some(text));
        assert_eq!(c.history.undo_depth(), 3);
    }

    #[test]
    fn test_text_background_matches_restyle() {
        let background = |c: &CanvasState, id| match &c.store.get(id).unwrap().kind {
            AnnotationKind::Text(t) => t.background,
            _ => None,
        };
        let mut c = canvas();
        let mut tm = ToolManager::default();
        c.apply_style(&StyleChange::TextBackground(true));
        tm.pointer_down(&mut c, Point::new(40.0, 40.0), Tool::Text);
        let id = tm.pointer_up(&mut c, Point::new(40.0, 40.0)).unwrap();
        let placed = background(&c, id);
        assert_eq!(placed, Some(c.palette.fill_color));

        assert!(c.apply_style(&StyleChange::TextBackground(false)));
        assert_eq!(background(&c, id), None);
        assert!(c.apply_style(&StyleChange::TextBackground(true)));
        assert_eq!(background(&c, id), placed);
    }

    #[test]
    fn test_select_move_records_one_modify() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        let id = drag(
            &mut tm,
            &mut c,
            Tool::Rectangle,
            Point::new(10.0, 10.0),
            Point::new(50.0, 50.0),
        )
        .unwrap();
        c.clear_selection();

        drag(&mut tm, &mut c, Tool::Select, Point::new(30.0, 30.0), Point::new(40.0, 35.0));
        let frame = editable_frame(c.store.get(id).unwrap());
        assert!(frame.approx_eq(&Rect::new(20.0, 15.0, 40.0, 40.0)));
        assert_eq!(c.selection.single(), Some(id));
        assert_eq!(c.history.undo_depth(), 2);

        assert!(c.undo());
        let frame = editable_frame(c.store.get(id).unwrap());
        assert!(frame.approx_eq(&Rect::new(10.0, 10.0, 40.0, 40.0)));
    }

    #[test]
    fn test_select_click_without_motion_records_nothing() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        let id = drag(
            &mut tm,
            &mut c,
            Tool::Rectangle,
            Point::new(10.0, 10.0),
            Point::new(50.0, 50.0),
        )
        .unwrap();
        c.clear_selection();
        tm.pointer_down(&mut c, Point::new(30.0, 30.0), Tool::Select);
        tm.pointer_up(&mut c, Point::new(30.0, 30.0));
        assert_eq!(c.selection.single(), Some(id));
        assert_eq!(c.history.undo_depth(), 1);
    }

    #[test]
    fn test_resize_through_handle() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        let id = drag(
            &mut tm,
            &mut c,
            Tool::Rectangle,
            Point::new(10.0, 10.0),
            Point::new(50.0, 50.0),
        )
        .unwrap();
        // south-east handle of the selected rectangle
        drag(&mut tm, &mut c, Tool::Select, Point::new(50.0, 50.0), Point::new(80.0, 70.0));
        let frame = editable_frame(c.store.get(id).unwrap());
        assert!(frame.approx_eq(&Rect::new(10.0, 10.0, 70.0, 60.0)));

        // shrinking below the minimum keeps the last valid frame
        drag(&mut tm, &mut c, Tool::Select, Point::new(80.0, 70.0), Point::new(12.0, 12.0));
        let frame = editable_frame(c.store.get(id).unwrap());
        assert!(frame.width >= 8.0 && frame.height >= 8.0);
    }

    #[test]
    fn test_rotate_through_hotspot() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        let id = drag(
            &mut tm,
            &mut c,
            Tool::Rectangle,
            Point::new(50.0, 50.0),
            Point::new(90.0, 90.0),
        )
        .unwrap();
        // north-east rotation hotspot, swept a quarter turn clockwise
        tm.pointer_down(&mut c, Point::new(106.0, 34.0), Tool::Select);
        tm.pointer_dragged(&mut c, Point::new(106.0, 106.0));
        tm.pointer_up(&mut c, Point::new(106.0, 106.0));
        let rotation = c.store.get(id).unwrap().rotation();
        assert!((rotation - 90.0).abs() < 1e-3);
        assert_eq!(c.history.undo_depth(), 2);
    }

    #[test]
    fn test_marquee_selects_and_reports_overlay() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        let a = drag(
            &mut tm,
            &mut c,
            Tool::Rectangle,
            Point::new(10.0, 10.0),
            Point::new(20.0, 20.0),
        )
        .unwrap();
        let b = drag(
            &mut tm,
            &mut c,
            Tool::Rectangle,
            Point::new(40.0, 40.0),
            Point::new(50.0, 50.0),
        )
        .unwrap();
        c.clear_selection();

        tm.pointer_down(&mut c, Point::new(100.0, 100.0), Tool::Select);
        tm.pointer_dragged(&mut c, Point::new(5.0, 5.0));
        assert!(tm.overlay(Tool::Select).marquee.is_some());
        tm.pointer_up(&mut c, Point::new(5.0, 5.0));
        assert!(c.selection.contains(a) && c.selection.contains(b));
        assert!(tm.overlay(Tool::Select).marquee.is_none());
    }

    #[test]
    fn test_repeated_crop_drag_is_not_recorded_twice() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        let from = Point::new(20.0, 20.0);
        let to = Point::new(120.0, 90.0);
        assert!(drag(&mut tm, &mut c, Tool::Crop, from, to).is_none());
        assert!(c.store.crop().is_some());
        let depth = c.history.undo_depth();
        assert_eq!(depth, 1);

        drag(&mut tm, &mut c, Tool::Crop, from, to);
        assert_eq!(c.history.undo_depth(), depth);
        assert_eq!(c.store.len(), 1);

        // a click with the crop tool changes nothing either
        tm.pointer_down(&mut c, from, Tool::Crop);
        tm.pointer_up(&mut c, from);
        assert_eq!(c.history.undo_depth(), depth);
        assert!(tm.overlay(Tool::Crop).crop_tool_active);
    }

    #[test]
    fn test_blur_drag_keeps_one_cached_filter_result() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        tm.pointer_down(&mut c, Point::new(10.0, 10.0), Tool::Blur);
        for step in 1..=50 {
            let at = Point::new(20.0 + step as f32, 20.0 + step as f32);
            tm.pointer_dragged(&mut c, at);
            assert!(c.render_live(&tm.overlay(Tool::Blur)).is_some());
            assert!(c.effects.len() <= 1);
        }
        let id = tm.pointer_up(&mut c, Point::new(70.0, 70.0)).unwrap();
        assert!(c.render_final().is_some());
        assert_eq!(c.effects.len(), 1);

        assert_eq!(c.selection.single(), Some(id));
        assert_eq!(c.delete_selection(), 1);
        assert!(c.render_final().is_some());
        assert!(c.effects.is_empty());
    }

    #[test]
    fn test_cancel_restores_gesture_start() {
        let mut c = canvas();
        let mut tm = ToolManager::default();
        let id = drag(
            &mut tm,
            &mut c,
            Tool::Rectangle,
            Point::new(10.0, 10.0),
            Point::new(50.0, 50.0),
        )
        .unwrap();
        let before = c.store.get(id).cloned();
        tm.pointer_down(&mut c, Point::new(30.0, 30.0), Tool::Select);
        tm.pointer_dragged(&mut c, Point::new(90.0, 90.0));
        tm.cancel(&mut c);
        assert_eq!(c.store.get(id).cloned(), before);

        tm.pointer_down(&mut c, Point::new(100.0, 100.0), Tool::Ellipse);
        tm.pointer_dragged(&mut c, Point::new(150.0, 150.0));
        assert_eq!(c.store.len(), 2);
        tm.cancel(&mut c);
        assert_eq!(c.store.len(), 1);
        assert_eq!(c.history.undo_depth(), 1);
    }
}
