//! Selection state, hit-testing, marquee selection and handle placement

use std::collections::BTreeSet;

use crate::domain::{Annotation, AnnotationId, AnnotationKind, Handle, HandleHit, Point, Rect};

use super::store::AnnotationStore;
use super::transform::{editable_frame, supports_resize, supports_rotation};

/// Extra tolerance around thin strokes when hit-testing
pub const HIT_SLOP: f32 = 4.0;
/// Marquee drags shorter than this are treated as clicks
pub const MARQUEE_CLICK_THRESHOLD: f32 = 3.0;
/// Side length of a resize handle hotspot
pub const HANDLE_SIZE: f32 = 8.0;
/// Diagonal distance of rotation hotspots outside the frame corners
pub const ROTATION_HANDLE_OFFSET: f32 = 16.0;

/// Active annotation plus the multi-selection set
///
/// The active id, when set, is always a member of the set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    active: Option<AnnotationId>,
    members: BTreeSet<AnnotationId>,
}

impl Selection {
    pub fn active(&self) -> Option<AnnotationId> {
        self.active
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.members.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = AnnotationId> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The selected id when exactly one annotation is selected
    pub fn single(&self) -> Option<AnnotationId> {
        if self.members.len() == 1 {
            self.active
        } else {
            None
        }
    }

    /// Plain click: `id` becomes the active id and the only member
    pub fn select_only(&mut self, id: AnnotationId) {
        self.members.clear();
        self.members.insert(id);
        self.active = Some(id);
    }

    /// Modifier click: flip membership of `id`, keeping the others
    pub fn toggle(&mut self, id: AnnotationId) {
        if self.members.remove(&id) {
            if self.active == Some(id) {
                self.active = self.members.iter().next().copied();
            }
        } else {
            self.members.insert(id);
            self.active = Some(id);
        }
    }

    /// Replace the member set, keeping the active id when it survives
    pub fn set_members(&mut self, members: BTreeSet<AnnotationId>) {
        self.members = members;
        if !self.active.is_some_and(|id| self.members.contains(&id)) {
            self.active = self.members.iter().next().copied();
        }
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.active = None;
    }

    /// Drop identifiers no longer present in `store`
    pub fn prune(&mut self, store: &AnnotationStore) {
        self.members.retain(|id| store.contains(*id));
        if !self.active.is_some_and(|id| self.members.contains(&id)) {
            self.active = self.members.iter().next().copied();
        }
    }

    pub fn members(&self) -> &BTreeSet<AnnotationId> {
        &self.members
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Whether `point` touches the annotation
pub fn hit_test(annotation: &Annotation, point: Point) -> bool {
    if annotation.is_line_like() {
        let points = annotation.points();
        let tolerance = annotation.half_stroke() + HIT_SLOP;
        return match points.as_slice() {
            [] => false,
            [only] => only.distance(point) <= tolerance,
            _ => points
                .windows(2)
                .any(|w| distance_to_segment(point, w[0], w[1]) <= tolerance),
        };
    }
    let frame = editable_frame(annotation);
    let rotation = annotation.rotation();
    let local = if rotation != 0.0 {
        point.rotated_around(frame.center(), -rotation)
    } else {
        point
    };
    match &annotation.kind {
        AnnotationKind::Counter(c) => c.center.distance(point) <= c.radius + HIT_SLOP,
        _ => frame.outset(annotation.half_stroke()).contains(local),
    }
}

/// Topmost visible annotation under `point`
///
/// The crop region is never picked; it is edited through the crop tool.
pub fn topmost_at(store: &AnnotationStore, point: Point) -> Option<AnnotationId> {
    store
        .iter_topmost()
        .filter(|a| a.visible && !a.is_crop())
        .find(|a| hit_test(a, point))
        .map(|a| a.id)
}

/// Visible annotations whose editable frame intersects `region`
pub fn intersecting(store: &AnnotationStore, region: &Rect) -> BTreeSet<AnnotationId> {
    let region = region.standardized();
    store
        .iter()
        .filter(|a| a.visible && !a.is_crop())
        .filter(|a| editable_frame(a).intersects(&region))
        .map(|a| a.id)
        .collect()
}

/// Rubber-band selection in progress
#[derive(Clone, Debug, PartialEq)]
pub struct Marquee {
    origin: Point,
    current: Point,
    base: BTreeSet<AnnotationId>,
    additive: bool,
    dragged: bool,
}

impl Marquee {
    /// Start over empty canvas; additive marquees extend the current selection
    pub fn begin(origin: Point, selection: &Selection, additive: bool) -> Self {
        let base = if additive {
            selection.members().clone()
        } else {
            BTreeSet::new()
        };
        Self {
            origin,
            current: origin,
            base,
            additive,
            dragged: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_points(self.origin, self.current)
    }

    /// Whether the pointer has travelled past the click threshold
    pub fn is_dragging(&self) -> bool {
        self.dragged
    }

    pub fn update(&mut self, point: Point, store: &AnnotationStore, selection: &mut Selection) {
        self.current = point;
        if self.origin.distance(point) > MARQUEE_CLICK_THRESHOLD {
            self.dragged = true;
        }
        if self.dragged {
            let mut members = self.base.clone();
            members.extend(intersecting(store, &self.rect()));
            selection.set_members(members);
        }
    }

    /// Finalize; a gesture that never left the click threshold acts as a click
    pub fn finish(mut self, point: Point, store: &AnnotationStore, selection: &mut Selection) {
        self.update(point, store, selection);
        if self.dragged {
            return;
        }
        match topmost_at(store, self.origin) {
            Some(id) if self.additive => selection.toggle(id),
            Some(id) => selection.select_only(id),
            None if self.additive => {}
            None => selection.clear(),
        }
    }
}

/// Handle hotspots for a single selected annotation
#[derive(Clone, Debug, PartialEq)]
pub struct HandleLayout {
    pub target: AnnotationId,
    pub frame: Rect,
    pub resize: Vec<(Handle, Rect)>,
    pub rotate: Vec<(Handle, Rect)>,
}

impl HandleLayout {
    /// Probe resize hotspots first, then rotation hotspots
    pub fn hit(&self, point: Point) -> Option<HandleHit> {
        if let Some((handle, _)) = self.resize.iter().find(|(_, r)| r.contains(point)) {
            return Some(HandleHit::Resize(*handle));
        }
        self.rotate
            .iter()
            .find(|(_, r)| r.contains(point))
            .map(|(handle, _)| HandleHit::Rotate(*handle))
    }
}

fn hotspot(center: Point, size: f32) -> Rect {
    Rect::new(center.x - size * 0.5, center.y - size * 0.5, size, size)
}

/// Handle layout, present only for exactly one capability-flagged selection
pub fn handle_layout(store: &AnnotationStore, selection: &Selection) -> Option<HandleLayout> {
    let id = selection.single()?;
    let annotation = store.get(id)?;
    let can_resize = supports_resize(annotation);
    let can_rotate = supports_rotation(annotation);
    if !can_resize && !can_rotate {
        return None;
    }
    let frame = editable_frame(annotation);
    let resize = if can_resize {
        Handle::ALL
            .iter()
            .map(|h| (*h, hotspot(h.anchor(&frame), HANDLE_SIZE)))
            .collect()
    } else {
        Vec::new()
    };
    let rotate = if can_rotate {
        let o = ROTATION_HANDLE_OFFSET;
        [
            (Handle::NW, Point::new(-o, -o)),
            (Handle::NE, Point::new(o, -o)),
            (Handle::SE, Point::new(o, o)),
            (Handle::SW, Point::new(-o, o)),
        ]
        .into_iter()
        .map(|(h, offset)| (h, hotspot(h.anchor(&frame).offset(offset), HANDLE_SIZE * 1.5)))
        .collect()
    } else {
        Vec::new()
    };
    Some(HandleLayout {
        target: id,
        frame,
        resize,
        rotate,
    })
}
