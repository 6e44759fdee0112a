//! Annotation store: base image plus the annotation arena
//!
//! Annotations live in a map keyed by identifier; `order` is the separately
//! maintained back-to-front index (ascending z, ties in insertion order).
//! The store never records undo history: callers batch low-level writes and
//! record one command per user-visible action.

use std::collections::HashMap;

use crate::capture::image::BaseImage;
use crate::domain::{Annotation, AnnotationId, AnnotationKind, Rect};

use super::history::Snapshot;

#[derive(Clone, Debug)]
pub struct AnnotationStore {
    base: BaseImage,
    records: HashMap<AnnotationId, Annotation>,
    order: Vec<AnnotationId>,
    next_id: AnnotationId,
}

impl AnnotationStore {
    pub fn new(base: BaseImage) -> Self {
        Self {
            base,
            records: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    /// Empty store over `base` that continues this store's id sequence
    pub fn empty_with_base(&self, base: BaseImage) -> Self {
        Self {
            next_id: self.next_id,
            ..Self::new(base)
        }
    }

    pub fn base_image(&self) -> &BaseImage {
        &self.base
    }

    pub fn set_base_image(&mut self, base: BaseImage) {
        self.base = base;
    }

    pub fn image_bounds(&self) -> Rect {
        self.base.bounds()
    }

    /// Allocate a fresh identifier
    pub fn next_id(&mut self) -> AnnotationId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// The identifier the next allocation will return
    pub fn peek_next_id(&self) -> AnnotationId {
        self.next_id
    }

    /// z-order that places a new annotation above everything present
    pub fn next_z(&self) -> i64 {
        self.max_z().map_or(0, |z| z.saturating_add(1))
    }

    pub fn max_z(&self) -> Option<i64> {
        self.order.last().and_then(|id| self.records.get(id)).map(|a| a.z)
    }

    /// Wrap `kind` with a fresh id on top of the current z-order
    pub fn prepare(&mut self, kind: AnnotationKind) -> Annotation {
        let z = self.next_z();
        let id = self.next_id();
        Annotation::new(id, z, kind)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.records.get(&id)
    }

    /// Annotations back-to-front
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Annotation> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Annotations front-to-back (hit-test order)
    pub fn iter_topmost(&self) -> impl Iterator<Item = &Annotation> + '_ {
        self.iter().rev()
    }

    pub fn ids(&self) -> Vec<AnnotationId> {
        self.order.clone()
    }

    /// The pending crop annotation, if any
    pub fn crop(&self) -> Option<&Annotation> {
        self.iter().find(|a| a.is_crop())
    }

    /// Insert an annotation
    ///
    /// Rejects duplicate identifiers. Adding a crop prunes any older crop.
    pub fn add(&mut self, annotation: Annotation) -> bool {
        if self.records.contains_key(&annotation.id) {
            log::debug!("Rejecting duplicate annotation id {}", annotation.id);
            return false;
        }
        if annotation.is_crop() {
            let stale: Vec<AnnotationId> = self
                .iter()
                .filter(|a| a.is_crop())
                .map(|a| a.id)
                .collect();
            for id in stale {
                self.remove(id);
            }
        }
        if annotation.id >= self.next_id {
            self.next_id = annotation.id.saturating_add(1);
        }
        let id = annotation.id;
        let position = self.insert_position(annotation.z);
        self.order.insert(position, id);
        self.records.insert(id, annotation);
        true
    }

    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let removed = self.records.remove(&id)?;
        self.order.retain(|other| *other != id);
        Some(removed)
    }

    /// Overwrite the annotation with the same identifier, or append it
    pub fn replace(&mut self, annotation: Annotation) {
        match self.records.get(&annotation.id) {
            Some(existing) if existing.z == annotation.z => {
                self.records.insert(annotation.id, annotation);
            }
            Some(_) => {
                self.remove(annotation.id);
                self.add(annotation);
            }
            None => {
                self.add(annotation);
            }
        }
    }

    /// Move an annotation above every other one
    pub fn bring_to_front(&mut self, id: AnnotationId) -> bool {
        if !self.records.contains_key(&id) {
            return false;
        }
        let top = self
            .iter()
            .filter(|a| a.id != id)
            .map(|a| a.z)
            .max();
        let Some(annotation) = self.records.get(&id) else {
            return false;
        };
        // already strictly in front
        let Some(top) = top.filter(|top| annotation.z <= *top) else {
            return false;
        };
        let mut moved = annotation.clone();
        moved.z = top.saturating_add(1);
        self.remove(id);
        self.add(moved);
        true
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
    }

    /// Deep copy of the annotations back-to-front
    pub fn annotations(&self) -> Vec<Annotation> {
        self.iter().cloned().collect()
    }

    /// Replace the whole content with a snapshot's
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.base = snapshot.base.clone();
        self.clear();
        for annotation in &snapshot.annotations {
            self.add(annotation.clone());
        }
        self.next_id = self.next_id.max(snapshot.next_id);
    }

    fn insert_position(&self, z: i64) -> usize {
        self.order
            .iter()
            .position(|id| self.records.get(id).is_some_and(|a| a.z > z))
            .unwrap_or(self.order.len())
    }
}
