//! Undo/redo command history
//!
//! Every user-visible action is recorded as exactly one [`Command`]. Simple
//! edits carry the affected annotation; compound edits (crop, reordering,
//! multi-selection moves) carry full before/after [`Snapshot`]s.

use std::collections::VecDeque;

use crate::capture::image::BaseImage;
use crate::domain::{Annotation, AnnotationId};

use super::selection::Selection;
use super::store::AnnotationStore;

/// Maximum number of undo steps kept
pub const HISTORY_DEPTH: usize = 200;

/// Deep copy of the canvas content at one point in time
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub base: BaseImage,
    /// Annotations back-to-front
    pub annotations: Vec<Annotation>,
    pub selection: Selection,
    pub next_id: AnnotationId,
}

impl Snapshot {
    pub fn capture(store: &AnnotationStore, selection: &Selection) -> Self {
        Self {
            base: store.base_image().clone(),
            annotations: store.annotations(),
            selection: selection.clone(),
            next_id: store.peek_next_id(),
        }
    }

    /// Same image, same geometry and same selection
    ///
    /// The id counter is ignored: a gesture that allocated an id and then
    /// produced identical content is still a no-op.
    pub fn is_equivalent(&self, other: &Snapshot) -> bool {
        self.base == other.base
            && self.annotations == other.annotations
            && self.selection == other.selection
    }
}

#[derive(Clone, Debug)]
pub enum Command {
    Add(Annotation),
    Remove(Annotation),
    Modify { old: Annotation, new: Annotation },
    Snapshot { before: Box<Snapshot>, after: Box<Snapshot> },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Add(_) => "add",
            Command::Remove(_) => "remove",
            Command::Modify { .. } => "modify",
            Command::Snapshot { .. } => "snapshot",
        }
    }

    fn revert(&self, store: &mut AnnotationStore, selection: &mut Selection) {
        match self {
            Command::Add(annotation) => {
                store.remove(annotation.id);
            }
            Command::Remove(annotation) => {
                store.add(annotation.clone());
            }
            Command::Modify { old, .. } => store.replace(old.clone()),
            Command::Snapshot { before, .. } => {
                store.restore(before);
                *selection = before.selection.clone();
            }
        }
        selection.prune(store);
    }

    fn apply(&self, store: &mut AnnotationStore, selection: &mut Selection) {
        match self {
            Command::Add(annotation) => {
                store.add(annotation.clone());
            }
            Command::Remove(annotation) => {
                store.remove(annotation.id);
            }
            Command::Modify { new, .. } => store.replace(new.clone()),
            Command::Snapshot { after, .. } => {
                store.restore(after);
                *selection = after.selection.clone();
            }
        }
        selection.prune(store);
    }
}

/// Bounded undo stack plus redo stack
#[derive(Clone, Debug)]
pub struct UndoManager {
    undo: VecDeque<Command>,
    redo: Vec<Command>,
    depth: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::with_depth(HISTORY_DEPTH)
    }
}

impl UndoManager {
    pub fn with_depth(depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Push a command; clears redo and evicts the oldest beyond the depth
    pub fn record(&mut self, command: Command) {
        log::debug!("Recording {} command", command.name());
        self.undo.push_back(command);
        self.redo.clear();
        while self.undo.len() > self.depth {
            self.undo.pop_front();
        }
    }

    /// Record a compound change unless it is redundant
    ///
    /// Returns `false` when the pair was dropped because `after` matches
    /// `before` or the result of the snapshot already on top of the stack.
    pub fn record_snapshot(&mut self, before: Snapshot, after: Snapshot) -> bool {
        if after.is_equivalent(&before) {
            log::debug!("Dropping no-op snapshot");
            return false;
        }
        if let Some(Command::Snapshot { after: previous, .. }) = self.undo.back() {
            if after.is_equivalent(previous) {
                log::debug!("Dropping snapshot identical to the previous one");
                return false;
            }
        }
        self.record(Command::Snapshot {
            before: Box::new(before),
            after: Box::new(after),
        });
        true
    }

    pub fn undo(&mut self, store: &mut AnnotationStore, selection: &mut Selection) -> bool {
        let Some(command) = self.undo.pop_back() else {
            return false;
        };
        command.revert(store, selection);
        self.redo.push(command);
        true
    }

    pub fn redo(&mut self, store: &mut AnnotationStore, selection: &mut Selection) -> bool {
        let Some(command) = self.redo.pop() else {
            return false;
        };
        command.apply(store, selection);
        self.undo.push_back(command);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnnotationKind, EllipseAnnotation, Rect, StrokeStyle};
    use image::{Rgba, RgbaImage};

    fn store() -> AnnotationStore {
        AnnotationStore::new(BaseImage::new(RgbaImage::from_pixel(
            64,
            64,
            Rgba([0, 0, 0, 255]),
        )))
    }

    fn ellipse(store: &mut AnnotationStore, x: f32) -> Annotation {
        store.prepare(AnnotationKind::Ellipse(EllipseAnnotation {
            frame: Rect::new(x, 0.0, 10.0, 10.0),
            rotation: 0.0,
            stroke: StrokeStyle::default(),
            fill: None,
        }))
    }

    #[test]
    fn test_add_undo_redo() {
        let mut s = store();
        let mut sel = Selection::default();
        let mut history = UndoManager::default();

        let a = ellipse(&mut s, 0.0);
        s.add(a.clone());
        sel.select_only(a.id);
        history.record(Command::Add(a.clone()));

        assert!(history.undo(&mut s, &mut sel));
        assert!(s.is_empty());
        assert!(sel.is_empty());
        assert!(history.can_redo());

        assert!(history.redo(&mut s, &mut sel));
        assert_eq!(s.get(a.id), Some(&a));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_remove_undo_restores_position() {
        let mut s = store();
        let mut sel = Selection::default();
        let mut history = UndoManager::default();
        let a = ellipse(&mut s, 0.0);
        s.add(a.clone());
        let b = ellipse(&mut s, 5.0);
        s.add(b.clone());

        let removed = s.remove(a.id).unwrap();
        history.record(Command::Remove(removed));
        history.undo(&mut s, &mut sel);
        let order: Vec<_> = s.iter().map(|x| x.id).collect();
        assert_eq!(order, vec![a.id, b.id]);
        history.redo(&mut s, &mut sel);
        assert!(!s.contains(a.id));
    }

    #[test]
    fn test_modify_undo_redo() {
        let mut s = store();
        let mut sel = Selection::default();
        let mut history = UndoManager::default();
        let old = ellipse(&mut s, 0.0);
        s.add(old.clone());
        let mut new = old.clone();
        new.visible = false;
        s.replace(new.clone());
        history.record(Command::Modify {
            old: old.clone(),
            new: new.clone(),
        });

        history.undo(&mut s, &mut sel);
        assert_eq!(s.get(old.id), Some(&old));
        history.redo(&mut s, &mut sel);
        assert_eq!(s.get(old.id), Some(&new));
    }

    #[test]
    fn test_snapshot_restores_selection() {
        let mut s = store();
        let mut sel = Selection::default();
        let mut history = UndoManager::default();
        let a = ellipse(&mut s, 0.0);
        s.add(a.clone());
        sel.select_only(a.id);

        let before = Snapshot::capture(&s, &sel);
        s.clear();
        sel.clear();
        let after = Snapshot::capture(&s, &sel);
        assert!(history.record_snapshot(before, after));

        history.undo(&mut s, &mut sel);
        assert_eq!(s.len(), 1);
        assert_eq!(sel.single(), Some(a.id));
        history.redo(&mut s, &mut sel);
        assert!(s.is_empty());
        assert!(sel.is_empty());
    }

    #[test]
    fn test_redundant_snapshots_are_dropped() {
        let mut s = store();
        let sel = Selection::default();
        let mut history = UndoManager::default();

        let same = Snapshot::capture(&s, &sel);
        assert!(!history.record_snapshot(same.clone(), same));
        assert_eq!(history.undo_depth(), 0);

        let before = Snapshot::capture(&s, &sel);
        let a = ellipse(&mut s, 0.0);
        s.add(a);
        let after = Snapshot::capture(&s, &sel);
        assert!(history.record_snapshot(before, after.clone()));
        // a second gesture that lands on the same state again
        assert!(!history.record_snapshot(Snapshot::capture(&s, &sel), after));
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_depth_evicts_oldest() {
        let mut s = store();
        let mut sel = Selection::default();
        let mut history = UndoManager::default();
        for i in 0..(HISTORY_DEPTH + 5) {
            let a = ellipse(&mut s, i as f32);
            s.add(a.clone());
            history.record(Command::Add(a));
        }
        assert_eq!(history.undo_depth(), HISTORY_DEPTH);
        while history.undo(&mut s, &mut sel) {}
        // the five oldest adds fell off the bottom of the stack
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut s = store();
        let mut sel = Selection::default();
        let mut history = UndoManager::default();
        let a = ellipse(&mut s, 0.0);
        s.add(a.clone());
        history.record(Command::Add(a));
        history.undo(&mut s, &mut sel);
        assert_eq!(history.redo_depth(), 1);
        let b = ellipse(&mut s, 3.0);
        s.add(b.clone());
        history.record(Command::Add(b));
        assert!(!history.can_redo());
        assert!(!history.redo(&mut s, &mut sel));
    }
}
