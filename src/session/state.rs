//! Canvas state of one edit session
//!
//! Owns the store, selection, history, palette, viewport and render caches.
//! Every public mutation records exactly one history command (or none when
//! nothing changed).

use std::fmt;

use image::RgbaImage;

use crate::annotations::crop::cropped_store;
use crate::annotations::history::{Command, Snapshot, UndoManager};
use crate::annotations::selection::Selection;
use crate::annotations::store::AnnotationStore;
use crate::annotations::transform::translate;
use crate::capture::image::BaseImage;
use crate::config::SnapmarkConfig;
use crate::domain::{
    Annotation, AnnotationId, AnnotationKind, FontSpec, Point, Size, StyleChange, StylePalette,
    apply_style_change,
};
use crate::render::{
    CellTextEngine, EffectCache, LiveOverlay, TextEngine, render_final, render_live,
};

use super::viewport::Viewport;

/// Offset applied to duplicated annotations
pub const DUPLICATE_OFFSET: f32 = 10.0;

pub struct CanvasState {
    pub store: AnnotationStore,
    pub selection: Selection,
    pub history: UndoManager,
    pub palette: StylePalette,
    pub viewport: Viewport,
    pub effects: EffectCache,
    text: Box<dyn TextEngine>,
}

impl fmt::Debug for CanvasState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasState")
            .field("store", &self.store)
            .field("selection", &self.selection)
            .field("history", &self.history)
            .field("palette", &self.palette)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl CanvasState {
    pub fn new(base: BaseImage) -> Self {
        Self {
            store: AnnotationStore::new(base),
            selection: Selection::default(),
            history: UndoManager::default(),
            palette: StylePalette::default(),
            viewport: Viewport::default(),
            effects: EffectCache::default(),
            text: Box::new(CellTextEngine),
        }
    }

    pub fn from_config(base: BaseImage, config: &SnapmarkConfig) -> Self {
        Self {
            history: UndoManager::with_depth(config.history_depth),
            palette: config.palette.clone(),
            ..Self::new(base)
        }
    }

    pub fn with_text_engine(mut self, engine: Box<dyn TextEngine>) -> Self {
        self.text = engine;
        self
    }

    pub fn measure_text(&self, text: &str, font: &FontSpec) -> Size {
        self.text.measure(text, font)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.store, &self.selection)
    }

    // ========================================================================
    // Committing
    // ========================================================================

    /// Insert a finished annotation as one `Add` and select it
    pub fn commit_add(&mut self, annotation: Annotation) -> Option<AnnotationId> {
        let id = annotation.id;
        if !self.store.add(annotation.clone()) {
            return None;
        }
        self.history.record(Command::Add(annotation));
        self.selection.select_only(id);
        Some(id)
    }

    /// Record a compound change that started from `before`
    pub fn commit_snapshot(&mut self, before: Snapshot) -> bool {
        self.selection.prune(&self.store);
        let after = self.snapshot();
        self.history.record_snapshot(before, after)
    }

    /// Replace annotations with edited versions
    ///
    /// One edit is recorded as `Modify`, several as one `Snapshot`.
    fn commit_edits(&mut self, edits: Vec<(Annotation, Annotation)>) -> bool {
        let edits: Vec<_> = edits.into_iter().filter(|(old, new)| old != new).collect();
        match edits.len() {
            0 => false,
            1 => {
                let Some((old, new)) = edits.into_iter().next() else {
                    return false;
                };
                self.store.replace(new.clone());
                self.history.record(Command::Modify { old, new });
                true
            }
            _ => {
                let before = self.snapshot();
                for (_, new) in edits {
                    self.store.replace(new);
                }
                self.commit_snapshot(before)
            }
        }
    }

    /// Selected annotations back-to-front
    pub fn selected_annotations(&self) -> Vec<Annotation> {
        self.store
            .iter()
            .filter(|a| self.selection.contains(a.id))
            .cloned()
            .collect()
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.store, &mut self.selection)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.store, &mut self.selection)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ========================================================================
    // Selection edits
    // ========================================================================

    pub fn select_all(&mut self) {
        let members = self
            .store
            .iter()
            .filter(|a| a.visible && !a.is_crop())
            .map(|a| a.id)
            .collect();
        self.selection.set_members(members);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Raise the selection above everything else, keeping its relative order
    pub fn bring_to_front(&mut self) -> bool {
        let ids: Vec<_> = self.selected_annotations().iter().map(|a| a.id).collect();
        if ids.is_empty() {
            return false;
        }
        let before = self.snapshot();
        let mut moved = false;
        for id in ids {
            moved |= self.store.bring_to_front(id);
        }
        moved && self.commit_snapshot(before)
    }

    pub fn delete_selection(&mut self) -> usize {
        let doomed = self.selected_annotations();
        match doomed.as_slice() {
            [] => 0,
            [single] => {
                self.store.remove(single.id);
                self.history.record(Command::Remove(single.clone()));
                self.selection.clear();
                1
            }
            _ => {
                let before = self.snapshot();
                for annotation in &doomed {
                    self.store.remove(annotation.id);
                }
                self.selection.clear();
                self.commit_snapshot(before);
                doomed.len()
            }
        }
    }

    /// Copy the selection with an offset; the copies become the selection
    pub fn duplicate_selection(&mut self) -> Vec<AnnotationId> {
        let originals = self.selected_annotations();
        if originals.is_empty() {
            return Vec::new();
        }
        let offset = Point::new(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        let copies: Vec<Annotation> = originals
            .iter()
            .filter_map(|a| translate(a, offset))
            .map(|moved| {
                let z = self.store.next_z();
                let id = self.store.next_id();
                let copy = moved.duplicate(id, z);
                self.store.add(copy.clone());
                copy
            })
            .collect();
        let ids: Vec<_> = copies.iter().map(|a| a.id).collect();

        if let [single] = copies.as_slice() {
            self.history.record(Command::Add(single.clone()));
            self.selection.select_only(single.id);
        } else {
            // copies are already in the store; rebuild the before state
            let mut before = self.snapshot();
            before.annotations.retain(|a| !ids.contains(&a.id));
            self.selection.set_members(ids.iter().copied().collect());
            self.commit_snapshot(before);
        }
        ids
    }

    pub fn nudge_selection(&mut self, delta: Point) -> bool {
        let edits = self
            .selected_annotations()
            .into_iter()
            .filter_map(|a| translate(&a, delta).map(|moved| (a, moved)))
            .collect();
        self.commit_edits(edits)
    }

    /// Replace the text of the single selected text annotation
    pub fn set_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let Some(id) = self.selection.single() else {
            return false;
        };
        let Some(old) = self.store.get(id).cloned() else {
            return false;
        };
        let mut new = old.clone();
        let AnnotationKind::Text(t) = &mut new.kind else {
            return false;
        };
        t.text = text.to_owned();
        t.size = self.text.measure(&t.text, &t.font);
        self.commit_edits(vec![(old, new)])
    }

    pub fn set_visible(&mut self, visible: bool) -> bool {
        let edits = self
            .selected_annotations()
            .into_iter()
            .map(|a| {
                let mut changed = a.clone();
                changed.visible = visible;
                (a, changed)
            })
            .collect();
        self.commit_edits(edits)
    }

    /// Update the palette and every selected annotation the change concerns
    pub fn apply_style(&mut self, change: &StyleChange) -> bool {
        self.palette = apply_style_change(&self.palette, change);
        let edits = self
            .selected_annotations()
            .into_iter()
            .filter_map(|a| {
                let mut changed = change.apply_to(&a, &self.palette)?;
                if let AnnotationKind::Text(t) = &mut changed.kind {
                    t.size = self.text.measure(&t.text, &t.font);
                }
                Some((a, changed))
            })
            .collect();
        self.commit_edits(edits)
    }

    /// Remove every annotation, keeping the base image
    pub fn clear_annotations(&mut self) -> bool {
        if self.store.is_empty() {
            return false;
        }
        let before = self.snapshot();
        self.store.clear();
        self.selection.clear();
        self.commit_snapshot(before)
    }

    // ========================================================================
    // Crop and rendering
    // ========================================================================

    /// Apply the pending crop as one undoable step
    ///
    /// Returns `false`, leaving everything untouched, when there is no
    /// usable crop region.
    pub fn apply_crop(&mut self) -> bool {
        let Some(next) = cropped_store(&self.store) else {
            log::debug!("Crop rejected");
            return false;
        };
        let before = self.snapshot();
        let old_image = self.store.base_image().fingerprint();
        self.store = next;
        self.selection.clear();
        self.effects.invalidate_image(old_image);
        self.commit_snapshot(before)
    }

    pub fn render_final(&mut self) -> Option<RgbaImage> {
        render_final(&self.store, &mut self.effects, self.text.as_ref())
    }

    pub fn render_live(&mut self, overlay: &LiveOverlay) -> Option<RgbaImage> {
        render_live(
            &self.store,
            &self.selection,
            &mut self.effects,
            self.text.as_ref(),
            overlay,
        )
    }
}
