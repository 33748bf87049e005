//! Per-page stroke storage with snapshot-based undo/redo.

use crate::geometry::{scale_factors, size_changed};
use crate::stroke::Stroke;
use kurbo::Size;
use std::collections::HashMap;

/// Default maximum number of undo states kept per page.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Undo/redo stacks of whole-page snapshots.
#[derive(Debug, Clone, Default)]
struct PageHistory {
    undo: Vec<Vec<Stroke>>,
    redo: Vec<Vec<Stroke>>,
    /// Surface size the snapshots are expressed in, once known.
    canvas: Option<Size>,
}

impl PageHistory {
    fn rescale(&mut self, sx: f64, sy: f64) {
        for stroke in self.undo.iter_mut().chain(self.redo.iter_mut()).flatten() {
            stroke.rescale(sx, sy);
        }
    }
}

/// Ordered stroke sequences keyed by page number.
///
/// Insertion order is z-order (back to front). The store only ever holds
/// complete strokes with at least [`Stroke::MIN_POINTS`] points.
#[derive(Debug, Clone)]
pub struct StrokeStore {
    pages: HashMap<u32, Vec<Stroke>>,
    history: HashMap<u32, PageHistory>,
    undo_limit: usize,
}

impl Default for StrokeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeStore {
    pub fn new() -> Self {
        Self::with_undo_limit(MAX_UNDO_HISTORY)
    }

    pub fn with_undo_limit(undo_limit: usize) -> Self {
        Self {
            pages: HashMap::new(),
            history: HashMap::new(),
            undo_limit: undo_limit.max(1),
        }
    }

    /// Strokes of a page in z-order.
    pub fn strokes(&self, page: u32) -> &[Stroke] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Deep copy of a page's current sequence.
    pub fn snapshot(&self, page: u32) -> Vec<Stroke> {
        self.strokes(page).to_vec()
    }

    /// Append a stroke to the end of a page's sequence.
    ///
    /// Strokes with fewer than two points are discarded; returns whether the
    /// stroke was stored.
    pub fn append(&mut self, page: u32, stroke: Stroke) -> bool {
        if !stroke.is_committable() {
            return false;
        }
        self.pages.entry(page).or_default().push(stroke);
        true
    }

    /// Atomically swap a page's whole sequence.
    pub fn replace_page(&mut self, page: u32, strokes: Vec<Stroke>) {
        let strokes: Vec<Stroke> = strokes.into_iter().filter(Stroke::is_committable).collect();
        self.pages.insert(page, strokes);
    }

    /// Replace a page with content loaded onto a surface of size `canvas`.
    ///
    /// The page's undo/redo history survives. Snapshots recorded at another
    /// surface size are rescaled the same way loaded strokes are.
    pub fn load_page(&mut self, page: u32, strokes: Vec<Stroke>, canvas: Size) {
        self.replace_page(page, strokes);
        let history = self.history.entry(page).or_default();
        if let Some(previous) = history.canvas {
            if size_changed(previous, canvas) {
                let f = scale_factors(previous, canvas);
                history.rescale(f.x, f.y);
            }
        }
        history.canvas = Some(canvas);
    }


    /// Push the current sequence onto the undo stack before a new action.
    ///
    /// Clears the redo stack: a new action invalidates undone states.
    pub fn record_undo(&mut self, page: u32) {
        let snapshot = self.snapshot(page);
        let history = self.history.entry(page).or_default();
        history.undo.push(snapshot);
        history.redo.clear();

        if history.undo.len() > self.undo_limit {
            history.undo.remove(0);
        }
    }

    /// Record undo and append a stroke as one user action.
    pub fn commit(&mut self, page: u32, stroke: Stroke) -> bool {
        if !stroke.is_committable() {
            return false;
        }
        self.record_undo(page);
        self.append(page, stroke)
    }

    /// Remove every stroke on a page. Returns false when already empty.
    pub fn clear_page(&mut self, page: u32) -> bool {
        if self.strokes(page).is_empty() {
            return false;
        }
        self.record_undo(page);
        self.replace_page(page, Vec::new());
        true
    }

    /// Restore the previous state of a page.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self, page: u32) -> bool {
        let Some(snapshot) = self.history.get_mut(&page).and_then(|h| h.undo.pop()) else {
            return false;
        };
        let current = self.pages.insert(page, snapshot).unwrap_or_default();
        self.history.entry(page).or_default().redo.push(current);
        true
    }

    /// Re-apply the last undone state of a page.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self, page: u32) -> bool {
        let Some(snapshot) = self.history.get_mut(&page).and_then(|h| h.redo.pop()) else {
            return false;
        };
        let current = self.pages.insert(page, snapshot).unwrap_or_default();
        self.history.entry(page).or_default().undo.push(current);
        true
    }

    pub fn can_undo(&self, page: u32) -> bool {
        self.history.get(&page).is_some_and(|h| !h.undo.is_empty())
    }

    pub fn can_redo(&self, page: u32) -> bool {
        self.history.get(&page).is_some_and(|h| !h.redo.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{InkColor, InkTool};
    use kurbo::Point;

    fn line(page: u32, x: f64) -> Stroke {
        Stroke::new(InkTool::Pen, InkColor::BLACK, 4.0, page)
            .with_points(vec![Point::new(x, 0.0), Point::new(x, 10.0 + x)])
    }

    #[test]
    fn test_append_rejects_short_strokes() {
        let mut store = StrokeStore::new();
        let dot = Stroke::new(InkTool::Pen, InkColor::BLACK, 4.0, 1)
            .with_points(vec![Point::new(1.0, 1.0)]);
        assert!(!store.append(1, dot.clone()));
        assert!(!store.commit(1, dot));
        assert!(store.strokes(1).is_empty());
        assert!(!store.can_undo(1));
    }

    #[test]
    fn test_pages_are_independent() {
        let mut store = StrokeStore::new();
        store.commit(1, line(1, 0.0));
        store.commit(2, line(2, 5.0));
        assert_eq!(store.strokes(1).len(), 1);
        assert_eq!(store.strokes(2).len(), 1);
        assert!(store.undo(1));
        assert!(store.strokes(1).is_empty());
        assert_eq!(store.strokes(2).len(), 1);
    }

    #[test]
    fn test_undo_redo_symmetry() {
        let mut store = StrokeStore::new();
        for i in 0..5 {
            store.commit(1, line(1, i as f64));
        }
        let original = store.snapshot(1);

        for _ in 0..5 {
            assert!(store.undo(1));
        }
        assert!(store.strokes(1).is_empty());
        assert!(!store.undo(1));

        for _ in 0..5 {
            assert!(store.redo(1));
        }
        assert!(!store.redo(1));
        assert_eq!(store.snapshot(1), original);
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut store = StrokeStore::new();
        store.commit(1, line(1, 0.0));
        store.commit(1, line(1, 1.0));
        store.undo(1);
        assert!(store.can_redo(1));

        store.commit(1, line(1, 2.0));
        assert!(!store.can_redo(1));
        assert_eq!(store.strokes(1).len(), 2);
    }

    #[test]
    fn test_undo_redo_do_not_clear_each_other() {
        let mut store = StrokeStore::new();
        store.commit(1, line(1, 0.0));
        store.commit(1, line(1, 1.0));
        store.undo(1);
        store.undo(1);
        store.redo(1);
        assert!(store.can_undo(1));
        assert!(store.can_redo(1));
        assert_eq!(store.strokes(1).len(), 1);
    }

    #[test]
    fn test_clear_page_is_undoable() {
        let mut store = StrokeStore::new();
        assert!(!store.clear_page(1));
        store.commit(1, line(1, 0.0));
        assert!(store.clear_page(1));
        assert!(store.strokes(1).is_empty());
        assert!(store.undo(1));
        assert_eq!(store.strokes(1).len(), 1);
    }

    #[test]
    fn test_undo_limit() {
        let mut store = StrokeStore::with_undo_limit(3);
        for i in 0..10 {
            store.commit(1, line(1, i as f64));
        }
        let mut undone = 0;
        while store.undo(1) {
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert_eq!(store.strokes(1).len(), 7);
    }

    #[test]
    fn test_load_page_keeps_history() {
        let canvas = Size::new(100.0, 100.0);
        let mut store = StrokeStore::new();
        store.load_page(1, Vec::new(), canvas);
        store.commit(1, line(1, 0.0));
        let current = store.snapshot(1);

        store.load_page(1, current.clone(), canvas);
        assert!(store.can_undo(1));
        assert!(store.undo(1));
        assert!(store.strokes(1).is_empty());
        assert!(store.redo(1));
        assert_eq!(store.snapshot(1), current);
    }

    #[test]
    fn test_load_page_rescales_history() {
        let mut store = StrokeStore::new();
        store.load_page(1, Vec::new(), Size::new(100.0, 100.0));
        store.commit(1, line(1, 10.0));
        store.commit(1, line(1, 20.0));
        assert!(store.undo(1));

        let mut loaded = store.snapshot(1);
        for stroke in &mut loaded {
            stroke.rescale(2.0, 0.5);
        }
        store.load_page(1, loaded, Size::new(200.0, 50.0));

        assert!(store.redo(1));
        let redone = store.strokes(1);
        assert_eq!(redone.len(), 2);
        assert_eq!(redone[1].points[0], Point::new(40.0, 0.0));
        assert_eq!(redone[1].points[1], Point::new(40.0, 15.0));

        assert!(store.undo(1));
        assert!(store.undo(1));
        assert!(store.strokes(1).is_empty());
    }

}
