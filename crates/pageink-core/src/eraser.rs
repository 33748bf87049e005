//! Stroke-granularity eraser.
//!
//! A stroke is removed in its entirety when any of its points lies within the
//! eraser radius of any sampled eraser-path point. Distances are compared
//! squared. Cost is O(strokes × stroke points × path points) for strokes whose
//! inflated bounds overlap the path; the bounds test rejects the rest early.

use crate::store::StrokeStore;
use crate::stroke::Stroke;
use kurbo::{Point, Rect};

/// Default eraser radius in canvas pixels.
pub const DEFAULT_ERASER_RADIUS: f64 = 14.0;

/// Result of an erase pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EraseOutcome {
    /// Number of strokes removed.
    pub removed: usize,
}

impl EraseOutcome {
    /// Whether the pass changed the page (caller must redraw and flush).
    pub fn changed(&self) -> bool {
        self.removed > 0
    }
}

/// Whether `stroke` has any point within `radius` of any point in `path`.
pub fn stroke_hit(stroke: &Stroke, path: &[Point], path_bounds: Rect, radius: f64) -> bool {
    if path.is_empty() || stroke.is_empty() {
        return false;
    }
    if !overlaps(stroke.bounds().inflate(radius, radius), path_bounds) {
        return false;
    }

    let r2 = radius * radius;
    stroke.points.iter().any(|p| {
        path.iter().any(|e| {
            let dx = p.x - e.x;
            let dy = p.y - e.y;
            dx * dx + dy * dy <= r2
        })
    })
}

/// Closed-interval overlap; degenerate rects (a single point, a vertical
/// line) have zero area but still count.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

fn path_bounds(path: &[Point]) -> Rect {
    let Some(first) = path.first() else {
        return Rect::ZERO;
    };
    path.iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
}

/// Remove every stroke on `page` touched by the eraser `path`.
///
/// The pre-erase sequence is pushed onto the page's undo stack only when at
/// least one stroke is removed, so an empty swipe leaves history untouched.
pub fn erase(store: &mut StrokeStore, page: u32, path: &[Point], radius: f64) -> EraseOutcome {
    let radius = radius.max(0.0);
    if path.is_empty() {
        return EraseOutcome::default();
    }
    let bounds = path_bounds(path);

    let current = store.strokes(page);
    let kept: Vec<Stroke> = current
        .iter()
        .filter(|s| !stroke_hit(s, path, bounds, radius))
        .cloned()
        .collect();
    let removed = current.len() - kept.len();

    if removed > 0 {
        store.record_undo(page);
        store.replace_page(page, kept);
        log::debug!("eraser removed {} stroke(s) on page {}", removed, page);
    }

    EraseOutcome { removed }
}
