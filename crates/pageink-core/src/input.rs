//! Pointer-event state machine for ink capture.
//!
//! A gesture moves `Idle → Drawing` on an eligible pointer-down and leaves
//! `Drawing` on pointer-up or cancel, yielding a [`GestureOutcome`]. Move
//! events may carry several coalesced samples; they are all considered, but
//! rendering is throttled to one pending frame at a time.

use crate::stroke::{InkColor, InkTool, Stroke};
use crate::tools::{ToolMode, ToolSettings};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Squared distance a sample must exceed from the previous point to be kept.
pub const MIN_POINT_DISTANCE_SQ: f64 = 1.2;

/// Input device class of a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Pen,
    Touch,
    Mouse,
}

impl PointerKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pen" => Some(PointerKind::Pen),
            "touch" => Some(PointerKind::Touch),
            "mouse" => Some(PointerKind::Mouse),
            _ => None,
        }
    }
}

/// Tunables for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputConfig {
    pub min_point_distance_sq: f64,
    /// Treat mouse input like a pen (non-touch environments).
    pub mouse_as_pen: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            min_point_distance_sq: MIN_POINT_DISTANCE_SQ,
            mouse_as_pen: true,
        }
    }
}

/// An ink gesture in progress.
#[derive(Debug, Clone)]
struct Gesture {
    pointer_id: u64,
    page: u32,
    /// Settings captured at pointer-down.
    settings: ToolSettings,
    points: Vec<Point>,
    /// Number of points already drawn on the ink surface.
    rendered: usize,
}

impl Gesture {
    fn is_eraser(&self) -> bool {
        self.settings.mode == ToolMode::Eraser
    }
}

/// Controller state.
#[derive(Debug, Clone, Default)]
enum GestureState {
    #[default]
    Idle,
    Drawing(Gesture),
}

/// Newest unrendered part of the live stroke, for incremental drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct InkSegment {
    pub tool: InkTool,
    pub color: InkColor,
    pub width: f64,
    /// Starts at the last point already drawn so the segment connects.
    pub points: Vec<Point>,
}

/// What a finished gesture asks the caller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Append the stroke to the store and flush.
    Commit(Stroke),
    /// Run the eraser over the path, then discard it.
    Erase { page: u32, path: Vec<Point>, radius: f64 },
    /// The gesture produced nothing worth keeping.
    Discarded,
    /// The event did not belong to an active gesture.
    Ignored,
}

/// Drives ink capture from pointer events.
#[derive(Debug, Clone, Default)]
pub struct InkController {
    settings: ToolSettings,
    config: InputConfig,
    state: GestureState,
    frame_pending: bool,
}

impl InkController {
    pub fn new(settings: ToolSettings, config: InputConfig) -> Self {
        Self {
            settings,
            config,
            state: GestureState::Idle,
            frame_pending: false,
        }
    }

    /// Current tool settings (applied to the next gesture).
    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.settings
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Whether this pointer class may start ink.
    pub fn accepts(&self, kind: PointerKind) -> bool {
        match kind {
            PointerKind::Pen => true,
            PointerKind::Mouse => self.config.mouse_as_pen,
            PointerKind::Touch => false,
        }
    }

    /// Whether an ink gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, GestureState::Drawing(_))
    }

    /// Container scrolling is suppressed exactly while drawing.
    pub fn scroll_locked(&self) -> bool {
        self.is_drawing()
    }

    /// Whether a render frame has been requested and not yet taken.
    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// Start a gesture. Returns false when the event is not eligible.
    pub fn pointer_down(&mut self, pointer_id: u64, kind: PointerKind, point: Point, page: u32) -> bool {
        if self.is_drawing() {
            log::debug!("ignoring pointer {} down: gesture already active", pointer_id);
            return false;
        }
        if !self.accepts(kind) || !self.settings.mode.draws() {
            return false;
        }
        if !(point.x.is_finite() && point.y.is_finite()) {
            return false;
        }

        self.state = GestureState::Drawing(Gesture {
            pointer_id,
            page,
            settings: self.settings,
            points: vec![point],
            rendered: 1,
        });
        true
    }

    /// Feed the coalesced samples of one move event.
    ///
    /// Returns true when this call scheduled a new frame; false when nothing
    /// was added or a frame is already pending.
    pub fn pointer_move(&mut self, pointer_id: u64, samples: &[Point]) -> bool {
        let GestureState::Drawing(gesture) = &mut self.state else {
            return false;
        };
        if gesture.pointer_id != pointer_id {
            return false;
        }

        let min_sq = self.config.min_point_distance_sq;
        let mut added = false;
        for &sample in samples {
            if !(sample.x.is_finite() && sample.y.is_finite()) {
                continue;
            }
            let keep = gesture.points.last().is_none_or(|last| {
                let dx = sample.x - last.x;
                let dy = sample.y - last.y;
                dx * dx + dy * dy > min_sq
            });
            if keep {
                gesture.points.push(sample);
                added = true;
            }
        }

        if !added || gesture.is_eraser() || self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Consume the pending frame, returning the segment to draw.
    pub fn take_frame(&mut self) -> Option<InkSegment> {
        if !std::mem::take(&mut self.frame_pending) {
            return None;
        }
        let GestureState::Drawing(gesture) = &mut self.state else {
            return None;
        };
        let tool = gesture.settings.mode.ink_tool()?;
        if gesture.points.len() <= gesture.rendered {
            return None;
        }

        let start = gesture.rendered.saturating_sub(1);
        let segment = InkSegment {
            tool,
            color: gesture.settings.color,
            width: gesture.settings.width,
            points: gesture.points[start..].to_vec(),
        };
        gesture.rendered = gesture.points.len();
        Some(segment)
    }

    /// Finish the gesture on pointer-up.
    pub fn pointer_up(&mut self, pointer_id: u64) -> GestureOutcome {
        let owned = matches!(&self.state, GestureState::Drawing(g) if g.pointer_id == pointer_id);
        if owned {
            self.finish()
        } else {
            GestureOutcome::Ignored
        }
    }

    /// Pointer-cancel is handled exactly like pointer-up.
    pub fn pointer_cancel(&mut self, pointer_id: u64) -> GestureOutcome {
        self.pointer_up(pointer_id)
    }

    /// End whatever gesture is active, regardless of pointer.
    pub fn finish(&mut self) -> GestureOutcome {
        self.frame_pending = false;
        let GestureState::Drawing(gesture) = std::mem::take(&mut self.state) else {
            return GestureOutcome::Ignored;
        };

        if gesture.is_eraser() {
            return GestureOutcome::Erase {
                page: gesture.page,
                path: gesture.points,
                radius: gesture.settings.eraser_radius,
            };
        }

        let Some(tool) = gesture.settings.mode.ink_tool() else {
            return GestureOutcome::Discarded;
        };
        let stroke = Stroke::new(tool, gesture.settings.color, gesture.settings.width, gesture.page)
            .with_points(gesture.points);
        if stroke.is_committable() {
            GestureOutcome::Commit(stroke)
        } else {
            GestureOutcome::Discarded
        }
    }

    /// The stroke being drawn, if any (eraser gestures have none).
    pub fn live_stroke(&self) -> Option<Stroke> {
        let GestureState::Drawing(gesture) = &self.state else {
            return None;
        };
        let tool = gesture.settings.mode.ink_tool()?;
        Some(
            Stroke::new(tool, gesture.settings.color, gesture.settings.width, gesture.page)
                .with_points(gesture.points.clone()),
        )
    }

    /// Mark the live stroke as fully drawn (after a full redraw included it).
    pub fn mark_rendered(&mut self) {
        if let GestureState::Drawing(gesture) = &mut self.state {
            gesture.rendered = gesture.points.len();
        }
        self.frame_pending = false;
    }
}
