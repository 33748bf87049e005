//! Text-box overlays.
//!
//! Each box has three independent interaction states: selection (at most one
//! box selected), editing (at most one box editable) and drag/resize (pointer
//! capture, committed on release). Operations return a [`TextBoxOutcome`]
//! telling the caller whether the page must be persisted.

use crate::codec::TextBoxRecord;
use crate::stroke::InkColor;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for a text-box.
pub type TextBoxId = Uuid;

pub const DEFAULT_BOX_WIDTH: f64 = 160.0;
pub const DEFAULT_BOX_HEIGHT: f64 = 40.0;
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
pub const MIN_BOX_WIDTH: f64 = 40.0;
pub const MIN_BOX_HEIGHT: f64 = 24.0;
/// Side of the square resize handle at the bottom-right corner.
pub const RESIZE_HANDLE_SIZE: f64 = 16.0;
const DOUBLE_TAP_TIME_MS: u64 = 500;
const DOUBLE_TAP_DISTANCE: f64 = 5.0;

/// Text-box defaults and interaction tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextBoxConfig {
    pub default_width: f64,
    pub default_height: f64,
    pub default_font_size: f64,
    pub min_width: f64,
    pub min_height: f64,
    pub handle_size: f64,
    pub double_tap_ms: u64,
    pub double_tap_distance: f64,
}

impl Default for TextBoxConfig {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_BOX_WIDTH,
            default_height: DEFAULT_BOX_HEIGHT,
            default_font_size: DEFAULT_FONT_SIZE,
            min_width: MIN_BOX_WIDTH,
            min_height: MIN_BOX_HEIGHT,
            handle_size: RESIZE_HANDLE_SIZE,
            double_tap_ms: DOUBLE_TAP_TIME_MS,
            double_tap_distance: DOUBLE_TAP_DISTANCE,
        }
    }
}

/// A positioned text annotation, in wrapper-relative logical pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBox {
    #[serde(default = "Uuid::new_v4")]
    pub id: TextBoxId,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub color: InkColor,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Rich-content snapshot as produced by the host editor.
    #[serde(default)]
    pub html: String,
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

impl TextBox {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            left: origin.x,
            top: origin.y,
            width,
            height,
            color: InkColor::BLACK,
            font_size: DEFAULT_FONT_SIZE,
            html: String::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.left + self.width, self.top + self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.rect().contains(point)
    }

    /// Bottom-right resize handle.
    pub fn handle_rect(&self, handle_size: f64) -> Rect {
        let r = self.rect();
        let half = handle_size / 2.0;
        Rect::new(r.x1 - half, r.y1 - half, r.x1 + half, r.y1 + half)
    }

    /// Scale position and size independently; font by the mean factor.
    pub fn rescale(&mut self, sx: f64, sy: f64) {
        self.left *= sx;
        self.top *= sy;
        self.width *= sx;
        self.height *= sy;
        self.font_size *= (sx + sy) / 2.0;
    }
}

/// Part of a box under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle,
}

/// What the caller must do after a text-box operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBoxOutcome {
    /// Nothing changed.
    Unchanged,
    /// Visual state changed; no write needed yet.
    Updated,
    /// Persisted state changed; flush the page.
    Persist,
}

impl TextBoxOutcome {
    pub fn needs_persist(self) -> bool {
        self == TextBoxOutcome::Persist
    }

    /// The stronger of two outcomes.
    pub fn max(self, other: Self) -> Self {
        use TextBoxOutcome::*;
        match (self, other) {
            (Persist, _) | (_, Persist) => Persist,
            (Updated, _) | (_, Updated) => Updated,
            _ => Unchanged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum InteractionKind {
    Drag,
    Resize,
}

/// Active pointer-captured manipulation.
#[derive(Debug, Clone, Copy)]
struct Interaction {
    id: TextBoxId,
    kind: InteractionKind,
    start_pointer: Point,
    origin: Rect,
    moved: bool,
}

#[derive(Debug, Clone, Copy)]
struct LastTap {
    id: TextBoxId,
    time: Duration,
    position: Point,
}

/// Owns a page's text-boxes and their interaction state.
#[derive(Debug, Clone)]
pub struct TextBoxManager {
    boxes: Vec<TextBox>,
    selected: Option<TextBoxId>,
    editing: Option<TextBoxId>,
    interaction: Option<Interaction>,
    last_tap: Option<LastTap>,
    color: InkColor,
    font_size: f64,
    config: TextBoxConfig,
}

impl Default for TextBoxManager {
    fn default() -> Self {
        Self::new(TextBoxConfig::default())
    }
}

impl TextBoxManager {
    pub fn new(config: TextBoxConfig) -> Self {
        Self {
            boxes: Vec::new(),
            selected: None,
            editing: None,
            interaction: None,
            last_tap: None,
            color: InkColor::BLACK,
            font_size: config.default_font_size,
            config,
        }
    }

    pub fn boxes(&self) -> &[TextBox] {
        &self.boxes
    }

    pub fn get(&self, id: TextBoxId) -> Option<&TextBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    fn get_mut(&mut self, id: TextBoxId) -> Option<&mut TextBox> {
        self.boxes.iter_mut().find(|b| b.id == id)
    }

    pub fn selected(&self) -> Option<TextBoxId> {
        self.selected
    }

    pub fn editing(&self) -> Option<TextBoxId> {
        self.editing
    }

    pub fn is_interacting(&self) -> bool {
        self.interaction.is_some()
    }

    /// Style applied to new boxes.
    pub fn style(&self) -> (InkColor, f64) {
        (self.color, self.font_size)
    }

    /// Replace the whole set (page load or import); interaction state resets.
    pub fn load(&mut self, boxes: Vec<TextBox>) {
        self.boxes = boxes;
        self.selected = None;
        self.editing = None;
        self.interaction = None;
        self.last_tap = None;
    }

    /// Replace the set with an imported record rescaled onto `wrapper`.
    pub fn import(&mut self, record: TextBoxRecord, wrapper: Size) -> TextBoxOutcome {
        self.load(record.into_boxes(wrapper));
        TextBoxOutcome::Persist
    }

    pub fn export(&self, wrapper: Size) -> TextBoxRecord {
        TextBoxRecord::new(&self.boxes, wrapper)
    }

    /// Topmost box under `point`, with the part that was hit.
    pub fn hit_test(&self, point: Point) -> Option<(TextBoxId, HitPart)> {
        self.boxes.iter().rev().find_map(|b| {
            if b.handle_rect(self.config.handle_size).contains(point) {
                Some((b.id, HitPart::ResizeHandle))
            } else if b.contains(point) {
                Some((b.id, HitPart::Body))
            } else {
                None
            }
        })
    }

    /// Select one box, deselecting any other.
    pub fn select(&mut self, id: TextBoxId) -> TextBoxOutcome {
        if self.get(id).is_none() || self.selected == Some(id) {
            return TextBoxOutcome::Unchanged;
        }
        self.selected = Some(id);
        TextBoxOutcome::Updated
    }

    pub fn deselect(&mut self) -> TextBoxOutcome {
        if self.selected.take().is_some() {
            TextBoxOutcome::Updated
        } else {
            TextBoxOutcome::Unchanged
        }
    }

    /// Enter edit mode (double-tap). Leaves selection alone.
    pub fn double_tap(&mut self, id: TextBoxId) -> TextBoxOutcome {
        if self.get(id).is_none() {
            return TextBoxOutcome::Unchanged;
        }
        let exited = match self.editing {
            Some(current) if current != id => self.exit_editing(),
            Some(_) => return TextBoxOutcome::Unchanged,
            None => TextBoxOutcome::Unchanged,
        };
        self.interaction = None;
        self.editing = Some(id);
        exited.max(TextBoxOutcome::Updated)
    }

    /// Leave edit mode; the edited content must be persisted.
    pub fn exit_editing(&mut self) -> TextBoxOutcome {
        if self.editing.take().is_some() {
            TextBoxOutcome::Persist
        } else {
            TextBoxOutcome::Unchanged
        }
    }

    pub fn blur(&mut self) -> TextBoxOutcome {
        self.exit_editing()
    }

    pub fn escape(&mut self) -> TextBoxOutcome {
        self.exit_editing()
    }

    /// Tap on empty space: leaves edit mode if active, otherwise creates a box.
    pub fn tap(&mut self, point: Point) -> TextBoxOutcome {
        if self.editing.is_some() {
            self.selected = None;
            return self.exit_editing();
        }
        let mut text_box = TextBox::new(point, self.config.default_width, self.config.default_height);
        text_box.color = self.color;
        text_box.font_size = self.font_size;
        self.selected = Some(text_box.id);
        self.boxes.push(text_box);
        TextBoxOutcome::Persist
    }

    /// Press on a box: select it and start a drag or resize.
    ///
    /// Starting to drag a box other than the one being edited ends editing.
    pub fn pointer_down(&mut self, id: TextBoxId, part: HitPart, point: Point) -> TextBoxOutcome {
        let Some(origin) = self.get(id).map(TextBox::rect) else {
            return TextBoxOutcome::Unchanged;
        };
        if self.editing == Some(id) && part == HitPart::Body {
            // Caret placement inside the editor, not a drag.
            return TextBoxOutcome::Unchanged;
        }

        let mut outcome = if self.editing.is_some_and(|e| e != id) {
            self.exit_editing()
        } else {
            TextBoxOutcome::Unchanged
        };
        outcome = outcome.max(self.select(id));

        self.interaction = Some(Interaction {
            id,
            kind: match part {
                HitPart::Body => InteractionKind::Drag,
                HitPart::ResizeHandle => InteractionKind::Resize,
            },
            start_pointer: point,
            origin,
            moved: false,
        });
        outcome
    }

    /// Update the captured drag or resize. Never persists by itself.
    pub fn pointer_move(&mut self, point: Point) -> TextBoxOutcome {
        let Some(interaction) = self.interaction.as_mut() else {
            return TextBoxOutcome::Unchanged;
        };
        let delta: Vec2 = point - interaction.start_pointer;
        interaction.moved |= delta.hypot2() > 0.0;
        let (id, kind, origin) = (interaction.id, interaction.kind, interaction.origin);
        let (min_w, min_h) = (self.config.min_width, self.config.min_height);

        let Some(text_box) = self.get_mut(id) else {
            self.interaction = None;
            return TextBoxOutcome::Unchanged;
        };
        match kind {
            InteractionKind::Drag => {
                text_box.left = origin.x0 + delta.x;
                text_box.top = origin.y0 + delta.y;
            }
            InteractionKind::Resize => {
                text_box.width = (origin.width() + delta.x).max(min_w);
                text_box.height = (origin.height() + delta.y).max(min_h);
            }
        }
        TextBoxOutcome::Updated
    }

    /// Release the pointer; a drag or resize that moved is persisted now.
    pub fn pointer_up(&mut self) -> TextBoxOutcome {
        match self.interaction.take() {
            Some(interaction) if interaction.moved => TextBoxOutcome::Persist,
            _ => TextBoxOutcome::Unchanged,
        }
    }

    /// Unified press handler: double-tap detection, then dispatch.
    pub fn press(&mut self, point: Point, time: Duration) -> TextBoxOutcome {
        let Some((id, part)) = self.hit_test(point) else {
            self.last_tap = None;
            return self.tap(point);
        };

        let double = self.last_tap.is_some_and(|last| {
            last.id == id
                && time.saturating_sub(last.time) < Duration::from_millis(self.config.double_tap_ms)
                && (point - last.position).hypot() < self.config.double_tap_distance
        });
        if double {
            // Reset so a third tap is not another double-tap.
            self.last_tap = None;
            return self.double_tap(id);
        }
        self.last_tap = Some(LastTap { id, time, position: point });
        self.pointer_down(id, part, point)
    }

    /// Delete the selected box, only when it is not being edited.
    pub fn delete_selected(&mut self) -> TextBoxOutcome {
        let Some(id) = self.selected else {
            return TextBoxOutcome::Unchanged;
        };
        if self.editing == Some(id) {
            return TextBoxOutcome::Unchanged;
        }
        self.boxes.retain(|b| b.id != id);
        self.selected = None;
        if self.interaction.is_some_and(|i| i.id == id) {
            self.interaction = None;
        }
        TextBoxOutcome::Persist
    }

    /// Replace the content of a box being edited.
    pub fn set_content(&mut self, id: TextBoxId, html: impl Into<String>) -> TextBoxOutcome {
        let Some(text_box) = self.get_mut(id) else {
            return TextBoxOutcome::Unchanged;
        };
        text_box.html = html.into();
        TextBoxOutcome::Updated
    }

    /// Set the style for new boxes and apply it to the selected box.
    pub fn set_style(&mut self, color: Option<InkColor>, font_size: Option<f64>) -> TextBoxOutcome {
        let font_size = font_size.filter(|s| s.is_finite() && *s > 0.0);
        if let Some(color) = color {
            self.color = color;
        }
        if let Some(size) = font_size {
            self.font_size = size;
        }

        let Some(id) = self.selected else {
            return TextBoxOutcome::Unchanged;
        };
        let Some(text_box) = self.get_mut(id) else {
            return TextBoxOutcome::Unchanged;
        };
        if color.is_none() && font_size.is_none() {
            return TextBoxOutcome::Unchanged;
        }
        if let Some(color) = color {
            text_box.color = color;
        }
        if let Some(size) = font_size {
            text_box.font_size = size;
        }
        TextBoxOutcome::Persist
    }
}
