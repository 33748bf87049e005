//! Tool modes and the current tool settings.

use crate::eraser::DEFAULT_ERASER_RADIUS;
use crate::stroke::{InkColor, InkTool};
use serde::{Deserialize, Serialize};

/// Default pen width in canvas pixels.
pub const DEFAULT_PEN_WIDTH: f64 = 4.0;

/// Accepted range for stroke widths set by the host.
pub const MIN_STROKE_WIDTH: f64 = 0.5;
pub const MAX_STROKE_WIDTH: f64 = 64.0;

/// Accepted range for eraser radii set by the host.
pub const MIN_ERASER_RADIUS: f64 = 1.0;
pub const MAX_ERASER_RADIUS: f64 = 200.0;

/// Available tool modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    #[default]
    Pen,
    Highlighter,
    Eraser,
    Pan,
    Text,
}

impl ToolMode {
    /// Parse the host's mode name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pen" => Some(ToolMode::Pen),
            "highlighter" => Some(ToolMode::Highlighter),
            "eraser" => Some(ToolMode::Eraser),
            "pan" => Some(ToolMode::Pan),
            "text" => Some(ToolMode::Text),
            _ => None,
        }
    }

    /// Whether a pen-down in this mode starts an ink gesture.
    pub fn draws(self) -> bool {
        matches!(self, ToolMode::Pen | ToolMode::Highlighter | ToolMode::Eraser)
    }

    /// Ink tool used for strokes drawn in this mode.
    pub fn ink_tool(self) -> Option<InkTool> {
        match self {
            ToolMode::Pen => Some(InkTool::Pen),
            ToolMode::Highlighter => Some(InkTool::Highlighter),
            ToolMode::Eraser | ToolMode::Pan | ToolMode::Text => None,
        }
    }
}

/// Session-wide tool configuration.
///
/// Changes apply to the next gesture only; a gesture in flight keeps a copy
/// of the settings it started with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolSettings {
    pub mode: ToolMode,
    pub color: InkColor,
    pub width: f64,
    pub eraser_radius: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            mode: ToolMode::default(),
            color: InkColor::BLACK,
            width: DEFAULT_PEN_WIDTH,
            eraser_radius: DEFAULT_ERASER_RADIUS,
        }
    }
}

impl ToolSettings {
    pub fn set_mode(&mut self, mode: ToolMode) {
        self.mode = mode;
    }

    pub fn set_color(&mut self, color: InkColor) {
        self.color = color;
    }

    /// Set the stroke width. Non-finite values are ignored; others are clamped.
    pub fn set_width(&mut self, width: f64) -> bool {
        if !width.is_finite() || width <= 0.0 {
            return false;
        }
        self.width = width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH);
        true
    }

    /// Set the eraser radius. Non-finite values are ignored; others are clamped.
    pub fn set_eraser_radius(&mut self, radius: f64) -> bool {
        if !radius.is_finite() || radius <= 0.0 {
            return false;
        }
        self.eraser_radius = radius.clamp(MIN_ERASER_RADIUS, MAX_ERASER_RADIUS);
        true
    }
}
