//! Ink surface trait and stroke painter.

use kurbo::{Point, Size};
use pageink_core::config::EditorConfig;
use pageink_core::input::InkSegment;
use pageink_core::stroke::{InkColor, InkTool, Stroke};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Resolved paint for one stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InkStyle {
    /// Color with tool opacity already applied.
    pub color: Color,
    /// Line width in surface pixels.
    pub width: f64,
}

/// A raster target that ink is drawn onto.
///
/// Strokes are always drawn with round caps and round joins.
pub trait InkSurface {
    /// Surface size in pixels.
    fn size(&self) -> Size;

    /// Erase everything to transparent.
    fn clear(&mut self);

    /// Stroke an open polyline. Fewer than two points draw nothing.
    fn stroke_polyline(&mut self, points: &[Point], style: &InkStyle);
}

/// Paint for `tool` at nominal `width`.
pub fn ink_style(tool: InkTool, color: InkColor, width: f64, config: &EditorConfig) -> InkStyle {
    let color = Color::from(color);
    match tool {
        InkTool::Pen => InkStyle { color, width },
        InkTool::Highlighter => InkStyle {
            color: color.multiply_alpha(config.highlighter_opacity as f32),
            width: width * config.highlighter_width_factor,
        },
    }
}

/// Draws strokes onto an [`InkSurface`].
///
/// `redraw_page` is the single source of truth for how committed ink looks;
/// live segments only approximate it until the next redraw.
#[derive(Debug, Clone, Copy, Default)]
pub struct InkRenderer {
    config: EditorConfig,
}

impl InkRenderer {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    pub fn style(&self, tool: InkTool, color: InkColor, width: f64) -> InkStyle {
        ink_style(tool, color, width, &self.config)
    }

    /// Draw one stroke as a single continuous path.
    pub fn draw_stroke<S: InkSurface + ?Sized>(&self, surface: &mut S, stroke: &Stroke) {
        let style = self.style(stroke.tool, stroke.color, stroke.width);
        surface.stroke_polyline(&stroke.points, &style);
    }

    /// Draw only the newest points of a stroke in progress.
    pub fn draw_segment<S: InkSurface + ?Sized>(&self, surface: &mut S, segment: &InkSegment) {
        let style = self.style(segment.tool, segment.color, segment.width);
        surface.stroke_polyline(&segment.points, &style);
    }

    /// Clear the surface and draw every stroke in order.
    pub fn redraw_page<S: InkSurface + ?Sized>(&self, surface: &mut S, strokes: &[Stroke]) {
        surface.clear();
        for stroke in strokes {
            self.draw_stroke(surface, stroke);
        }
        log::trace!("redrew {} strokes", strokes.len());
    }
}
