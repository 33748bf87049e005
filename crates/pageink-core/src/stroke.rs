//! Freehand ink strokes.

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Ink tool a stroke was drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InkTool {
    #[default]
    Pen,
    Highlighter,
}

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color: {0:?}")]
pub struct ColorParseError(pub String);

/// Stroke color (RGBA8), persisted as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InkColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl InkColor {
    pub const BLACK: InkColor = InkColor::rgb(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse a CSS hex color: `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());

        match hex.len() {
            3 => {
                let nibble = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| err())
                };
                Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(err()),
        }
    }
}

impl Default for InkColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for InkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for InkColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<InkColor> for String {
    fn from(color: InkColor) -> Self {
        color.to_string()
    }
}

impl From<Color> for InkColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<InkColor> for Color {
    fn from(color: InkColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// A committed (or in-progress) freehand ink path on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub tool: InkTool,
    pub color: InkColor,
    /// Nominal width in canvas pixels, before tool-specific adjustment.
    pub width: f64,
    pub page: u32,
    /// Points in canvas-pixel space.
    pub points: Vec<Point>,
}

impl Stroke {
    /// Minimum number of points for a stroke to be committed.
    pub const MIN_POINTS: usize = 2;

    pub fn new(tool: InkTool, color: InkColor, width: f64, page: u32) -> Self {
        Self {
            tool,
            color,
            width,
            page,
            points: Vec::new(),
        }
    }

    /// Builder-style helper for tests and decoding.
    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = points;
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the stroke has enough points to be committed.
    pub fn is_committable(&self) -> bool {
        self.points.len() >= Self::MIN_POINTS
    }

    /// Axis-aligned bounds of the point set.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .skip(1)
            .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
    }

    /// Scale every point independently along X and Y.
    pub fn rescale(&mut self, sx: f64, sy: f64) {
        for p in &mut self.points {
            p.x *= sx;
            p.y *= sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(InkColor::from_hex("#ff0000"), Ok(InkColor::rgb(255, 0, 0)));
        assert_eq!(InkColor::from_hex("#0f0"), Ok(InkColor::rgb(0, 255, 0)));
        assert_eq!(
            InkColor::from_hex("#11223344"),
            Ok(InkColor::new(0x11, 0x22, 0x33, 0x44))
        );
        assert!(InkColor::from_hex("red").is_err());
        assert!(InkColor::from_hex("#12345").is_err());
        assert!(InkColor::from_hex("#zzzzzz").is_err());
        assert!(InkColor::from_hex("#+fffff").is_err());
        assert!(InkColor::from_hex("#+ff").is_err());
    }

    #[test]
    fn test_color_display() {
        assert_eq!(InkColor::rgb(0x1a, 0x2b, 0x3c).to_string(), "#1a2b3c");
        assert_eq!(InkColor::new(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn test_color_serde_as_string() {
        let json = serde_json::to_string(&InkColor::rgb(255, 255, 0)).unwrap();
        assert_eq!(json, "\"#ffff00\"");
        let back: InkColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, InkColor::rgb(255, 255, 0));
        assert!(serde_json::from_str::<InkColor>("\"nope\"").is_err());
    }

    #[test]
    fn test_bounds() {
        let stroke = Stroke::new(InkTool::Pen, InkColor::BLACK, 4.0, 1).with_points(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
        ]);
        let bounds = stroke.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_committable() {
        let mut stroke = Stroke::new(InkTool::Pen, InkColor::BLACK, 4.0, 1);
        stroke.points.push(Point::new(1.0, 1.0));
        assert!(!stroke.is_committable());
        stroke.points.push(Point::new(2.0, 2.0));
        assert!(stroke.is_committable());
    }
}
