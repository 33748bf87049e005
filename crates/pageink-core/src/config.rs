//! Editor configuration.

use crate::geometry::MAX_PIXEL_RATIO;
use crate::input::InputConfig;
use crate::store::MAX_UNDO_HISTORY;
use crate::swipe::SwipeConfig;
use crate::textbox::TextBoxConfig;
use crate::tools::ToolSettings;
use serde::{Deserialize, Serialize};

/// Opacity of highlighter ink.
pub const HIGHLIGHTER_OPACITY: f64 = 0.28;
/// Highlighter strokes are drawn wider than the nominal width.
pub const HIGHLIGHTER_WIDTH_FACTOR: f64 = 1.6;

/// Every tunable of an editing session.
///
/// Hosts may supply this as JSON; missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Upper bound on the device pixel ratio used for the ink surface.
    pub max_pixel_ratio: f64,
    pub undo_limit: usize,
    pub highlighter_opacity: f64,
    pub highlighter_width_factor: f64,
    pub input: InputConfig,
    /// Tool settings a session starts with.
    pub tools: ToolSettings,
    pub swipe: SwipeConfig,
    pub text: TextBoxConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_pixel_ratio: MAX_PIXEL_RATIO,
            undo_limit: MAX_UNDO_HISTORY,
            highlighter_opacity: HIGHLIGHTER_OPACITY,
            highlighter_width_factor: HIGHLIGHTER_WIDTH_FACTOR,
            input: InputConfig::default(),
            tools: ToolSettings::default(),
            swipe: SwipeConfig::default(),
            text: TextBoxConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolMode;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!((config.max_pixel_ratio - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.undo_limit, 50);
        assert!((config.highlighter_opacity - 0.28).abs() < f64::EPSILON);
        assert!((config.highlighter_width_factor - 1.6).abs() < f64::EPSILON);
        assert!(config.input.mouse_as_pen);
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json(
            r#"{"undoLimit":10,"tools":{"mode":"highlighter"},"swipe":{"minDistance":80},"unknown":1}"#,
        )
        .unwrap();
        assert_eq!(config.undo_limit, 10);
        assert_eq!(config.tools.mode, ToolMode::Highlighter);
        assert!((config.tools.width - 4.0).abs() < f64::EPSILON);
        assert!((config.swipe.min_distance - 80.0).abs() < f64::EPSILON);
        assert_eq!(config.swipe.cooldown_ms, 400);
        assert_eq!(config.text, TextBoxConfig::default());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
        assert!(EditorConfig::from_json("[").is_err());
    }
}
