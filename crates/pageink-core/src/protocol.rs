//! Messages exchanged with the host application.
//!
//! Inbound commands are parsed defensively from JSON: anything malformed is
//! dropped (`None`) and fields that fail validation leave current settings
//! untouched. Outbound events serialize with a `"type"` tag.

use crate::codec::{StrokeRecord, TextBoxRecord};
use crate::stroke::InkColor;
use crate::tools::ToolMode;
use serde::Serialize;
use serde_json::Value;

/// Command sent by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    SetMode(ToolMode),
    SetColor(InkColor),
    SetWidth(f64),
    SetEraserRadius(f64),
    Undo,
    Redo,
    Clear,
    PrevPage,
    NextPage,
    Save,
    SetTextStyle {
        color: Option<InkColor>,
        font_size: Option<f64>,
    },
    ImportTextBoxes(TextBoxRecord),
    ExportTextBoxes,
}

/// Look a field up at the top level, then inside a `payload` object.
fn field<'a>(msg: &'a Value, name: &str) -> Option<&'a Value> {
    msg.get(name)
        .or_else(|| msg.get("payload").and_then(|p| p.get(name)))
}

fn number(msg: &Value, names: &[&str]) -> Option<f64> {
    names
        .iter()
        .find_map(|n| field(msg, n))
        .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
        .filter(|v| v.is_finite())
}

fn color(msg: &Value) -> Option<InkColor> {
    field(msg, "color")
        .and_then(Value::as_str)
        .and_then(|s| InkColor::from_hex(s).ok())
}

impl HostCommand {
    /// Parse a raw message. Returns `None` for anything unusable.
    pub fn parse(text: &str) -> Option<Self> {
        let msg: Value = serde_json::from_str(text).ok()?;
        Self::from_value(&msg)
    }

    pub fn from_value(msg: &Value) -> Option<Self> {
        let kind = msg.get("type")?.as_str()?;
        let command = match kind {
            "SET_MODE" => {
                let mode = field(msg, "mode").and_then(Value::as_str)?;
                HostCommand::SetMode(ToolMode::from_name(mode)?)
            }
            "SET_COLOR" => HostCommand::SetColor(color(msg)?),
            "SET_WIDTH" => HostCommand::SetWidth(number(msg, &["width", "value"])?),
            "SET_ERASER_RADIUS" => {
                HostCommand::SetEraserRadius(number(msg, &["radius", "value"])?)
            }
            "UNDO" => HostCommand::Undo,
            "REDO" => HostCommand::Redo,
            "CLEAR" => HostCommand::Clear,
            "PREV" => HostCommand::PrevPage,
            "NEXT" => HostCommand::NextPage,
            "SAVE" => HostCommand::Save,
            "SET_TEXT_STYLE" => HostCommand::SetTextStyle {
                color: color(msg),
                font_size: number(msg, &["fontSize", "size"]).filter(|s| *s > 0.0),
            },
            "IMPORT_TEXTBOXES" => {
                let body = field(msg, "textBoxes").unwrap_or_else(|| msg.get("payload").unwrap_or(msg));
                HostCommand::ImportTextBoxes(serde_json::from_value(body.clone()).ok()?)
            }
            "EXPORT_TEXTBOXES" => HostCommand::ExportTextBoxes,
            _ => return None,
        };
        Some(command)
    }
}

/// Event emitted to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum HostEvent {
    /// A page finished loading and accepts input.
    Ready { page: u32, page_count: u32 },
    /// Full stroke snapshot of a page after a change.
    Strokes { page: u32, strokes: Vec<StrokeRecord> },
    /// Text-box export payload.
    #[serde(rename = "TEXTBOXES")]
    TextBoxes {
        page: u32,
        #[serde(flatten)]
        record: TextBoxRecord,
    },
    /// The user asked to leave the editor.
    Back,
    /// The current page changed.
    PageChanged { page: u32, page_count: u32 },
    /// A page could not be written; it stays dirty until a later flush succeeds.
    Unsaved { page: u32 },
}

impl HostEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
