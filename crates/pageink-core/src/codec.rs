//! Serialized page records with resolution-independent rescaling.
//!
//! Each record carries the surface size it was saved at. On load, content is
//! scaled by `current / saved` independently along X and Y, so annotations
//! follow the page when the render surface is sized differently (another
//! device, another viewport width, a resize).

use crate::geometry::{scale_factors, size_changed};
use crate::storage::{PageKey, PageStore, StorageError, StorageResult};
use crate::stroke::{InkColor, InkTool, Stroke};
use crate::textbox::TextBox;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Persisted form of one stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeRecord {
    #[serde(default)]
    pub tool: InkTool,
    #[serde(default)]
    pub color: InkColor,
    pub width: f64,
    pub points: Vec<Point>,
    /// Ink surface size, in pixels, when the stroke was saved.
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl StrokeRecord {
    pub fn from_stroke(stroke: &Stroke, canvas: Size) -> Self {
        Self {
            tool: stroke.tool,
            color: stroke.color,
            width: stroke.width,
            points: stroke.points.clone(),
            canvas_width: canvas.width,
            canvas_height: canvas.height,
        }
    }

    /// Rebuild the stroke for `page`, rescaled onto a surface of size `canvas`.
    pub fn into_stroke(self, page: u32, canvas: Size) -> Stroke {
        let mut stroke = Stroke::new(self.tool, self.color, self.width, page).with_points(self.points);
        let saved = Size::new(self.canvas_width, self.canvas_height);
        if size_changed(saved, canvas) {
            let f = scale_factors(saved, canvas);
            stroke.rescale(f.x, f.y);
        }
        stroke
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite()
            && self.points.len() >= Stroke::MIN_POINTS
            && self.points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }
}

/// Persisted form of a page's text-boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBoxRecord {
    /// Wrapper logical size when the boxes were saved.
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub boxes: Vec<TextBox>,
}

impl TextBoxRecord {
    pub fn new(boxes: &[TextBox], wrapper: Size) -> Self {
        Self {
            width: wrapper.width,
            height: wrapper.height,
            boxes: boxes.to_vec(),
        }
    }

    /// Boxes rescaled onto a wrapper of size `wrapper`.
    pub fn into_boxes(self, wrapper: Size) -> Vec<TextBox> {
        let saved = Size::new(self.width, self.height);
        let mut boxes = self.boxes;
        if size_changed(saved, wrapper) {
            let f = scale_factors(saved, wrapper);
            for b in &mut boxes {
                b.rescale(f.x, f.y);
            }
        }
        boxes
    }
}

/// Serialize strokes, tagging each with the current surface size.
pub fn encode_strokes(strokes: &[Stroke], canvas: Size) -> StorageResult<String> {
    let records: Vec<StrokeRecord> = strokes
        .iter()
        .map(|s| StrokeRecord::from_stroke(s, canvas))
        .collect();
    serde_json::to_string(&records).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse strokes and rescale them onto `canvas`.
///
/// Corrupt input yields an empty set; invalid individual records are dropped.
pub fn decode_strokes(json: &str, page: u32, canvas: Size) -> Vec<Stroke> {
    let records: Vec<StrokeRecord> = match serde_json::from_str(json) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("discarding unreadable stroke record for page {}: {}", page, e);
            return Vec::new();
        }
    };
    records
        .into_iter()
        .filter(StrokeRecord::is_valid)
        .map(|r| r.into_stroke(page, canvas))
        .collect()
}

/// Serialize text-boxes with the current wrapper size.
pub fn encode_text_boxes(boxes: &[TextBox], wrapper: Size) -> StorageResult<String> {
    serde_json::to_string(&TextBoxRecord::new(boxes, wrapper))
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse text-boxes and rescale them onto `wrapper`. Corrupt input is empty.
pub fn decode_text_boxes(json: &str, wrapper: Size) -> Vec<TextBox> {
    match serde_json::from_str::<TextBoxRecord>(json) {
        Ok(record) => record.into_boxes(wrapper),
        Err(e) => {
            log::warn!("discarding unreadable text-box record: {}", e);
            Vec::new()
        }
    }
}

/// In-memory content of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageState {
    pub strokes: Vec<Stroke>,
    pub text_boxes: Vec<TextBox>,
}

/// Surface sizes that records are tagged with and rescaled onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSizes {
    /// Ink surface backing size in pixels.
    pub canvas: Size,
    /// Page wrapper logical size.
    pub wrapper: Size,
}

/// Write a page's strokes and text-boxes.
pub fn save_page(
    store: &dyn PageStore,
    key: &PageKey,
    strokes: &[Stroke],
    text_boxes: &[TextBox],
    sizes: SurfaceSizes,
) -> StorageResult<()> {
    store.put(&key.ink_key(), &encode_strokes(strokes, sizes.canvas)?)?;
    store.put(&key.text_key(), &encode_text_boxes(text_boxes, sizes.wrapper)?)?;
    Ok(())
}

/// Read a page's state. Absent or unreadable records yield empty collections.
pub fn load_page(store: &dyn PageStore, key: &PageKey, sizes: SurfaceSizes) -> PageState {
    let read = |k: String| match store.get(&k) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("failed to read {}: {}", k, e);
            None
        }
    };

    let strokes = read(key.ink_key())
        .map(|json| decode_strokes(&json, key.page, sizes.canvas))
        .unwrap_or_default();
    let text_boxes = read(key.text_key())
        .map(|json| decode_text_boxes(&json, sizes.wrapper))
        .unwrap_or_default();

    PageState { strokes, text_boxes }
}
