//! Offline export of a page's ink layer.

use crate::error::EditorError;
use pageink_core::codec::{SurfaceSizes, load_page};
use pageink_core::config::EditorConfig;
use pageink_core::storage::{PageKey, PageStore};
use pageink_render::{InkRenderer, InkSurface, PixmapSurface};

/// Render the persisted strokes of `key` onto a `width`×`height` surface and
/// encode it as PNG. Strokes are rescaled exactly as on page load.
pub fn export_page(
    storage: &dyn PageStore,
    key: &PageKey,
    width: u32,
    height: u32,
    config: &EditorConfig,
) -> Result<Vec<u8>, EditorError> {
    let mut surface = PixmapSurface::new(width, height)?;
    let size = surface.size();
    let state = load_page(storage, key, SurfaceSizes { canvas: size, wrapper: size });
    if !state.text_boxes.is_empty() {
        log::debug!("{}: {} text-boxes are not rasterized", key, state.text_boxes.len());
    }

    InkRenderer::new(*config).redraw_page(&mut surface, &state.strokes);
    log::info!("exported {} strokes from {}", state.strokes.len(), key);
    Ok(surface.encode_png()?)
}
