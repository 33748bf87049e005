//! Page image providers.

use pageink_render::{PageBitmap, RenderResult, RendererError};

/// Supplies rendered page images of a document.
///
/// Pages are numbered from 1.
pub trait PageSource {
    fn page_count(&self) -> u32;

    /// Render `page` at its intrinsic size.
    fn render_page(&self, page: u32) -> RenderResult<PageBitmap>;
}

/// Uniform white pages, for documents without a backing image.
#[derive(Debug, Clone, Copy)]
pub struct BlankPages {
    pub count: u32,
    pub width: u32,
    pub height: u32,
}

impl BlankPages {
    pub fn new(count: u32, width: u32, height: u32) -> Self {
        Self { count, width, height }
    }
}

impl PageSource for BlankPages {
    fn page_count(&self) -> u32 {
        self.count
    }

    fn render_page(&self, page: u32) -> RenderResult<PageBitmap> {
        if page < 1 || page > self.count {
            return Err(RendererError::RenderFailed(format!("no page {}", page)));
        }
        let len = self.width as usize * self.height as usize * 4;
        PageBitmap::new(self.width, self.height, vec![255; len])
    }
}
