//! PageInk Render Library
//!
//! Ink surface abstraction and the stroke painter shared by live drawing,
//! full redraws and export. The default surface rasterizes on the CPU with
//! tiny-skia.

mod pixmap;
mod renderer;

pub use pixmap::{PageBitmap, PixmapSurface};
pub use renderer::{InkRenderer, InkStyle, InkSurface, RenderResult, RendererError, ink_style};
