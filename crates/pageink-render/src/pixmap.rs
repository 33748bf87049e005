//! CPU raster surface backed by tiny-skia.

use crate::renderer::{InkStyle, InkSurface, RenderResult, RendererError};
use kurbo::{Point, Size};
use tiny_skia::{
    ColorU8, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Transform,
};

/// Straight (non-premultiplied) RGBA image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl PageBitmap {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> RenderResult<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(RendererError::Surface(format!(
                "bitmap {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }
        Ok(Self { width, height, rgba })
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    /// Color at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }

    /// Encode as an 8-bit RGBA PNG.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| RendererError::RenderFailed(format!("PNG header: {}", e)))?;
            writer
                .write_image_data(&self.rgba)
                .map_err(|e| RendererError::RenderFailed(format!("PNG data: {}", e)))?;
            writer
                .finish()
                .map_err(|e| RendererError::RenderFailed(format!("PNG finish: {}", e)))?;
        }
        Ok(png_data)
    }

    fn to_pixmap(&self) -> RenderResult<Pixmap> {
        let mut pixmap = allocate(self.width, self.height)?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(self.rgba.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(pixmap)
    }
}

fn allocate(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| RendererError::Surface(format!("cannot allocate {}x{} pixmap", width, height)))
}

fn to_bitmap(pixmap: &Pixmap) -> PageBitmap {
    let rgba = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    PageBitmap {
        width: pixmap.width(),
        height: pixmap.height(),
        rgba,
    }
}

/// Transparent ink layer rasterized on the CPU.
#[derive(Debug, Clone)]
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl PixmapSurface {
    /// Allocate a transparent surface. Zero dimensions are rejected.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        Ok(Self {
            pixmap: allocate(width, height)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Reallocate at a new size. Content is discarded.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width != self.width() || height != self.height() {
            self.pixmap = allocate(width, height)?;
        }
        Ok(())
    }

    /// Raw premultiplied pixel data.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// The ink layer as a straight-alpha bitmap.
    pub fn to_bitmap(&self) -> PageBitmap {
        to_bitmap(&self.pixmap)
    }

    /// Flatten the ink layer over a page image stretched to the surface size.
    pub fn composite_over(&self, page: &PageBitmap) -> RenderResult<PageBitmap> {
        let mut out = allocate(self.width(), self.height())?;
        let background = page.to_pixmap()?;
        let sx = self.width() as f32 / page.width as f32;
        let sy = self.height() as f32 / page.height as f32;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        out.draw_pixmap(0, 0, background.as_ref(), &paint, Transform::from_scale(sx, sy), None);
        out.draw_pixmap(0, 0, self.pixmap.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
        Ok(to_bitmap(&out))
    }

    /// Encode the ink layer alone as PNG.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        self.to_bitmap().encode_png()
    }
}

impl InkSurface for PixmapSurface {
    fn size(&self) -> Size {
        Size::new(self.width() as f64, self.height() as f64)
    }

    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn stroke_polyline(&mut self, points: &[Point], style: &InkStyle) {
        let [first, rest @ ..] = points else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(first.x as f32, first.y as f32);
        for p in rest {
            pb.line_to(p.x as f32, p.y as f32);
        }
        let Some(path) = pb.finish() else {
            log::debug!("skipping degenerate polyline of {} points", points.len());
            return;
        };

        let rgba = style.color.to_rgba8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
        paint.anti_alias = true;

        let stroke = tiny_skia::Stroke {
            width: style.width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}
