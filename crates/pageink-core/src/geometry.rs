//! Coordinate mapping between the viewport, the page wrapper and the ink surface.
//!
//! Three spaces are in play:
//! - client space: pointer positions reported by the host, in logical pixels
//!   relative to the viewport,
//! - layout space: the page wrapper as laid out on screen (possibly scaled by
//!   zoom independently of its backing buffer),
//! - canvas space: backing pixels of the ink surface, where strokes live.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Upper bound for the device-pixel ratio used to size backing buffers.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Map a client-space pointer position onto the ink surface.
///
/// `rect` is the surface's on-screen bounding rectangle and `backing` its
/// backing-buffer size in pixels. The mapping stays correct when the surface
/// is stretched by layout independently of its buffer.
pub fn client_to_canvas(client: Point, rect: Rect, backing: Size) -> Point {
    let sx = backing.width / rect.width().max(1.0);
    let sy = backing.height / rect.height().max(1.0);
    Point::new((client.x - rect.x0) * sx, (client.y - rect.y0) * sy)
}

/// Clamp a reported device-pixel ratio to `[1, cap]`.
pub fn effective_pixel_ratio(device_pixel_ratio: f64, cap: f64) -> f64 {
    if !device_pixel_ratio.is_finite() {
        return 1.0;
    }
    device_pixel_ratio.clamp(1.0, cap.max(1.0))
}

/// Independent X/Y factors that map content saved at `saved` onto `current`.
///
/// Zero-sized saved dimensions are treated as 1 so the division is always
/// defined.
pub fn scale_factors(saved: Size, current: Size) -> Vec2 {
    Vec2::new(
        current.width / saved.width.max(1.0),
        current.height / saved.height.max(1.0),
    )
}

/// Whether two sizes differ enough to require a rescale.
pub fn size_changed(a: Size, b: Size) -> bool {
    (a.width - b.width).abs() > f64::EPSILON || (a.height - b.height).abs() > f64::EPSILON
}

/// Size of a rendered page and of the buffers derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Logical (layout) size of the page wrapper.
    pub logical: Size,
    /// Backing-buffer size of the page and ink surfaces, in pixels.
    pub backing_width: u32,
    pub backing_height: u32,
    /// Pixel ratio actually applied to the backing buffer.
    pub pixel_ratio: f64,
}

impl PageLayout {
    /// Fit a page bitmap of intrinsic size `page` to `viewport_width`.
    ///
    /// The backing buffer is the logical size multiplied by the device-pixel
    /// ratio, capped at `cap`.
    pub fn fit_to_width(page: Size, viewport_width: f64, device_pixel_ratio: f64, cap: f64) -> Self {
        let scale = viewport_width.max(1.0) / page.width.max(1.0);
        let logical = Size::new(viewport_width.max(1.0), (page.height * scale).max(1.0));
        let pixel_ratio = effective_pixel_ratio(device_pixel_ratio, cap);

        Self {
            logical,
            backing_width: (logical.width * pixel_ratio).round().max(1.0) as u32,
            backing_height: (logical.height * pixel_ratio).round().max(1.0) as u32,
            pixel_ratio,
        }
    }

    /// Backing-buffer size as a [`Size`].
    pub fn backing(&self) -> Size {
        Size::new(self.backing_width as f64, self.backing_height as f64)
    }

    /// Map a client position given the wrapper's current on-screen rectangle.
    pub fn to_canvas(&self, client: Point, on_screen: Rect) -> Point {
        client_to_canvas(client, on_screen, self.backing())
    }

    /// Map a client position into wrapper-relative logical coordinates.
    pub fn to_wrapper(&self, client: Point, on_screen: Rect) -> Point {
        client_to_canvas(client, on_screen, self.logical)
    }
}
