//! Fitting the fixed-size canvas into a display surface.

use adcanvas_core::Dimensions;
use serde::{Deserialize, Serialize};

/// Maps between surface pixels and canvas units.
///
/// The canvas is scaled uniformly to fit the surface (minus padding) and
/// centred; pointer coordinates from the host surface are converted back to
/// canvas units before they reach the editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Surface pixels per canvas unit.
    pub scale: f32,
    /// Surface x of the canvas origin.
    pub offset_x: f32,
    /// Surface y of the canvas origin.
    pub offset_y: f32,
    /// Canvas size in canvas units.
    pub canvas: Dimensions,
}

impl Viewport {
    /// Fit `canvas` inside a `surface_width` × `surface_height` surface.
    #[must_use]
    pub fn fit(canvas: Dimensions, surface_width: f32, surface_height: f32, padding: f32) -> Self {
        let avail_w = (surface_width - padding * 2.0).max(1.0);
        let avail_h = (surface_height - padding * 2.0).max(1.0);
        let scale = (avail_w / canvas.width).min(avail_h / canvas.height);
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self {
            scale,
            offset_x: (surface_width - canvas.width * scale) / 2.0,
            offset_y: (surface_height - canvas.height * scale) / 2.0,
            canvas,
        }
    }

    /// Identity mapping (one surface pixel per canvas unit).
    #[must_use]
    pub fn identity(canvas: Dimensions) -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            canvas,
        }
    }

    /// Convert surface coordinates to canvas units.
    #[must_use]
    pub fn to_canvas(&self, surface_x: f32, surface_y: f32) -> (f32, f32) {
        (
            (surface_x - self.offset_x) / self.scale,
            (surface_y - self.offset_y) / self.scale,
        )
    }

    /// Convert canvas units to surface coordinates.
    #[must_use]
    pub fn to_surface(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.mul_add(self.scale, self.offset_x),
            y.mul_add(self.scale, self.offset_y),
        )
    }

    /// Whether a surface point lies on the canvas.
    #[must_use]
    pub fn contains(&self, surface_x: f32, surface_y: f32) -> bool {
        let (x, y) = self.to_canvas(surface_x, surface_y);
        self.canvas.contains(x, y)
    }
}
