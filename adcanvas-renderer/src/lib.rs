//! # Adcanvas Renderer
//!
//! Turns a design document plus interaction state into paint operations, and
//! paint operations into pixels.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌─────────────────────────┐
//! │ Document +   │──▶│ Compositor   │──▶│ DisplayList             │
//! │ Interaction  │   │ (layout)     │   │ (paint order + chrome)  │
//! └──────────────┘   └──────────────┘   └────────────┬────────────┘
//!                                                    │
//!                        ┌───────────────┬───────────┴──────┐
//!                        ▼               ▼                  ▼
//!                   SVG backend     Trace backend     Exporter (PNG/JPEG)
//! ```
//!
//! Hosts hit-test pointer input against the last frame with [`hit_test`] and
//! forward the resolved target to the editor.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod display;
pub mod error;
pub mod export;
pub mod hit;
pub mod image;
pub mod layout;
pub mod viewport;

pub use backend::RenderBackend;
pub use display::{Compositor, DisplayItem, DisplayList, GuideAxis, TextRun};
pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportFormat, Exporter};
pub use hit::hit_test;
pub use crate::image::{measure_source, ImageFormat, IntrinsicSize, IntrinsicSizeCache};
pub use layout::{layout_layer, LayerLayout};
pub use viewport::Viewport;

use adcanvas_core::{DesignDocument, InteractionState, PointerTarget};
use serde::{Deserialize, Serialize};

/// Configuration for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Backend to draw with.
    pub backend: BackendType,
    /// Pixels per `rem`.
    pub root_font_px: f32,
    /// Average glyph advance as a fraction of the font size.
    pub glyph_width_ratio: f32,
    /// Resize handle edge length in canvas units.
    pub handle_size: f32,
    /// Selection ring and handle stroke color.
    pub selection_color: String,
    /// Selection ring stroke width in canvas units.
    pub selection_width: f32,
    /// Snap guide color.
    pub guide_color: String,
    /// Draw selection, handle, and guides.
    pub show_chrome: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::Svg,
            root_font_px: adcanvas_core::ROOT_FONT_PX,
            glyph_width_ratio: 0.55,
            handle_size: 24.0,
            selection_color: "#3b82f6".to_string(),
            selection_width: 3.0,
            guide_color: "#ec4899".to_string(),
            show_chrome: true,
        }
    }
}

/// Available rendering backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// SVG markup.
    Svg,
    /// Log paint operations only.
    Trace,
}

/// The main renderer interface.
pub struct Renderer {
    config: RenderConfig,
    backend: Box<dyn RenderBackend>,
    compositor: Compositor,
    frame_count: u64,
    last_frame: Option<DisplayList>,
}

impl Renderer {
    /// Create a new renderer with the given configuration.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        let backend = Self::create_backend(&config);
        Self {
            config,
            backend,
            compositor: Compositor::new(),
            frame_count: 0,
            last_frame: None,
        }
    }

    fn create_backend(config: &RenderConfig) -> Box<dyn RenderBackend> {
        match config.backend {
            BackendType::Svg => Box::new(backend::svg::SvgBackend::new(config.clone())),
            BackendType::Trace => Box::new(backend::trace::TraceBackend::new()),
        }
    }

    /// Render a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn render(
        &mut self,
        document: &DesignDocument,
        interaction: Option<&InteractionState>,
    ) -> RenderResult<&DisplayList> {
        let frame = self.compositor.compose(document, interaction, &self.config);
        self.backend.render(&frame)?;
        self.frame_count += 1;
        Ok(self.last_frame.insert(frame))
    }

    /// Hit-test canvas coordinates against the last rendered frame.
    ///
    /// Returns `None` before the first frame or outside the canvas.
    #[must_use]
    pub fn hit_test(&self, x: f32, y: f32, slop: f32) -> Option<PointerTarget> {
        self.last_frame
            .as_ref()
            .and_then(|frame| hit_test(frame, x, y, slop))
    }

    /// The last rendered frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&DisplayList> {
        self.last_frame.as_ref()
    }

    /// Get the current frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the active backend type.
    #[must_use]
    pub fn active_backend(&self) -> BackendType {
        self.backend.backend_type()
    }

    /// Get the renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Image measurements used for layout; hosts insert sizes as images load.
    pub fn sizes_mut(&mut self) -> &mut IntrinsicSizeCache {
        self.compositor.sizes_mut()
    }

    /// Resize the rendering surface.
    ///
    /// # Errors
    ///
    /// Returns an error if resize fails.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.backend.resize(width, height)
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("backend", &self.backend.backend_type())
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcanvas_core::{CanvasSize, Layer, LayerKind};

    #[test]
    fn test_renderer_counts_frames() {
        let doc = DesignDocument::new(CanvasSize::Story);
        let mut renderer = Renderer::new(RenderConfig::default());
        assert_eq!(renderer.active_backend(), BackendType::Svg);
        assert!(renderer.hit_test(10.0, 10.0, 0.0).is_none());

        let frame = renderer.render(&doc, None).expect("render");
        assert!((frame.height - 1920.0).abs() < f32::EPSILON);
        renderer.render(&doc, None).expect("render");
        assert_eq!(renderer.frame_count(), 2);
    }

    #[test]
    fn test_renderer_hit_test_uses_last_frame() {
        let mut doc = DesignDocument::new(CanvasSize::Square);
        doc.add_layer(
            Layer::new("cta", LayerKind::Button)
                .with_position(50.0, 50.0)
                .with_content("Buy"),
        )
        .expect("add");
        let mut renderer = Renderer::new(RenderConfig {
            backend: BackendType::Trace,
            ..RenderConfig::default()
        });
        renderer.render(&doc, None).expect("render");
        assert_eq!(renderer.active_backend(), BackendType::Trace);
        assert_eq!(
            renderer.hit_test(540.0, 540.0, 0.0),
            Some(PointerTarget::Layer("cta".into()))
        );
        assert_eq!(
            renderer.hit_test(5.0, 5.0, 0.0),
            Some(PointerTarget::Canvas)
        );
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"backend":"trace","show_chrome":false}"#).expect("config");
        assert_eq!(config.backend, BackendType::Trace);
        assert!(!config.show_chrome);
        assert!((config.handle_size - 24.0).abs() < f32::EPSILON);
    }
}
