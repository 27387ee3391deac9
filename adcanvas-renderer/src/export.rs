//! Design export to image formats.
//!
//! Renders a [`DisplayList`] to SVG, PNG, or JPEG. Raster formats go through
//! the SVG writer and the resvg/tiny-skia rasterisation pipeline. Editor
//! chrome is never exported.

use adcanvas_core::DesignDocument;

use crate::backend::svg::render_svg;
use crate::display::{Compositor, DisplayList};
use crate::error::{RenderError, RenderResult};
use crate::RenderConfig;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// SVG vector graphics (the XML string as UTF-8 bytes).
    Svg,
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
}

impl ExportFormat {
    /// Guess the format from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// MIME type of the encoded output.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Configuration for design export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Scale factor applied to the canvas size (2.0 for retina).
    pub scale: f32,
    /// JPEG quality 1-100 (default: 90).
    pub jpeg_quality: u8,
    /// RGBA matte used where JPEG output has transparency.
    pub background: [u8; 4],
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            jpeg_quality: 90,
            background: [255, 255, 255, 255],
        }
    }
}

/// Exports display lists to image formats.
pub struct Exporter {
    config: ExportConfig,
    render: RenderConfig,
}

impl Exporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig, render: RenderConfig) -> Self {
        Self { config, render }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default(), RenderConfig::default())
    }

    /// Export configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Compose `document` without interaction state and export it.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be rendered or encoded.
    pub fn export_document(
        &self,
        document: &DesignDocument,
        format: ExportFormat,
    ) -> RenderResult<Vec<u8>> {
        let list = Compositor::new().compose(document, None, &self.render);
        self.export(&list, format)
    }

    /// Export a display list to the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be rendered or encoded.
    pub fn export(&self, list: &DisplayList, format: ExportFormat) -> RenderResult<Vec<u8>> {
        tracing::debug!(
            "Exporting {}x{} frame as {:?} at scale {}",
            list.width,
            list.height,
            format,
            self.config.scale
        );
        match format {
            ExportFormat::Svg => Ok(self.render_to_svg(list).into_bytes()),
            ExportFormat::Png => self.render_to_png(list),
            ExportFormat::Jpeg => self.render_to_jpeg(list),
        }
    }

    /// Export the frame to an SVG string.
    #[must_use]
    pub fn render_to_svg(&self, list: &DisplayList) -> String {
        render_svg(list, &self.render, false, self.config.scale)
    }

    /// Export the frame to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[cfg(feature = "export")]
    pub fn render_to_png(&self, list: &DisplayList) -> RenderResult<Vec<u8>> {
        let pixmap = rasterize_svg(&self.render_to_svg(list))?;
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Export the frame to PNG bytes.
    ///
    /// # Errors
    ///
    /// Always fails: the crate was built without the `export` feature.
    #[cfg(not(feature = "export"))]
    pub fn render_to_png(&self, _list: &DisplayList) -> RenderResult<Vec<u8>> {
        Err(RenderError::NoBackend(
            "PNG export requires the `export` feature".to_string(),
        ))
    }

    /// Export the frame to JPEG bytes, flattening alpha onto the matte.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[cfg(feature = "export")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(&self, list: &DisplayList) -> RenderResult<Vec<u8>> {
        use image::ImageEncoder;

        let pixmap = rasterize_svg(&self.render_to_svg(list))?;

        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = &self.config.background;
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        // tiny-skia stores premultiplied RGBA.
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for channel in 0..3 {
                let value = f32::from(bg[channel]).mul_add(inv, f32::from(pixel[channel]));
                rgb_data.push(value.round().clamp(0.0, 255.0) as u8);
            }
        }

        let quality = self.config.jpeg_quality.clamp(1, 100);
        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// Export the frame to JPEG bytes.
    ///
    /// # Errors
    ///
    /// Always fails: the crate was built without the `export` feature.
    #[cfg(not(feature = "export"))]
    pub fn render_to_jpeg(&self, _list: &DisplayList) -> RenderResult<Vec<u8>> {
        Err(RenderError::NoBackend(
            "JPEG export requires the `export` feature".to_string(),
        ))
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Rasterize an SVG string to a tiny-skia Pixmap.
#[cfg(feature = "export")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rasterize_svg(svg_string: &str) -> RenderResult<tiny_skia::Pixmap> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_string, &opt)
        .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

    let px_w = tree.size().width().round() as u32;
    let px_h = tree.size().height().round() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
        .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    Ok(pixmap)
}
