//! Headless backend that logs every paint operation.
//!
//! Used by hosts without a drawing surface (tests, the CLI) to follow what a
//! frame would paint.

use crate::display::{DisplayItem, DisplayList};
use crate::{BackendType, RenderResult};

use super::RenderBackend;

/// Logging renderer.
pub struct TraceBackend {
    width: u32,
    height: u32,
    items_painted: u64,
}

impl TraceBackend {
    /// Create a new trace backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 1080,
            height: 1350,
            items_painted: 0,
        }
    }

    /// Total items painted since creation.
    #[must_use]
    pub fn items_painted(&self) -> u64 {
        self.items_painted
    }

    /// Get a description of an item for logging.
    fn describe(item: &DisplayItem) -> (&'static str, String) {
        match item {
            DisplayItem::Background { color } => ("background", format!(" fill={color}")),
            DisplayItem::BackgroundImage { src } => ("background image", format!(" src={}", abbreviate(src))),
            DisplayItem::Overlay { color, opacity } => {
                ("overlay", format!(" fill={color} opacity={opacity}"))
            }
            DisplayItem::Text { id, rect, text, .. } => (
                "text",
                format!(
                    " {id} at ({}, {}) {}x{} lines={} font={}",
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    text.lines.len(),
                    text.font_px
                ),
            ),
            DisplayItem::Button { id, rect, label, .. } => (
                "button",
                format!(
                    " {id} at ({}, {}) {}x{} label='{}'",
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    label.lines.join(" ")
                ),
            ),
            DisplayItem::Image { id, rect, src, fit, .. } => (
                "image",
                format!(
                    " {id} at ({}, {}) {}x{} fit={} src={}",
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    fit.keyword(),
                    abbreviate(src)
                ),
            ),
            DisplayItem::SelectionRing { id, editing, .. } => {
                ("selection", format!(" {id} editing={editing}"))
            }
            DisplayItem::ResizeHandle { id, .. } => ("handle", format!(" {id}")),
            DisplayItem::SnapGuide { axis, offset } => ("guide", format!(" {axis:?} at {offset}")),
        }
    }
}

/// Shorten inline payloads for log output.
fn abbreviate(src: &str) -> String {
    const MAX: usize = 48;
    if src.chars().count() <= MAX {
        return src.to_string();
    }
    let head: String = src.chars().take(MAX).collect();
    format!("{head}...")
}

impl Default for TraceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for TraceBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Trace
    }

    fn render(&mut self, frame: &DisplayList) -> RenderResult<()> {
        tracing::trace!(
            "Trace render: {} items, canvas {}x{}, surface {}x{}",
            frame.len(),
            frame.width,
            frame.height,
            self.width,
            self.height
        );

        for item in &frame.items {
            let (kind, details) = Self::describe(item);
            tracing::trace!("Paint {kind}{details}");
            self.items_painted += 1;
        }

        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.width = width;
        self.height = height;
        tracing::debug!("Trace backend resized to {}x{}", width, height);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_painted_items() {
        let frame = DisplayList {
            width: 1080.0,
            height: 1080.0,
            items: vec![DisplayItem::Background {
                color: "#000".into(),
            }],
        };
        let mut backend = TraceBackend::new();
        backend.render(&frame).expect("render");
        backend.render(&frame).expect("render");
        assert_eq!(backend.items_painted(), 2);
    }

    #[test]
    fn test_abbreviate_long_sources() {
        let long = format!("data:image/png;base64,{}", "A".repeat(100));
        let short = abbreviate(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 51);
        assert_eq!(abbreviate("a.png"), "a.png");
    }
}
