//! Layer layout estimation in canvas units.
//!
//! There is no font shaping here. Text width is estimated from an average
//! glyph width (a fraction of the font size), which is enough for hit areas,
//! selection chrome and export previews.

use adcanvas_core::geometry::percent_to_pixels;
use adcanvas_core::{Dimensions, LayerKind, Rect, ResolvedLayer};

use crate::image::IntrinsicSize;
use crate::RenderConfig;

/// Resolved geometry and text lines for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerLayout {
    /// Unrotated bounds in canvas units.
    pub rect: Rect,
    /// Rotation in degrees about the rect centre.
    pub rotation: f32,
    /// Wrapped text (text and button layers).
    pub lines: Vec<String>,
    /// Font size in canvas units.
    pub font_px: f32,
    /// Line advance in canvas units.
    pub line_height_px: f32,
}

/// Lay out a resolved layer on a canvas of `dimensions`.
///
/// `text` overrides the layer content (used for the live text draft).
#[must_use]
pub fn layout_layer(
    layer: &ResolvedLayer,
    dimensions: Dimensions,
    config: &RenderConfig,
    intrinsic: Option<IntrinsicSize>,
    text: Option<&str>,
) -> LayerLayout {
    let style = &layer.style;
    let font_px = style.font_size_rem * config.root_font_px;
    let line_height_px = font_px * style.line_height.max(0.0);
    let width = percent_to_pixels(layer.width, dimensions.width).max(0.0);
    let explicit_height = layer
        .height
        .map(|h| percent_to_pixels(h, dimensions.height));
    let (cx, cy) = dimensions.to_pixels(layer.position);

    let (lines, height) = match layer.kind {
        LayerKind::Text | LayerKind::Button => {
            let content = style
                .text_transform
                .apply(text.unwrap_or(layer.content.as_str()));
            let inner = (width - style.padding.horizontal()).max(font_px);
            let lines = wrap_text(
                &content,
                inner,
                font_px,
                config.glyph_width_ratio,
                style.letter_spacing,
            );
            #[allow(clippy::cast_precision_loss)]
            let intrinsic_height =
                lines.len().max(1) as f32 * line_height_px + style.padding.vertical();
            (lines, explicit_height.unwrap_or(intrinsic_height))
        }
        LayerKind::Image => {
            let height = explicit_height
                .or_else(|| intrinsic.map(|size| width * size.aspect()))
                .unwrap_or(width);
            (Vec::new(), height)
        }
    };

    LayerLayout {
        rect: Rect::from_centre(cx, cy, width, height.max(0.0)),
        rotation: style.rotate,
        lines,
        font_px,
        line_height_px,
    }
}

/// Estimated advance of `text` in canvas units.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate_width(text: &str, font_px: f32, glyph_ratio: f32, letter_spacing: f32) -> f32 {
    let chars = text.chars().count() as f32;
    chars * (font_px * glyph_ratio + letter_spacing)
}

/// Greedy word wrap against an estimated glyph width.
///
/// Explicit newlines are kept. Words wider than the line are broken at the
/// character that overflows. Always returns at least one line.
#[must_use]
pub fn wrap_text(
    text: &str,
    max_width: f32,
    font_px: f32,
    glyph_ratio: f32,
    letter_spacing: f32,
) -> Vec<String> {
    let advance = (font_px * glyph_ratio + letter_spacing).max(f32::EPSILON);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_chars = ((max_width / advance).floor() as usize).max(1);

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0usize;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            // Break words that cannot fit on a line of their own.
            while word.len() > max_chars {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if word.is_empty() {
                continue;
            }
            let needed = if line_len == 0 {
                word.len()
            } else {
                line_len + 1 + word.len()
            };
            if needed > max_chars {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word.iter());
            line_len += word.len();
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcanvas_core::{CanvasSize, Layer, LayerStyle};

    #[test]
    fn test_wrap_breaks_on_words() {
        // 10 px per glyph, 60 px wide: six characters per line.
        let lines = wrap_text("big summer sale", 60.0, 20.0, 0.5, 0.0);
        assert_eq!(lines, vec!["big", "summer", "sale"]);
    }

    #[test]
    fn test_wrap_keeps_newlines_and_splits_long_words() {
        let lines = wrap_text("ab\nabcdefgh", 40.0, 20.0, 0.5, 0.0);
        assert_eq!(lines, vec!["ab", "abcd", "efgh"]);
        assert_eq!(wrap_text("", 40.0, 20.0, 0.5, 0.0), vec![String::new()]);
    }

    #[test]
    fn test_text_layer_height_from_lines() {
        let layer = Layer::new("t", LayerKind::Text)
            .with_position(50.0, 50.0)
            .with_width(50.0)
            .with_content("Hello")
            .resolve();
        let config = RenderConfig::default();
        let layout = layout_layer(&layer, CanvasSize::Square.dimensions(), &config, None, None);
        assert_eq!(layout.lines, vec!["Hello"]);
        // 2rem at 16 px, line height 1.2.
        assert!((layout.rect.height - 38.4).abs() < 1e-3);
        assert!((layout.rect.width - 540.0).abs() < 1e-3);
        let (cx, cy) = layout.rect.centre();
        assert!((cx - 540.0).abs() < 1e-3 && (cy - 540.0).abs() < 1e-3);
    }

    #[test]
    fn test_text_transform_and_draft() {
        let layer = Layer::new("t", LayerKind::Text)
            .with_width(90.0)
            .with_content("hello")
            .with_style(LayerStyle {
                text_transform: Some(adcanvas_core::TextTransform::Uppercase),
                ..LayerStyle::default()
            })
            .resolve();
        let config = RenderConfig::default();
        let dims = CanvasSize::Portrait.dimensions();
        assert_eq!(layout_layer(&layer, dims, &config, None, None).lines, vec!["HELLO"]);
        assert_eq!(
            layout_layer(&layer, dims, &config, None, Some("draft")).lines,
            vec!["DRAFT"]
        );
    }

    #[test]
    fn test_image_height_follows_intrinsic_ratio() {
        let layer = Layer::new("i", LayerKind::Image)
            .with_width(50.0)
            .with_content("x.png")
            .resolve();
        let config = RenderConfig::default();
        let dims = CanvasSize::Story.dimensions();
        let wide = IntrinsicSize {
            width: 400,
            height: 200,
        };
        let layout = layout_layer(&layer, dims, &config, Some(wide), None);
        assert!((layout.rect.height - 270.0).abs() < 1e-3);

        let square = layout_layer(&layer, dims, &config, None, None);
        assert!((square.rect.height - 540.0).abs() < 1e-3);
    }

    #[test]
    fn test_button_height_includes_padding() {
        let layer = Layer::new("b", LayerKind::Button)
            .with_content("Shop now")
            .resolve();
        let config = RenderConfig::default();
        let layout = layout_layer(&layer, CanvasSize::Square.dimensions(), &config, None, None);
        // 1.25rem = 20 px, line height 1.0, padding 12 + 12.
        assert!((layout.rect.height - 44.0).abs() < 1e-3);
    }
}
