//! SVG backend.
//!
//! Serialises a [`DisplayList`] into a standalone SVG document. The same
//! writer feeds the rasterising exporter, so what the editor previews is
//! what gets exported (minus chrome).

use std::fmt::Write;

use adcanvas_core::{Insets, ObjectFit, Rect, TextAlign};

use crate::display::{DisplayItem, DisplayList, GuideAxis, TextRun};
use crate::{BackendType, RenderConfig, RenderResult};

use super::RenderBackend;

/// Renders frames to SVG markup and keeps the latest one.
pub struct SvgBackend {
    config: RenderConfig,
    width: u32,
    height: u32,
    last_frame: Option<String>,
}

impl SvgBackend {
    /// Create a new SVG backend.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            width: 1080,
            height: 1350,
            last_frame: None,
        }
    }

    /// Markup of the most recent frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&str> {
        self.last_frame.as_deref()
    }

    /// Current surface size.
    #[must_use]
    pub fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl RenderBackend for SvgBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Svg
    }

    fn render(&mut self, frame: &DisplayList) -> RenderResult<()> {
        let svg = render_svg(frame, &self.config, self.config.show_chrome, 1.0);
        tracing::trace!("SVG frame: {} items, {} bytes", frame.len(), svg.len());
        self.last_frame = Some(svg);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.width = width;
        self.height = height;
        Ok(())
    }
}

/// Write `list` as an SVG document.
///
/// The view box is always the canvas in canvas units; `scale` multiplies the
/// declared pixel size. Chrome items are written only when `include_chrome`
/// is set.
#[must_use]
pub fn render_svg(list: &DisplayList, config: &RenderConfig, include_chrome: bool, scale: f32) -> String {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let out_w = (list.width * scale).round().max(1.0);
    let out_h = (list.height * scale).round().max(1.0);

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {} {}\">",
        list.width, list.height,
    );

    let mut clip_count = 0usize;
    for item in &list.items {
        if item.is_chrome() && !include_chrome {
            continue;
        }
        write_item(&mut svg, item, list, config, &mut clip_count);
    }

    svg.push_str("</svg>");
    svg
}

fn write_item(
    svg: &mut String,
    item: &DisplayItem,
    list: &DisplayList,
    config: &RenderConfig,
    clip_count: &mut usize,
) {
    match item {
        DisplayItem::Background { color } => {
            let _ = write!(
                svg,
                "<rect width=\"{}\" height=\"{}\" fill=\"{}\"/>",
                list.width,
                list.height,
                paint(color),
            );
        }

        DisplayItem::BackgroundImage { src } => {
            let _ = write!(
                svg,
                "<image x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid slice\" href=\"{}\"/>",
                list.width,
                list.height,
                escape_xml(src),
            );
        }

        DisplayItem::Overlay { color, opacity } => {
            let _ = write!(
                svg,
                "<rect width=\"{}\" height=\"{}\" fill=\"{}\" fill-opacity=\"{opacity}\"/>",
                list.width,
                list.height,
                paint(color),
            );
        }

        DisplayItem::Text {
            rect,
            rotation,
            text,
            fill,
            radius,
            padding,
            ..
        } => {
            open_rotation(svg, rect, *rotation);
            if let Some(fill) = fill {
                write_box(svg, rect, fill, *radius);
            }
            let top = rect.y + padding.top;
            write_text(svg, rect, padding, text, top);
            close_rotation(svg, *rotation);
        }

        DisplayItem::Button {
            rect,
            rotation,
            label,
            fill,
            radius,
            padding,
            ..
        } => {
            open_rotation(svg, rect, *rotation);
            write_box(svg, rect, fill, *radius);
            #[allow(clippy::cast_precision_loss)]
            let block = label.lines.len() as f32 * label.line_height_px;
            let top = rect.y + (rect.height - block) / 2.0;
            write_text(svg, rect, padding, label, top);
            close_rotation(svg, *rotation);
        }

        DisplayItem::Image {
            rect,
            rotation,
            src,
            fit,
            radius,
            ..
        } => {
            open_rotation(svg, rect, *rotation);
            let clip = if *radius > 0.0 {
                *clip_count += 1;
                let clip_id = format!("clip-{clip_count}");
                let _ = write!(
                    svg,
                    "<clipPath id=\"{clip_id}\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius}\"/></clipPath>",
                    rect.x, rect.y, rect.width, rect.height,
                );
                format!(" clip-path=\"url(#{clip_id})\"")
            } else {
                String::new()
            };
            let _ = write!(
                svg,
                "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"{}\" href=\"{}\"{clip}/>",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                aspect_ratio(*fit),
                escape_xml(src),
            );
            close_rotation(svg, *rotation);
        }

        DisplayItem::SelectionRing {
            rect,
            rotation,
            editing,
            ..
        } => {
            open_rotation(svg, rect, *rotation);
            let dash = if *editing {
                " stroke-dasharray=\"8 6\""
            } else {
                ""
            };
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"{dash}/>",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                escape_xml(&config.selection_color),
                config.selection_width,
            );
            close_rotation(svg, *rotation);
        }

        DisplayItem::ResizeHandle { rect, .. } => {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" fill=\"#ffffff\" stroke=\"{}\" stroke-width=\"{}\"/>",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                rect.width / 4.0,
                escape_xml(&config.selection_color),
                config.selection_width,
            );
        }

        DisplayItem::SnapGuide { axis, offset } => {
            let (x1, y1, x2, y2) = match axis {
                GuideAxis::Vertical => (*offset, 0.0, *offset, list.height),
                GuideAxis::Horizontal => (0.0, *offset, list.width, *offset),
            };
            let _ = write!(
                svg,
                "<line x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\" stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"6 4\"/>",
                escape_xml(&config.guide_color),
            );
        }
    }
}

fn open_rotation(svg: &mut String, rect: &Rect, rotation: f32) {
    if rotation != 0.0 && rotation.is_finite() {
        let (cx, cy) = rect.centre();
        let _ = write!(svg, "<g transform=\"rotate({rotation} {cx} {cy})\">");
    }
}

fn close_rotation(svg: &mut String, rotation: f32) {
    if rotation != 0.0 && rotation.is_finite() {
        svg.push_str("</g>");
    }
}

fn write_box(svg: &mut String, rect: &Rect, fill: &str, radius: f32) {
    let _ = write!(
        svg,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius}\" fill=\"{}\"/>",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        paint(fill),
    );
}

/// Write wrapped lines starting at `top`, one `tspan` per line.
fn write_text(svg: &mut String, rect: &Rect, padding: &Insets, run: &TextRun, top: f32) {
    if run.lines.is_empty() {
        return;
    }
    let (x, anchor) = match run.align {
        TextAlign::Left | TextAlign::Justify => (rect.x + padding.left, "start"),
        TextAlign::Center => (
            rect.x + padding.left + (rect.width - padding.left - padding.right) / 2.0,
            "middle",
        ),
        TextAlign::Right => (rect.x + rect.width - padding.right, "end"),
    };
    // Baseline sits roughly 0.35em below the middle of the first line box.
    let baseline = run.font_px.mul_add(0.35, top + run.line_height_px / 2.0);
    let _ = write!(
        svg,
        "<text x=\"{x}\" y=\"{baseline}\" font-size=\"{}\" font-weight=\"{}\" font-family=\"{}\" fill=\"{}\" text-anchor=\"{anchor}\"",
        run.font_px,
        run.font_weight,
        escape_xml(&run.font_family),
        paint(&run.color),
    );
    if run.letter_spacing != 0.0 {
        let _ = write!(svg, " letter-spacing=\"{}\"", run.letter_spacing);
    }
    svg.push('>');
    for (index, line) in run.lines.iter().enumerate() {
        let dy = if index == 0 { 0.0 } else { run.line_height_px };
        let _ = write!(svg, "<tspan x=\"{x}\" dy=\"{dy}\">{}</tspan>", escape_xml(line));
    }
    svg.push_str("</text>");
}

/// SVG `preserveAspectRatio` value for an object-fit mode.
fn aspect_ratio(fit: ObjectFit) -> &'static str {
    match fit {
        ObjectFit::Cover => "xMidYMid slice",
        ObjectFit::Fill => "none",
        ObjectFit::Contain | ObjectFit::ScaleDown | ObjectFit::None => "xMidYMid meet",
    }
}

/// Escaped fill value; `transparent` maps to `none`.
fn paint(color: &str) -> String {
    if color.trim().eq_ignore_ascii_case("transparent") {
        "none".to_string()
    } else {
        escape_xml(color)
    }
}

/// Escape special XML characters.
pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
