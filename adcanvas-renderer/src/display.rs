//! Display lists: a document plus interaction state flattened into paint
//! order.
//!
//! ```text
//!  Background ─▶ BackgroundImage ─▶ Overlay ─▶ layers (array order,
//!  selected layer last) ─▶ SelectionRing ─▶ ResizeHandle ─▶ SnapGuides
//! ```
//!
//! Invisible layers are omitted entirely. Locked layers paint normally.

use adcanvas_core::{
    DesignDocument, InteractionMode, InteractionState, Insets, LayerId, LayerKind, ObjectFit,
    Rect, ResolvedLayer, TextAlign,
};
use serde::Serialize;

use crate::image::IntrinsicSizeCache;
use crate::layout::{layout_layer, LayerLayout};
use crate::RenderConfig;

/// Orientation of a snap guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideAxis {
    /// Vertical line at the horizontal centre.
    Vertical,
    /// Horizontal line at the vertical centre.
    Horizontal,
}

/// Text paint attributes shared by text and button layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    /// Wrapped lines.
    pub lines: Vec<String>,
    /// Font size in canvas units.
    pub font_px: f32,
    /// Line advance in canvas units.
    pub line_height_px: f32,
    /// Fill color.
    pub color: String,
    /// Numeric weight.
    pub font_weight: u16,
    /// Font family stack.
    pub font_family: String,
    /// Horizontal alignment.
    pub align: TextAlign,
    /// Letter spacing in canvas units.
    pub letter_spacing: f32,
}

/// One paint operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayItem {
    /// Solid canvas fill.
    Background {
        /// Fill color.
        color: String,
    },
    /// Full-bleed background image, cropped to cover.
    BackgroundImage {
        /// Image reference.
        src: String,
    },
    /// Tint above the background image.
    Overlay {
        /// Tint color.
        color: String,
        /// Opacity, 0 to 1.
        opacity: f32,
    },
    /// A text layer.
    Text {
        /// Source layer.
        id: LayerId,
        /// Bounds in canvas units.
        rect: Rect,
        /// Rotation in degrees.
        rotation: f32,
        /// Text attributes.
        text: TextRun,
        /// Optional box fill.
        fill: Option<String>,
        /// Corner radius.
        radius: f32,
        /// Padding inside the box.
        padding: Insets,
    },
    /// A button layer: a filled rounded box with a centred label.
    Button {
        /// Source layer.
        id: LayerId,
        /// Bounds in canvas units.
        rect: Rect,
        /// Rotation in degrees.
        rotation: f32,
        /// Label attributes.
        label: TextRun,
        /// Box fill.
        fill: String,
        /// Corner radius.
        radius: f32,
        /// Padding inside the box.
        padding: Insets,
    },
    /// An image layer.
    Image {
        /// Source layer.
        id: LayerId,
        /// Bounds in canvas units.
        rect: Rect,
        /// Rotation in degrees.
        rotation: f32,
        /// Image reference.
        src: String,
        /// Fit mode.
        fit: ObjectFit,
        /// Corner radius.
        radius: f32,
    },
    /// Highlight around the selected layer.
    SelectionRing {
        /// Selected layer.
        id: LayerId,
        /// Bounds in canvas units.
        rect: Rect,
        /// Rotation in degrees.
        rotation: f32,
        /// Whether the layer is being text-edited.
        editing: bool,
    },
    /// Resize affordance at the selected layer's bottom-right corner.
    ResizeHandle {
        /// Selected layer.
        id: LayerId,
        /// Handle bounds in canvas units.
        rect: Rect,
    },
    /// An active snap guide.
    SnapGuide {
        /// Orientation.
        axis: GuideAxis,
        /// Offset along the perpendicular axis, in canvas units.
        offset: f32,
    },
}

impl DisplayItem {
    /// Whether this item is editor chrome (excluded from export).
    #[must_use]
    pub fn is_chrome(&self) -> bool {
        matches!(
            self,
            Self::SelectionRing { .. } | Self::ResizeHandle { .. } | Self::SnapGuide { .. }
        )
    }

    /// The layer this item paints, for layer content items.
    #[must_use]
    pub fn layer_id(&self) -> Option<&LayerId> {
        match self {
            Self::Text { id, .. } | Self::Button { id, .. } | Self::Image { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Bounds and rotation of a layer content item.
    #[must_use]
    pub fn layer_bounds(&self) -> Option<(Rect, f32)> {
        match self {
            Self::Text { rect, rotation, .. }
            | Self::Button { rect, rotation, .. }
            | Self::Image { rect, rotation, .. } => Some((*rect, *rotation)),
            _ => None,
        }
    }
}

/// A flattened frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayList {
    /// Canvas width in canvas units.
    pub width: f32,
    /// Canvas height in canvas units.
    pub height: f32,
    /// Paint operations, back to front.
    pub items: Vec<DisplayItem>,
}

impl DisplayList {
    /// Items that are not editor chrome.
    pub fn content(&self) -> impl Iterator<Item = &DisplayItem> {
        self.items.iter().filter(|item| !item.is_chrome())
    }

    /// Painted bounds of a layer.
    #[must_use]
    pub fn layer_rect(&self, id: &LayerId) -> Option<Rect> {
        self.items
            .iter()
            .find(|item| item.layer_id() == Some(id))
            .and_then(DisplayItem::layer_bounds)
            .map(|(rect, _)| rect)
    }

    /// Layer ids in paint order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&LayerId> {
        self.items.iter().filter_map(DisplayItem::layer_id).collect()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Builds display lists, caching image measurements between frames.
#[derive(Debug, Default)]
pub struct Compositor {
    sizes: IntrinsicSizeCache,
}

impl Compositor {
    /// Create a compositor with an empty size cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The intrinsic size cache.
    pub fn sizes_mut(&mut self) -> &mut IntrinsicSizeCache {
        &mut self.sizes
    }

    /// Flatten `document` (and optional interaction chrome) into a display list.
    pub fn compose(
        &mut self,
        document: &DesignDocument,
        interaction: Option<&InteractionState>,
        config: &RenderConfig,
    ) -> DisplayList {
        let dimensions = document.dimensions();
        let mut items = vec![DisplayItem::Background {
            color: document.background_color.clone(),
        }];
        if let Some(src) = &document.background_image {
            items.push(DisplayItem::BackgroundImage { src: src.clone() });
        }
        let opacity = document.effective_overlay_opacity();
        if let (Some(color), true) = (&document.overlay_color, opacity > 0.0) {
            items.push(DisplayItem::Overlay {
                color: color.clone(),
                opacity,
            });
        }

        let selected = interaction.and_then(InteractionState::selected);
        let editing = interaction.and_then(InteractionState::editing);
        let draft = interaction.and_then(InteractionState::text_draft);

        // The selected layer paints last without changing stored order.
        let mut layers: Vec<ResolvedLayer> = document
            .resolved_layers()
            .filter(|layer| layer.visible)
            .collect();
        if let Some(index) = selected.and_then(|id| layers.iter().position(|l| &l.id == id)) {
            let raised = layers.remove(index);
            layers.push(raised);
        }

        let mut selected_layout = None;
        for layer in &layers {
            let intrinsic = match layer.kind {
                LayerKind::Image => self.sizes.lookup(&layer.content),
                _ => None,
            };
            let text = (editing == Some(&layer.id)).then_some(draft).flatten();
            let layout = layout_layer(layer, dimensions, config, intrinsic, text);
            items.push(paint_layer(layer, &layout));
            if selected == Some(&layer.id) {
                selected_layout = Some((layer.id.clone(), layer.locked, layout));
            }
        }

        if config.show_chrome {
            if let Some((id, locked, layout)) = selected_layout {
                let is_editing = editing == Some(&id);
                items.push(DisplayItem::SelectionRing {
                    id: id.clone(),
                    rect: layout.rect,
                    rotation: layout.rotation,
                    editing: is_editing,
                });
                if !is_editing && !locked {
                    let (hx, hy) = rotated_corner(&layout.rect, layout.rotation);
                    items.push(DisplayItem::ResizeHandle {
                        id,
                        rect: Rect::from_centre(hx, hy, config.handle_size, config.handle_size),
                    });
                }
            } else if selected.is_some_and(LayerId::is_background) {
                items.push(DisplayItem::SelectionRing {
                    id: LayerId::background(),
                    rect: Rect {
                        x: 0.0,
                        y: 0.0,
                        width: dimensions.width,
                        height: dimensions.height,
                    },
                    rotation: 0.0,
                    editing: false,
                });
            }

            if let Some(state) = interaction {
                if matches!(state.mode(), InteractionMode::Dragging(_)) {
                    let guides = state.guides();
                    if guides.vertical {
                        items.push(DisplayItem::SnapGuide {
                            axis: GuideAxis::Vertical,
                            offset: dimensions.width / 2.0,
                        });
                    }
                    if guides.horizontal {
                        items.push(DisplayItem::SnapGuide {
                            axis: GuideAxis::Horizontal,
                            offset: dimensions.height / 2.0,
                        });
                    }
                }
            }
        }

        DisplayList {
            width: dimensions.width,
            height: dimensions.height,
            items,
        }
    }
}

fn paint_layer(layer: &ResolvedLayer, layout: &LayerLayout) -> DisplayItem {
    let style = &layer.style;
    let text = || TextRun {
        lines: layout.lines.clone(),
        font_px: layout.font_px,
        line_height_px: layout.line_height_px,
        color: style.color.clone(),
        font_weight: style.font_weight,
        font_family: style.font_family.clone(),
        align: style.text_align,
        letter_spacing: style.letter_spacing,
    };
    match layer.kind {
        LayerKind::Text => DisplayItem::Text {
            id: layer.id.clone(),
            rect: layout.rect,
            rotation: layout.rotation,
            text: text(),
            fill: style.background_color.clone(),
            radius: style.border_radius,
            padding: style.padding,
        },
        LayerKind::Button => DisplayItem::Button {
            id: layer.id.clone(),
            rect: layout.rect,
            rotation: layout.rotation,
            label: TextRun {
                align: TextAlign::Center,
                ..text()
            },
            fill: style
                .background_color
                .clone()
                .unwrap_or_else(|| "transparent".to_string()),
            radius: style.border_radius,
            padding: style.padding,
        },
        LayerKind::Image => DisplayItem::Image {
            id: layer.id.clone(),
            rect: layout.rect,
            rotation: layout.rotation,
            src: layer.content.clone(),
            fit: style.object_fit,
            radius: style.border_radius,
        },
    }
}

/// Bottom-right corner of `rect` after rotating it about its centre.
fn rotated_corner(rect: &Rect, degrees: f32) -> (f32, f32) {
    let (cx, cy) = rect.centre();
    let (dx, dy) = (rect.width / 2.0, rect.height / 2.0);
    if degrees == 0.0 || !degrees.is_finite() {
        return (cx + dx, cy + dy);
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcanvas_core::{
        CanvasSize, InteractionConfig, Layer, PointerEvent, PointerTarget, SnapEngine,
    };

    fn document() -> DesignDocument {
        let mut doc = DesignDocument::new(CanvasSize::Square);
        doc.background_image = Some("bg.png".into());
        doc.overlay_color = Some("#000000".into());
        doc.overlay_opacity = 0.4;
        for (id, kind, x) in [
            ("a", LayerKind::Text, 20.0),
            ("b", LayerKind::Button, 50.0),
            ("c", LayerKind::Image, 80.0),
        ] {
            doc.add_layer(
                Layer::new(id, kind)
                    .with_position(x, 50.0)
                    .with_content("x"),
            )
            .expect("add");
        }
        doc.add_layer(Layer::new("hidden", LayerKind::Text).with_visible(false))
            .expect("add");
        doc
    }

    #[test]
    fn test_paint_order_and_visibility() {
        let list = Compositor::new().compose(&document(), None, &RenderConfig::default());
        assert!(matches!(list.items[0], DisplayItem::Background { .. }));
        assert!(matches!(list.items[1], DisplayItem::BackgroundImage { .. }));
        assert!(matches!(list.items[2], DisplayItem::Overlay { .. }));
        let order: Vec<&str> = list.paint_order().iter().map(|id| id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
        assert!(list.layer_rect(&"hidden".into()).is_none());
    }

    #[test]
    fn test_selected_layer_is_raised_with_chrome() {
        let doc = document();
        let mut state = InteractionState::new(InteractionConfig::default());
        state.select("a".into());
        let list = Compositor::new().compose(&doc, Some(&state), &RenderConfig::default());

        let order: Vec<&str> = list.paint_order().iter().map(|id| id.as_str()).collect();
        assert_eq!(order, ["b", "c", "a"]);
        assert_eq!(doc.layers[0].id.as_str(), "a");
        assert!(list
            .items
            .iter()
            .any(|i| matches!(i, DisplayItem::SelectionRing { editing: false, .. })));
        assert!(list
            .items
            .iter()
            .any(|i| matches!(i, DisplayItem::ResizeHandle { .. })));
    }

    #[test]
    fn test_editing_hides_handle_and_shows_draft() {
        let doc = document();
        let mut state = InteractionState::new(InteractionConfig::default());
        let target = PointerTarget::Layer("a".into());
        state.pointer_down(&PointerEvent::down(216.0, 540.0, 0, target.clone()), &doc);
        state.pointer_up();
        state.pointer_down(&PointerEvent::down(216.0, 540.0, 100, target), &doc);
        state.text_input("draft copy");

        let list = Compositor::new().compose(&doc, Some(&state), &RenderConfig::default());
        assert!(!list
            .items
            .iter()
            .any(|i| matches!(i, DisplayItem::ResizeHandle { .. })));
        let lines = list.items.iter().find_map(|i| match i {
            DisplayItem::Text { text, .. } => Some(text.lines.clone()),
            _ => None,
        });
        assert_eq!(lines, Some(vec!["draft copy".to_string()]));
    }

    #[test]
    fn test_guides_only_while_dragging() {
        let doc = document();
        let mut state = InteractionState::new(InteractionConfig::default());
        state.pointer_down(
            &PointerEvent::down(540.0, 540.0, 0, PointerTarget::Layer("b".into())),
            &doc,
        );
        state.pointer_move(&PointerEvent::moved(545.0, 545.0, 5), &doc, &SnapEngine::default());
        let list = Compositor::new().compose(&doc, Some(&state), &RenderConfig::default());
        let guides = list
            .items
            .iter()
            .filter(|i| matches!(i, DisplayItem::SnapGuide { .. }))
            .count();
        assert_eq!(guides, 2);
        assert_eq!(list.content().filter(|i| i.is_chrome()).count(), 0);
    }

    #[test]
    fn test_chrome_can_be_disabled() {
        let doc = document();
        let mut state = InteractionState::new(InteractionConfig::default());
        state.select("c".into());
        let config = RenderConfig {
            show_chrome: false,
            ..RenderConfig::default()
        };
        let list = Compositor::new().compose(&doc, Some(&state), &config);
        assert!(list.items.iter().all(|i| !i.is_chrome()));
    }

    #[test]
    fn test_rotated_corner() {
        let rect = Rect::from_centre(0.0, 0.0, 20.0, 10.0);
        let (x, y) = rotated_corner(&rect, 90.0);
        assert!((x + 5.0).abs() < 1e-4);
        assert!((y - 10.0).abs() < 1e-4);
    }
}
