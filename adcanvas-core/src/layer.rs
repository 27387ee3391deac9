//! Layers - the placeable building blocks of a design document.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{finite_or, Position};
use crate::style::{LayerStyle, ResolvedStyle};

/// Id reserved for the implicit background pseudo-layer.
pub const BACKGROUND_ID: &str = "background";

/// Stable identifier for a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// Wrap an existing id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("layer-{}", Uuid::new_v4().simple()))
    }

    /// The background pseudo-layer id.
    #[must_use]
    pub fn background() -> Self {
        Self(BACKGROUND_ID.to_string())
    }

    /// Whether this is the background pseudo-layer id.
    #[must_use]
    pub fn is_background(&self) -> bool {
        self.0 == BACKGROUND_ID
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The type of content a layer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Styled, wrapped text.
    Text,
    /// A label inside a filled, rounded container.
    Button,
    /// An image source.
    Image,
}

impl LayerKind {
    /// Whether the layer's content can be edited in place on the canvas.
    #[must_use]
    pub const fn is_text_editable(self) -> bool {
        matches!(self, Self::Text | Self::Button)
    }

    /// Width in percent used when a layer has none.
    #[must_use]
    pub const fn default_width(self) -> f32 {
        match self {
            Self::Text => 80.0,
            Self::Button => 40.0,
            Self::Image => 60.0,
        }
    }

    /// Display label used when a layer has no name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Button => "Button",
            Self::Image => "Image",
        }
    }
}

/// Layer size in percent of the canvas width (and height, if given).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerSize {
    /// Width, percent of canvas width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Height, percent of canvas height. Intrinsic when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

impl LayerSize {
    /// A size with only a width.
    #[must_use]
    pub const fn width(width: f32) -> Self {
        Self {
            width: Some(width),
            height: None,
        }
    }
}

/// A layer as stored in a design document.
///
/// Only `id` and `type` are required; every other field may be absent and is
/// filled in by [`Layer::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Stable identifier.
    pub id: LayerId,
    /// Layer type.
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Centre anchor in percentage space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Size in percentage space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<LayerSize>,
    /// Text for text/button layers, image source for image layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Style keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<LayerStyle>,
    /// Visibility; absent means visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Lock flag; absent means unlocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl Layer {
    /// Create a bare layer of the given kind.
    #[must_use]
    pub fn new(id: impl Into<LayerId>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            position: None,
            size: None,
            content: None,
            style: None,
            visible: None,
            locked: None,
        }
    }

    /// A text layer with a generated id.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(LayerId::generate(), LayerKind::Text).with_content(content)
    }

    /// A button layer with a generated id.
    #[must_use]
    pub fn button(label: impl Into<String>) -> Self {
        Self::new(LayerId::generate(), LayerKind::Button).with_content(label)
    }

    /// An image layer with a generated id.
    #[must_use]
    pub fn image(src: impl Into<String>) -> Self {
        Self::new(LayerId::generate(), LayerKind::Image).with_content(src)
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the centre anchor.
    #[must_use]
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    /// Set the width.
    #[must_use]
    pub fn with_width(mut self, width: f32) -> Self {
        let mut size = self.size.unwrap_or_default();
        size.width = Some(width);
        self.size = Some(size);
        self
    }

    /// Set the content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the style.
    #[must_use]
    pub fn with_style(mut self, style: LayerStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Set the lock flag.
    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    /// Set the visibility flag.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Effective visibility.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }

    /// Effective lock state.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.unwrap_or(false)
    }

    /// Whether pointer gestures may move or resize this layer.
    #[must_use]
    pub fn accepts_pointer(&self) -> bool {
        self.is_visible() && !self.is_locked()
    }

    /// Resolved centre anchor.
    #[must_use]
    pub fn anchor(&self) -> Position {
        self.position.unwrap_or_default().sanitized()
    }

    /// Resolved width in percent.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.size
            .and_then(|s| s.width)
            .map_or(self.kind.default_width(), |w| {
                finite_or(w, self.kind.default_width())
            })
    }

    /// Shallow-merge a patch into this layer. Returns whether anything changed.
    pub fn apply_patch(&mut self, patch: &LayerPatch) -> bool {
        let before = self.clone();
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(position) = patch.position {
            self.position = Some(position);
        }
        if let Some(size) = patch.size {
            self.size = Some(size);
        }
        if let Some(content) = &patch.content {
            self.content = Some(content.clone());
        }
        if let Some(style) = &patch.style {
            self.style = Some(style.clone());
        }
        if let Some(visible) = patch.visible {
            self.visible = Some(visible);
        }
        if let Some(locked) = patch.locked {
            self.locked = Some(locked);
        }
        *self != before
    }

    /// Resolve every optional field into a [`ResolvedLayer`].
    #[must_use]
    pub fn resolve(&self) -> ResolvedLayer {
        let style = self.style.clone().unwrap_or_default().resolve(self.kind);
        ResolvedLayer {
            id: self.id.clone(),
            kind: self.kind,
            name: self
                .name
                .clone()
                .unwrap_or_else(|| self.kind.label().to_string()),
            position: self.anchor(),
            width: self.width(),
            height: self
                .size
                .and_then(|s| s.height)
                .filter(|h| h.is_finite() && *h > 0.0),
            content: self.content.clone().unwrap_or_default(),
            style,
            visible: self.is_visible(),
            locked: self.is_locked(),
        }
    }
}

/// A layer with every field resolved to a concrete value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLayer {
    /// Stable identifier.
    pub id: LayerId,
    /// Layer type.
    pub kind: LayerKind,
    /// Display label.
    pub name: String,
    /// Centre anchor, finite.
    pub position: Position,
    /// Width in percent, finite.
    pub width: f32,
    /// Explicit height in percent, if any.
    pub height: Option<f32>,
    /// Text or image source.
    pub content: String,
    /// Resolved style.
    pub style: ResolvedStyle,
    /// Effective visibility.
    pub visible: bool,
    /// Effective lock state.
    pub locked: bool,
}

/// A partial update for [`Layer::apply_patch`]. Absent fields are untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerPatch {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New centre anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// New size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<LayerSize>,
    /// New content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Replacement style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<LayerStyle>,
    /// New visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// New lock state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl LayerPatch {
    /// Patch only the position.
    #[must_use]
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Patch only the content.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Whether the patch carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
