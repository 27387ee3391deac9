//! The design document: canvas background plus an ordered layer list.
//!
//! Array order is paint order. There is no z-index field; restacking is done
//! by reordering `layers` through [`DesignDocument::move_layer`] and friends.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::geometry::{finite_or, CanvasSize, Dimensions};
use crate::layer::{Layer, LayerId, ResolvedLayer};
use crate::{CanvasError, CanvasResult};

/// Background color used when a document does not specify one.
pub const DEFAULT_BACKGROUND: &str = "#111827";

/// Advisory color scheme produced alongside a generated design.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Palette {
    /// Primary brand color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    /// Secondary color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    /// Accent color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    /// Suggested background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Suggested text color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A complete, serializable canvas description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDocument {
    /// Canvas aspect ratio.
    #[serde(default)]
    pub size: CanvasSize,
    /// Background fill.
    #[serde(default = "DesignDocument::default_background")]
    pub background_color: String,
    /// Background image reference, if any.
    #[serde(default)]
    pub background_image: Option<String>,
    /// Overlay tint drawn above the background image.
    #[serde(default)]
    pub overlay_color: Option<String>,
    /// Overlay opacity, 0 to 1.
    #[serde(default)]
    pub overlay_opacity: f32,
    /// Layers in paint order.
    #[serde(default)]
    pub layers: Vec<Layer>,
    /// Advisory palette.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Palette>,
}

impl Default for DesignDocument {
    fn default() -> Self {
        Self::new(CanvasSize::default())
    }
}

impl DesignDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new(size: CanvasSize) -> Self {
        Self {
            size,
            background_color: Self::default_background(),
            background_image: None,
            overlay_color: None,
            overlay_opacity: 0.0,
            layers: Vec::new(),
            palette: None,
        }
    }

    fn default_background() -> String {
        DEFAULT_BACKGROUND.to_string()
    }

    /// Canvas dimensions in canvas units.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.size.dimensions()
    }

    /// Overlay opacity clamped to `[0, 1]`.
    #[must_use]
    pub fn effective_overlay_opacity(&self) -> f32 {
        finite_or(self.overlay_opacity, 0.0).clamp(0.0, 1.0)
    }

    /// Check id uniqueness and the reserved background id.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> CanvasResult<()> {
        let mut seen = HashSet::with_capacity(self.layers.len());
        for layer in &self.layers {
            check_id(&layer.id)?;
            if !seen.insert(layer.id.as_str()) {
                return Err(CanvasError::DuplicateLayerId(layer.id.to_string()));
            }
        }
        Ok(())
    }

    /// Get a layer by id.
    #[must_use]
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    /// Get a mutable layer by id.
    pub fn layer_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| &l.id == id)
    }

    /// Index of a layer in paint order.
    #[must_use]
    pub fn layer_index(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| &l.id == id)
    }

    /// Resolved layers in paint order.
    pub fn resolved_layers(&self) -> impl Iterator<Item = ResolvedLayer> + '_ {
        self.layers.iter().map(Layer::resolve)
    }

    /// Append a layer on top of the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, reserved, or already used.
    pub fn add_layer(&mut self, layer: Layer) -> CanvasResult<LayerId> {
        check_id(&layer.id)?;
        if self.layer(&layer.id).is_some() {
            return Err(CanvasError::DuplicateLayerId(layer.id.to_string()));
        }
        let id = layer.id.clone();
        self.layers.push(layer);
        Ok(id)
    }

    /// Remove a layer, returning it if it existed.
    pub fn remove_layer(&mut self, id: &LayerId) -> Option<Layer> {
        let index = self.layer_index(id)?;
        Some(self.layers.remove(index))
    }

    /// Move a layer to `index` in paint order (clamped to the stack).
    ///
    /// Returns whether the order changed.
    pub fn move_layer(&mut self, id: &LayerId, index: usize) -> bool {
        let Some(from) = self.layer_index(id) else {
            return false;
        };
        let to = index.min(self.layers.len().saturating_sub(1));
        if from == to {
            return false;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        true
    }

    /// Move a layer above every other layer.
    pub fn bring_to_front(&mut self, id: &LayerId) -> bool {
        self.move_layer(id, usize::MAX)
    }

    /// Move a layer beneath every other layer (still above the background).
    pub fn send_to_back(&mut self, id: &LayerId) -> bool {
        self.move_layer(id, 0)
    }

    /// Move a layer one step up.
    pub fn raise(&mut self, id: &LayerId) -> bool {
        match self.layer_index(id) {
            Some(i) => self.move_layer(id, i + 1),
            None => false,
        }
    }

    /// Move a layer one step down.
    pub fn lower(&mut self, id: &LayerId) -> bool {
        match self.layer_index(id) {
            Some(i) if i > 0 => self.move_layer(id, i - 1),
            _ => false,
        }
    }

    /// Apply a background patch. Returns whether anything changed.
    pub fn apply_background(&mut self, patch: &BackgroundPatch) -> bool {
        let before = (
            self.size,
            self.background_color.clone(),
            self.background_image.clone(),
            self.overlay_color.clone(),
            self.overlay_opacity,
        );
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(color) = &patch.background_color {
            self.background_color.clone_from(color);
        }
        if let Some(image) = &patch.background_image {
            self.background_image.clone_from(image);
        }
        if let Some(color) = &patch.overlay_color {
            self.overlay_color.clone_from(color);
        }
        if let Some(opacity) = patch.overlay_opacity {
            self.overlay_opacity = finite_or(opacity, 0.0).clamp(0.0, 1.0);
        }
        before
            != (
                self.size,
                self.background_color.clone(),
                self.background_image.clone(),
                self.overlay_color.clone(),
                self.overlay_opacity,
            )
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string_pretty(self).map_err(CanvasError::Serialization)
    }

    /// Deserialize and validate a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the layer ids are invalid.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let document: Self = serde_json::from_str(json)?;
        document.validate()?;
        Ok(document)
    }
}

fn check_id(id: &LayerId) -> CanvasResult<()> {
    if id.as_str().is_empty() {
        return Err(CanvasError::EmptyLayerId);
    }
    if id.is_background() {
        return Err(CanvasError::ReservedLayerId(id.to_string()));
    }
    Ok(())
}

/// Partial update of the document's global background properties.
///
/// Nullable fields use a double option: absent leaves the value alone,
/// `null` clears it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundPatch {
    /// New canvas size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<CanvasSize>,
    /// New background color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// New background image; `Some(None)` clears it.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub background_image: Option<Option<String>>,
    /// New overlay color; `Some(None)` clears it.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub overlay_color: Option<Option<String>>,
    /// New overlay opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_opacity: Option<f32>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
