//! Selection and direct-manipulation state machine.
//!
//! ```text
//!             pointer-down (layer)            pointer-move
//!   Idle ──────────────────────────▶ Dragging ◀────────┐
//!    ▲  ▲                              │    └──────────┘
//!    │  │ pointer-down (canvas)        │ pointer-up
//!    │  └──────────────┐               ▼
//!    │                 └───────── Selected ──── handle-down ──▶ Resizing
//!    │ cancel (any state)            ▲   │                         │
//!    │                         blur  │   │ double pointer-down     │ pointer-up
//!    └─────────────────── EditingText ◀──┘                         ▼
//!                                                               Selected
//! ```
//!
//! The state machine reads the document but never writes it. Geometry and
//! content changes are returned as [`Effect`]s for the editor to apply.

use serde::Serialize;

use crate::document::DesignDocument;
use crate::event::{PointerEvent, PointerTarget};
use crate::geometry::{finite_or, Position};
use crate::layer::LayerId;
use crate::snap::{SnapEngine, SnapGuides};

/// Default double pointer-down window in milliseconds.
pub const DEFAULT_DOUBLE_CLICK_MS: u64 = 300;

/// Default minimum layer width in percent of canvas width.
pub const DEFAULT_MIN_WIDTH: f32 = 5.0;

/// Current interaction mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "mode", content = "layer", rename_all = "snake_case")]
pub enum InteractionMode {
    /// Nothing selected.
    #[default]
    Idle,
    /// A layer (or the background) is selected.
    Selected(LayerId),
    /// A layer is following the pointer.
    Dragging(LayerId),
    /// A layer's width is following the pointer.
    Resizing(LayerId),
    /// A text or button layer is being edited in place.
    EditingText(LayerId),
}

impl InteractionMode {
    /// Layer this mode refers to, if any.
    #[must_use]
    pub fn layer(&self) -> Option<&LayerId> {
        match self {
            Self::Idle => None,
            Self::Selected(id) | Self::Dragging(id) | Self::Resizing(id) | Self::EditingText(id) => {
                Some(id)
            }
        }
    }

    /// Whether a drag or resize gesture is in progress.
    #[must_use]
    pub fn is_gesture(&self) -> bool {
        matches!(self, Self::Dragging(_) | Self::Resizing(_))
    }
}

/// A document change requested by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Move a layer's centre anchor.
    Move {
        /// Target layer.
        id: LayerId,
        /// New anchor.
        position: Position,
    },
    /// Change a layer's width.
    Resize {
        /// Target layer.
        id: LayerId,
        /// New width in percent.
        width: f32,
    },
    /// Write edited text into a layer's content (a commit boundary).
    CommitText {
        /// Target layer.
        id: LayerId,
        /// Edited text.
        text: String,
    },
}

/// Tunables for the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    /// Maximum gap between pointer-downs that enters text editing.
    pub double_click_window_ms: u64,
    /// Minimum width a resize may produce.
    pub min_width: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            double_click_window_ms: DEFAULT_DOUBLE_CLICK_MS,
            min_width: DEFAULT_MIN_WIDTH,
        }
    }
}

/// Ephemeral interaction state owned by the editor. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    mode: InteractionMode,
    /// Pointer minus anchor at drag start, in percent.
    drag_offset: Option<(f32, f32)>,
    /// Guides shown during the current drag.
    guides: SnapGuides,
    /// Timestamp of the previous pointer-down on a layer.
    last_layer_down_ms: Option<u64>,
    /// Working copy of the text being edited.
    text_draft: Option<String>,
    config: InteractionConfig,
}

impl InteractionState {
    /// Create an idle state machine.
    #[must_use]
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    /// Selected id (the layer of any non-idle mode).
    #[must_use]
    pub fn selected(&self) -> Option<&LayerId> {
        self.mode.layer()
    }

    /// Layer being dragged.
    #[must_use]
    pub fn dragging(&self) -> Option<&LayerId> {
        match &self.mode {
            InteractionMode::Dragging(id) => Some(id),
            _ => None,
        }
    }

    /// Layer being resized.
    #[must_use]
    pub fn resizing(&self) -> Option<&LayerId> {
        match &self.mode {
            InteractionMode::Resizing(id) => Some(id),
            _ => None,
        }
    }

    /// Layer being text-edited.
    #[must_use]
    pub fn editing(&self) -> Option<&LayerId> {
        match &self.mode {
            InteractionMode::EditingText(id) => Some(id),
            _ => None,
        }
    }

    /// Current text draft while editing.
    #[must_use]
    pub fn text_draft(&self) -> Option<&str> {
        self.text_draft.as_deref()
    }

    /// Active snap guides.
    #[must_use]
    pub fn guides(&self) -> SnapGuides {
        self.guides
    }

    /// Captured drag offset.
    #[must_use]
    pub fn drag_offset(&self) -> Option<(f32, f32)> {
        self.drag_offset
    }

    /// Handle a pointer-down.
    pub fn pointer_down(&mut self, event: &PointerEvent, document: &DesignDocument) -> Vec<Effect> {
        let mut effects = Vec::new();
        // Only one gesture at a time.
        if self.mode.is_gesture() {
            tracing::debug!("Ignoring pointer-down during {:?}", self.mode);
            return effects;
        }
        let Some(target) = &event.target else {
            return effects;
        };

        match target {
            PointerTarget::Canvas => {
                effects.extend(self.finish_text_edit());
                self.enter(InteractionMode::Idle);
                self.last_layer_down_ms = None;
            }
            PointerTarget::ResizeHandle(id) => {
                let selected = matches!(&self.mode, InteractionMode::Selected(s) if s == id);
                let movable = document.layer(id).is_some_and(|l| l.accepts_pointer());
                if selected && movable {
                    self.enter(InteractionMode::Resizing(id.clone()));
                } else {
                    tracing::debug!("Ignoring resize handle for {id}");
                }
            }
            PointerTarget::Layer(id) if id.is_background() => {
                effects.extend(self.finish_text_edit());
                self.enter(InteractionMode::Selected(id.clone()));
            }
            PointerTarget::Layer(id) => {
                effects.extend(self.layer_down(id, event, document));
            }
        }
        effects
    }

    fn layer_down(
        &mut self,
        id: &LayerId,
        event: &PointerEvent,
        document: &DesignDocument,
    ) -> Vec<Effect> {
        let Some(layer) = document.layer(id) else {
            tracing::debug!("Pointer-down on unknown layer {id}");
            return Vec::new();
        };
        if !layer.accepts_pointer() {
            tracing::debug!("Pointer-down on inert layer {id}");
            return Vec::new();
        }
        if self.editing() == Some(id) {
            return Vec::new();
        }

        let effects: Vec<Effect> = self.finish_text_edit().into_iter().collect();
        let is_double = self.last_layer_down_ms.is_some_and(|last| {
            event.timestamp_ms.saturating_sub(last) <= self.config.double_click_window_ms
        });

        if is_double && layer.kind.is_text_editable() {
            self.text_draft = Some(layer.content.clone().unwrap_or_default());
            self.last_layer_down_ms = None;
            self.enter(InteractionMode::EditingText(id.clone()));
            return effects;
        }

        self.last_layer_down_ms = Some(event.timestamp_ms);
        let pointer = document.dimensions().to_percent(event.x, event.y);
        self.drag_offset = Some(pointer.offset_from(layer.anchor()));
        self.enter(InteractionMode::Selected(id.clone()));
        self.enter(InteractionMode::Dragging(id.clone()));
        effects
    }

    /// Handle a pointer-move. Returns the geometry change, if any.
    pub fn pointer_move(
        &mut self,
        event: &PointerEvent,
        document: &DesignDocument,
        snap: &SnapEngine,
    ) -> Option<Effect> {
        let dimensions = document.dimensions();
        let pointer = dimensions.to_percent(event.x, event.y);
        match self.mode.clone() {
            InteractionMode::Dragging(id) => {
                let (dx, dy) = self.drag_offset.unwrap_or_default();
                let proposed = Position::new(pointer.x - dx, pointer.y - dy).sanitized();
                let snapped = snap.snap(proposed);
                self.guides = snapped.guides;
                tracing::trace!(
                    "Drag {id} to ({:.2}, {:.2})",
                    snapped.position.x,
                    snapped.position.y
                );
                Some(Effect::Move {
                    id,
                    position: snapped.position,
                })
            }
            InteractionMode::Resizing(id) => {
                let anchor = document.layer(&id)?.anchor();
                let width = finite_or((pointer.x - anchor.x).abs() * 2.0, 0.0)
                    .max(self.config.min_width);
                tracing::trace!("Resize {id} to width {width:.2}");
                Some(Effect::Resize { id, width })
            }
            _ => None,
        }
    }

    /// Handle a pointer-up. Returns the layer whose gesture ended, if any.
    pub fn pointer_up(&mut self) -> Option<LayerId> {
        match self.mode.clone() {
            InteractionMode::Dragging(id) | InteractionMode::Resizing(id) => {
                self.guides = SnapGuides::default();
                self.drag_offset = None;
                self.enter(InteractionMode::Selected(id.clone()));
                Some(id)
            }
            _ => None,
        }
    }

    /// Replace the text draft while editing.
    pub fn text_input(&mut self, text: impl Into<String>) {
        if self.editing().is_some() {
            self.text_draft = Some(text.into());
        }
    }

    /// Handle loss of focus of the in-place editor.
    pub fn blur(&mut self) -> Option<Effect> {
        let effect = self.finish_text_edit();
        if let Some(Effect::CommitText { id, .. }) = &effect {
            self.enter(InteractionMode::Selected(id.clone()));
        }
        effect
    }

    /// Select a layer or the background from outside the canvas.
    pub fn select(&mut self, id: LayerId) -> Option<Effect> {
        if self.mode.is_gesture() {
            return None;
        }
        let effect = self.finish_text_edit();
        self.enter(InteractionMode::Selected(id));
        effect
    }

    /// Clear the selection, committing any text edit.
    pub fn clear_selection(&mut self) -> Option<Effect> {
        if self.mode.is_gesture() {
            return None;
        }
        let effect = self.finish_text_edit();
        self.enter(InteractionMode::Idle);
        effect
    }

    /// Panic reset: back to idle, discarding any draft and gesture.
    pub fn cancel(&mut self) {
        if self.mode != InteractionMode::Idle {
            tracing::debug!("Interaction cancelled from {:?}", self.mode);
        }
        let config = self.config;
        *self = Self::new(config);
    }

    /// Drop references to layers that no longer exist in `document`.
    pub fn reconcile(&mut self, document: &DesignDocument) {
        let stale = self
            .mode
            .layer()
            .is_some_and(|id| !id.is_background() && document.layer(id).is_none());
        if stale {
            self.cancel();
        } else if self.mode.is_gesture() || self.editing().is_some() {
            // The document was swapped underneath a gesture; keep the selection only.
            if let Some(id) = self.mode.layer().cloned() {
                self.guides = SnapGuides::default();
                self.drag_offset = None;
                self.text_draft = None;
                self.enter(InteractionMode::Selected(id));
            }
        }
    }

    fn finish_text_edit(&mut self) -> Option<Effect> {
        let InteractionMode::EditingText(id) = &self.mode else {
            return None;
        };
        let id = id.clone();
        let text = self.text_draft.take().unwrap_or_default();
        self.enter(InteractionMode::Selected(id.clone()));
        Some(Effect::CommitText { id, text })
    }

    fn enter(&mut self, mode: InteractionMode) {
        if self.mode != mode {
            tracing::trace!("Interaction {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }
}
