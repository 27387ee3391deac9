//! The document editor: the single owner of a design document.
//!
//! Pointer and keyboard input flows through the interaction state machine;
//! toolbar and inspector edits call the editing API directly. Every change
//! that reaches a commit boundary records one history snapshot, emits
//! [`EditorEvent`]s and invokes the commit callback.
//!
//! Live drag and resize geometry is written to the document on every move
//! but only recorded in history on pointer-up.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::{BackgroundPatch, DesignDocument};
use crate::event::{InputEvent, KeyCommand, PointerEvent, PointerPhase};
use crate::geometry::{Position, CENTRE};
use crate::history::{History, DEFAULT_HISTORY_DEPTH};
use crate::image_source::validate_image_reference;
use crate::interaction::{
    Effect, InteractionConfig, InteractionMode, InteractionState, DEFAULT_DOUBLE_CLICK_MS,
    DEFAULT_MIN_WIDTH,
};
use crate::layer::{Layer, LayerId, LayerKind, LayerPatch};
use crate::regeneration::{
    merge_regeneration, RegenerationGate, RegenerationOutcome, RegenerationScope,
    RegenerationTicket,
};
use crate::snap::{SnapEngine, SnapGuides, DEFAULT_SNAP_THRESHOLD};
use crate::CanvasResult;

/// Editor tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Snap distance in percentage points.
    pub snap_threshold: f32,
    /// Snap centreline in percent.
    pub snap_centre: f32,
    /// Minimum width a resize gesture may produce.
    pub min_width: f32,
    /// Maximum gap between pointer-downs that enters text editing.
    pub double_click_window_ms: u64,
    /// Maximum retained history snapshots.
    pub history_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            snap_centre: CENTRE,
            min_width: DEFAULT_MIN_WIDTH,
            double_click_window_ms: DEFAULT_DOUBLE_CLICK_MS,
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

impl EditorConfig {
    fn interaction(&self) -> InteractionConfig {
        InteractionConfig {
            double_click_window_ms: self.double_click_window_ms,
            min_width: self.min_width,
        }
    }

    fn snap_engine(&self) -> SnapEngine {
        SnapEngine::with_centre(self.snap_threshold, self.snap_centre)
    }
}

/// Layer-level mutation notifications for hosts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    /// A drag gesture committed a new anchor.
    LayerMoved {
        /// Layer moved.
        id: LayerId,
        /// Committed anchor.
        position: Position,
    },
    /// A resize gesture committed a new width.
    LayerResized {
        /// Layer resized.
        id: LayerId,
        /// Committed width in percent.
        width: f32,
    },
    /// Text or image content changed.
    ContentChanged {
        /// Layer edited.
        id: LayerId,
        /// New content.
        content: String,
    },
    /// Visibility toggled.
    VisibilityChanged {
        /// Layer toggled.
        id: LayerId,
        /// New effective visibility.
        visible: bool,
    },
    /// Lock toggled.
    LockChanged {
        /// Layer toggled.
        id: LayerId,
        /// New effective lock state.
        locked: bool,
    },
    /// A patch was merged into a layer.
    LayerUpdated {
        /// Layer patched.
        id: LayerId,
    },
    /// A layer was added on top of the stack.
    LayerAdded {
        /// New layer.
        id: LayerId,
    },
    /// A layer was removed.
    LayerRemoved {
        /// Removed layer.
        id: LayerId,
    },
    /// Paint order changed.
    LayersReordered {
        /// Ids in the new paint order.
        order: Vec<LayerId>,
    },
    /// Canvas size, background or overlay changed.
    BackgroundChanged,
    /// The whole document was swapped (load, undo, redo, regeneration).
    DocumentReplaced,
}

/// Callback invoked with the document at every commit.
pub type CommitCallback = Box<dyn FnMut(&DesignDocument) + Send>;

/// Owns a design document and everything needed to edit it.
pub struct DocumentEditor {
    document: DesignDocument,
    history: History,
    interaction: InteractionState,
    snap: SnapEngine,
    regeneration: RegenerationGate,
    config: EditorConfig,
    /// Whether the active gesture has changed the document.
    gesture_dirty: bool,
    events: Vec<EditorEvent>,
    on_commit: Option<CommitCallback>,
}

impl fmt::Debug for DocumentEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentEditor")
            .field("layers", &self.document.layers.len())
            .field("mode", self.interaction.mode())
            .field("history", &self.history.len())
            .field("cursor", &self.history.cursor())
            .field("locked", &self.regeneration.is_locked())
            .finish_non_exhaustive()
    }
}

impl Default for DocumentEditor {
    fn default() -> Self {
        Self::new(DesignDocument::default(), EditorConfig::default())
    }
}

impl DocumentEditor {
    /// Create an editor for `document`; the document becomes the first
    /// history entry.
    #[must_use]
    pub fn new(document: DesignDocument, config: EditorConfig) -> Self {
        Self {
            history: History::with_initial(document.clone(), config.history_depth),
            interaction: InteractionState::new(config.interaction()),
            snap: config.snap_engine(),
            regeneration: RegenerationGate::default(),
            config,
            gesture_dirty: false,
            events: Vec::new(),
            on_commit: None,
            document,
        }
    }

    /// Register the callback invoked at every commit.
    pub fn set_on_commit<F>(&mut self, callback: F)
    where
        F: FnMut(&DesignDocument) + Send + 'static,
    {
        self.on_commit = Some(Box::new(callback));
    }

    /// The live document.
    #[must_use]
    pub fn document(&self) -> &DesignDocument {
        &self.document
    }

    /// Snapshot history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Interaction state.
    #[must_use]
    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// Current interaction mode.
    #[must_use]
    pub fn mode(&self) -> &InteractionMode {
        self.interaction.mode()
    }

    /// Active snap guides.
    #[must_use]
    pub fn guides(&self) -> SnapGuides {
        self.interaction.guides()
    }

    /// Editor configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Whether a regeneration is in flight and pointer input is rejected.
    #[must_use]
    pub fn is_canvas_locked(&self) -> bool {
        self.regeneration.is_locked()
    }

    /// The regeneration request in flight.
    #[must_use]
    pub fn in_flight(&self) -> Option<RegenerationTicket> {
        self.regeneration.in_flight()
    }

    /// Take the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // ----- input routing -----

    /// Route any input event. Returns whether the document changed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Pointer(pointer) => match pointer.phase {
                PointerPhase::Down => self.pointer_down(pointer),
                PointerPhase::Move => self.pointer_move(pointer),
                PointerPhase::Up => self.pointer_up(),
            },
            InputEvent::Key { .. } => self.key_command(event.key_command()),
            InputEvent::TextInput { text } => {
                self.text_input(text);
                false
            }
            InputEvent::Blur => self.blur(),
        }
    }

    fn key_command(&mut self, command: Option<KeyCommand>) -> bool {
        let Some(command) = command else {
            return false;
        };
        if command == KeyCommand::Cancel {
            self.panic_unlock();
            return false;
        }
        // The in-place text editor owns undo and delete keys while focused.
        if self.is_canvas_locked() || self.interaction.editing().is_some() {
            return false;
        }
        match command {
            KeyCommand::Undo => self.undo(),
            KeyCommand::Redo => self.redo(),
            KeyCommand::Delete => self.delete_selected(),
            KeyCommand::Cancel => false,
        }
    }

    /// Handle a pointer-down. Returns whether the document changed (an
    /// implicit text commit).
    pub fn pointer_down(&mut self, event: &PointerEvent) -> bool {
        if self.is_canvas_locked() {
            tracing::debug!("Canvas locked, ignoring pointer-down");
            return false;
        }
        let mid_gesture = self.interaction.mode().is_gesture();
        let effects = self.interaction.pointer_down(event, &self.document);
        if !mid_gesture {
            self.gesture_dirty = false;
        }
        let mut changed = false;
        for effect in effects {
            changed |= self.apply_effect(effect);
        }
        changed
    }

    /// Handle a pointer-move. Returns whether live geometry changed.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> bool {
        if self.is_canvas_locked() {
            return false;
        }
        match self
            .interaction
            .pointer_move(event, &self.document, &self.snap)
        {
            Some(effect) => self.apply_effect(effect),
            None => false,
        }
    }

    /// Handle a pointer-up, committing the gesture if it changed anything.
    pub fn pointer_up(&mut self) -> bool {
        let resized = self.interaction.resizing().is_some();
        let Some(id) = self.interaction.pointer_up() else {
            return false;
        };
        if !std::mem::take(&mut self.gesture_dirty) {
            return false;
        }
        let Some(layer) = self.document.layer(&id) else {
            return false;
        };
        let event = if resized {
            EditorEvent::LayerResized {
                id: id.clone(),
                width: layer.width(),
            }
        } else {
            EditorEvent::LayerMoved {
                id: id.clone(),
                position: layer.anchor(),
            }
        };
        self.events.push(event);
        self.record(if resized { "resize" } else { "drag" });
        true
    }

    /// Update the in-place editor's draft.
    pub fn text_input(&mut self, text: &str) {
        self.interaction.text_input(text);
    }

    /// Commit the in-place editor's draft.
    pub fn blur(&mut self) -> bool {
        match self.interaction.blur() {
            Some(effect) => self.apply_effect(effect),
            None => false,
        }
    }

    /// Select a layer (or the background) from outside the canvas.
    pub fn select(&mut self, id: &LayerId) -> bool {
        if !id.is_background() && self.document.layer(id).is_none() {
            return false;
        }
        match self.interaction.select(id.clone()) {
            Some(effect) => self.apply_effect(effect),
            None => false,
        }
    }

    /// Clear the selection, committing any text edit.
    pub fn clear_selection(&mut self) -> bool {
        match self.interaction.clear_selection() {
            Some(effect) => self.apply_effect(effect),
            None => false,
        }
    }

    /// Reset interaction to idle, discarding any uncommitted gesture geometry
    /// and text draft.
    pub fn cancel(&mut self) {
        if std::mem::take(&mut self.gesture_dirty) {
            if let Some(committed) = self.history.current() {
                self.document = committed.clone();
            }
        }
        self.interaction.cancel();
    }

    /// Force the editor back to a usable state: interaction idle and the
    /// canvas unlocked. A regeneration in flight is abandoned, and its result
    /// will be dropped if it arrives.
    pub fn panic_unlock(&mut self) -> Option<RegenerationTicket> {
        self.cancel();
        self.regeneration.panic_unlock()
    }

    fn apply_effect(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::Move { id, position } => {
                let Some(layer) = self.document.layer_mut(&id) else {
                    return false;
                };
                if !layer.accepts_pointer() || layer.position == Some(position) {
                    return false;
                }
                layer.position = Some(position);
                self.gesture_dirty = true;
                true
            }
            Effect::Resize { id, width } => {
                let Some(layer) = self.document.layer_mut(&id) else {
                    return false;
                };
                if !layer.accepts_pointer() || layer.size.and_then(|s| s.width) == Some(width) {
                    return false;
                }
                let mut size = layer.size.unwrap_or_default();
                size.width = Some(width);
                layer.size = Some(size);
                self.gesture_dirty = true;
                true
            }
            Effect::CommitText { id, text } => {
                let Some(layer) = self.document.layer_mut(&id) else {
                    return false;
                };
                if layer.content.as_deref() == Some(text.as_str()) {
                    return false;
                }
                layer.content = Some(text.clone());
                self.events.push(EditorEvent::ContentChanged { id, content: text });
                self.record("text edit");
                true
            }
        }
    }

    fn delete_selected(&mut self) -> bool {
        let Some(id) = self.interaction.selected().cloned() else {
            return false;
        };
        if id.is_background() || self.document.layer(&id).is_some_and(Layer::is_locked) {
            return false;
        }
        self.remove_layer(&id).is_some()
    }

    // ----- editing API -----

    /// Shallow-merge a patch into a layer. No-op on an unknown id.
    ///
    /// Image content that fails to decode is rejected and the layer is left
    /// unchanged.
    pub fn update_layer(&mut self, id: &LayerId, patch: &LayerPatch) -> bool {
        let Some(layer) = self.document.layer_mut(id) else {
            tracing::debug!("update_layer: unknown layer {id}");
            return false;
        };
        if layer.kind == LayerKind::Image {
            if let Some(content) = &patch.content {
                if let Err(e) = validate_image_reference(content) {
                    tracing::warn!("Rejected image content for {id}: {e}");
                    return false;
                }
            }
        }
        if !layer.apply_patch(patch) {
            return false;
        }
        self.events.push(EditorEvent::LayerUpdated { id: id.clone() });
        self.interaction.reconcile(&self.document);
        self.record("update layer");
        true
    }

    /// Flip a layer's visibility (absent counts as visible).
    pub fn toggle_visibility(&mut self, id: &LayerId) -> bool {
        let Some(layer) = self.document.layer_mut(id) else {
            return false;
        };
        let visible = !layer.is_visible();
        layer.visible = Some(visible);
        self.events.push(EditorEvent::VisibilityChanged {
            id: id.clone(),
            visible,
        });
        self.record("toggle visibility");
        true
    }

    /// Flip a layer's lock (absent counts as unlocked).
    pub fn toggle_lock(&mut self, id: &LayerId) -> bool {
        let Some(layer) = self.document.layer_mut(id) else {
            return false;
        };
        let locked = !layer.is_locked();
        layer.locked = Some(locked);
        self.events.push(EditorEvent::LockChanged {
            id: id.clone(),
            locked,
        });
        self.record("toggle lock");
        true
    }

    /// Patch the canvas size, background, or overlay.
    pub fn set_background(&mut self, patch: &BackgroundPatch) -> bool {
        if let Some(Some(image)) = &patch.background_image {
            if let Err(e) = validate_image_reference(image) {
                tracing::warn!("Rejected background image: {e}");
                return false;
            }
        }
        if !self.document.apply_background(patch) {
            return false;
        }
        self.events.push(EditorEvent::BackgroundChanged);
        self.record("set background");
        true
    }

    /// Add a layer on top of the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, reserved, or already used.
    pub fn add_layer(&mut self, layer: Layer) -> CanvasResult<LayerId> {
        let id = self.document.add_layer(layer)?;
        self.events.push(EditorEvent::LayerAdded { id: id.clone() });
        self.record("add layer");
        Ok(id)
    }

    /// Remove a layer, returning it if it existed.
    pub fn remove_layer(&mut self, id: &LayerId) -> Option<Layer> {
        if self.interaction.mode().is_gesture() {
            return None;
        }
        let removed = self.document.remove_layer(id)?;
        self.events.push(EditorEvent::LayerRemoved { id: id.clone() });
        self.interaction.reconcile(&self.document);
        self.record("remove layer");
        Some(removed)
    }

    /// Move a layer to `index` in paint order.
    pub fn move_layer(&mut self, id: &LayerId, index: usize) -> bool {
        self.restack(|doc| doc.move_layer(id, index))
    }

    /// Move a layer above every other layer.
    pub fn bring_to_front(&mut self, id: &LayerId) -> bool {
        self.restack(|doc| doc.bring_to_front(id))
    }

    /// Move a layer beneath every other layer.
    pub fn send_to_back(&mut self, id: &LayerId) -> bool {
        self.restack(|doc| doc.send_to_back(id))
    }

    /// Move a layer one step up.
    pub fn raise(&mut self, id: &LayerId) -> bool {
        self.restack(|doc| doc.raise(id))
    }

    /// Move a layer one step down.
    pub fn lower(&mut self, id: &LayerId) -> bool {
        self.restack(|doc| doc.lower(id))
    }

    fn restack(&mut self, reorder: impl FnOnce(&mut DesignDocument) -> bool) -> bool {
        if !reorder(&mut self.document) {
            return false;
        }
        let order = self.document.layers.iter().map(|l| l.id.clone()).collect();
        self.events.push(EditorEvent::LayersReordered { order });
        self.record("restack");
        true
    }

    /// Replace the document wholesale and start a fresh history.
    pub fn load_document(&mut self, document: DesignDocument) {
        self.interaction.cancel();
        self.gesture_dirty = false;
        self.document = document;
        self.history.reset(self.document.clone());
        self.events.push(EditorEvent::DocumentReplaced);
        tracing::info!("Loaded document with {} layers", self.document.layers.len());
    }

    // ----- history -----

    /// Step back one commit. No-op during a gesture or at the oldest entry.
    pub fn undo(&mut self) -> bool {
        if self.interaction.mode().is_gesture() {
            return false;
        }
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot, "undo");
        true
    }

    /// Step forward one commit. No-op during a gesture or at the newest entry.
    pub fn redo(&mut self) -> bool {
        if self.interaction.mode().is_gesture() {
            return false;
        }
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot, "redo");
        true
    }

    /// Navigate to an arbitrary history entry without recording anything.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if self.interaction.mode().is_gesture() {
            return false;
        }
        let Some(snapshot) = self.history.jump_to(index).cloned() else {
            return false;
        };
        self.restore(snapshot, "jump");
        true
    }

    fn restore(&mut self, snapshot: DesignDocument, action: &str) {
        self.document = snapshot;
        self.interaction.reconcile(&self.document);
        self.events.push(EditorEvent::DocumentReplaced);
        tracing::debug!("History {action}: cursor {:?}", self.history.cursor());
        self.publish();
    }

    // ----- regeneration -----

    /// Start a regeneration request and lock the canvas.
    ///
    /// Any text edit is committed first; any gesture is cancelled. A request
    /// already in flight is superseded.
    pub fn begin_regeneration(&mut self, scope: RegenerationScope) -> RegenerationTicket {
        self.blur();
        self.cancel();
        let ticket = self.regeneration.begin(scope);
        tracing::info!("Regeneration #{} ({scope}) started", ticket.seq);
        ticket
    }

    /// Deliver a regeneration result. Applied only if `ticket` is the request
    /// in flight.
    pub fn complete_regeneration(
        &mut self,
        ticket: RegenerationTicket,
        result: DesignDocument,
    ) -> RegenerationOutcome {
        if !self.regeneration.settle(ticket) {
            tracing::warn!(
                "Dropping stale regeneration #{} ({})",
                ticket.seq,
                ticket.scope
            );
            return RegenerationOutcome::DroppedStale;
        }
        if let Err(e) = result.validate() {
            tracing::warn!("Regeneration #{} produced an invalid document: {e}", ticket.seq);
            return RegenerationOutcome::Failed;
        }
        let merged = merge_regeneration(ticket.scope, &self.document, result);
        if merged == self.document {
            tracing::info!("Regeneration #{} changed nothing", ticket.seq);
            return RegenerationOutcome::Applied;
        }
        self.document = merged;
        self.interaction.reconcile(&self.document);
        self.events.push(EditorEvent::DocumentReplaced);
        self.record("regeneration");
        tracing::info!("Regeneration #{} applied", ticket.seq);
        RegenerationOutcome::Applied
    }

    /// Report a failed regeneration. Unlocks the canvas if `ticket` is the
    /// request in flight; the document is unchanged either way.
    pub fn fail_regeneration(
        &mut self,
        ticket: RegenerationTicket,
        reason: &str,
    ) -> RegenerationOutcome {
        if self.regeneration.settle(ticket) {
            tracing::warn!("Regeneration #{} failed: {reason}", ticket.seq);
            RegenerationOutcome::Failed
        } else {
            tracing::debug!("Ignoring failure of stale regeneration #{}", ticket.seq);
            RegenerationOutcome::DroppedStale
        }
    }

    // ----- commit plumbing -----

    fn record(&mut self, action: &str) {
        self.history.push(self.document.clone());
        tracing::debug!(
            "Commit ({action}): {} history entries",
            self.history.len()
        );
        self.publish();
    }

    fn publish(&mut self) {
        if let Some(callback) = self.on_commit.as_mut() {
            callback(&self.document);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyModifiers, PointerTarget};
    use crate::geometry::CanvasSize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn editor() -> DocumentEditor {
        let mut doc = DesignDocument::new(CanvasSize::Square);
        doc.add_layer(
            Layer::new("title", LayerKind::Text)
                .with_position(50.0, 50.0)
                .with_width(40.0)
                .with_content("Hello"),
        )
        .expect("add");
        doc.add_layer(Layer::new("cta", LayerKind::Button).with_position(50.0, 80.0))
            .expect("add");
        DocumentEditor::new(doc, EditorConfig::default())
    }

    fn key(name: &str, modifiers: KeyModifiers) -> InputEvent {
        InputEvent::Key {
            key: name.into(),
            modifiers,
        }
    }

    fn ctrl() -> KeyModifiers {
        KeyModifiers {
            ctrl: true,
            ..KeyModifiers::default()
        }
    }

    fn id(s: &str) -> LayerId {
        s.into()
    }

    #[test]
    fn test_drag_commits_once() {
        let mut editor = editor();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        editor.set_on_commit(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        editor.pointer_down(&PointerEvent::down(540.0, 540.0, 0, PointerTarget::Layer(id("title"))));
        editor.pointer_move(&PointerEvent::moved(600.0, 540.0, 10));
        editor.pointer_move(&PointerEvent::moved(648.0, 540.0, 20));
        assert_eq!(editor.history().len(), 1);
        assert!(editor.pointer_up());

        assert_eq!(editor.history().len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let events = editor.drain_events();
        assert!(matches!(events.as_slice(), [EditorEvent::LayerMoved { .. }]));
    }

    #[test]
    fn test_pointer_down_mid_drag_keeps_commit() {
        let mut editor = editor();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        editor.set_on_commit(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        editor.pointer_down(&PointerEvent::down(540.0, 540.0, 0, PointerTarget::Layer(id("title"))));
        editor.pointer_move(&PointerEvent::moved(648.0, 540.0, 10));
        assert!(!editor.pointer_down(&PointerEvent::down(100.0, 100.0, 20, PointerTarget::Canvas)));
        assert!(editor.pointer_up());

        assert_eq!(editor.history().len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let head = editor
            .history()
            .current()
            .and_then(|doc| doc.layer(&id("title")))
            .map(Layer::anchor)
            .expect("committed title");
        assert!((head.x - 60.0).abs() < 0.01);
        assert!(matches!(
            editor.drain_events().as_slice(),
            [EditorEvent::LayerMoved { .. }]
        ));
    }

    #[test]
    fn test_click_without_move_records_nothing() {
        let mut editor = editor();
        editor.pointer_down(&PointerEvent::down(540.0, 540.0, 0, PointerTarget::Layer(id("title"))));
        assert!(!editor.pointer_up());
        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.mode(), &InteractionMode::Selected(id("title")));
    }

    #[test]
    fn test_update_layer_unknown_is_noop() {
        let mut editor = editor();
        assert!(!editor.update_layer(&id("nope"), &LayerPatch::content("x")));
        assert_eq!(editor.history().len(), 1);
        assert!(editor.drain_events().is_empty());
    }

    #[test]
    fn test_update_layer_merges() {
        let mut editor = editor();
        assert!(editor.update_layer(&id("title"), &LayerPatch::content("Bye")));
        let layer = editor.document().layer(&id("title")).expect("title");
        assert_eq!(layer.content.as_deref(), Some("Bye"));
        assert_eq!(layer.anchor(), Position::new(50.0, 50.0));
        assert!(!editor.update_layer(&id("title"), &LayerPatch::content("Bye")));
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_toggle_lock_and_visibility() {
        let mut editor = editor();
        assert!(editor.toggle_lock(&id("cta")));
        assert!(editor.document().layer(&id("cta")).is_some_and(Layer::is_locked));
        assert!(editor.toggle_visibility(&id("cta")));
        assert!(!editor.document().layer(&id("cta")).is_some_and(Layer::is_visible));
        assert!(!editor.toggle_lock(&id("missing")));
    }

    #[test]
    fn test_keyboard_undo_redo() {
        let mut editor = editor();
        editor.update_layer(&id("title"), &LayerPatch::content("One"));
        assert!(editor.handle_event(&key("z", ctrl())));
        assert_eq!(
            editor.document().layer(&id("title")).and_then(|l| l.content.as_deref()),
            Some("Hello")
        );
        assert!(editor.handle_event(&key("y", ctrl())));
        assert_eq!(
            editor.document().layer(&id("title")).and_then(|l| l.content.as_deref()),
            Some("One")
        );
    }

    #[test]
    fn test_delete_key_removes_selected() {
        let mut editor = editor();
        editor.select(&id("cta"));
        assert!(editor.handle_event(&key("Delete", KeyModifiers::default())));
        assert!(editor.document().layer(&id("cta")).is_none());
        assert_eq!(editor.mode(), &InteractionMode::Idle);

        editor.select(&LayerId::background());
        assert!(!editor.handle_event(&key("Backspace", KeyModifiers::default())));
    }

    #[test]
    fn test_text_edit_via_events() {
        let mut editor = editor();
        let target = PointerTarget::Layer(id("title"));
        editor.pointer_down(&PointerEvent::down(540.0, 540.0, 100, target.clone()));
        editor.pointer_up();
        editor.pointer_down(&PointerEvent::down(540.0, 540.0, 250, target));
        assert_eq!(editor.mode(), &InteractionMode::EditingText(id("title")));

        editor.handle_event(&InputEvent::TextInput {
            text: "Edited".into(),
        });
        // Delete while editing belongs to the text field.
        assert!(!editor.handle_event(&key("Delete", KeyModifiers::default())));
        assert!(editor.handle_event(&InputEvent::Blur));
        assert_eq!(
            editor.document().layer(&id("title")).and_then(|l| l.content.as_deref()),
            Some("Edited")
        );
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_locked_canvas_rejects_pointer() {
        let mut editor = editor();
        let ticket = editor.begin_regeneration(RegenerationScope::TextOnly);
        editor.pointer_down(&PointerEvent::down(540.0, 540.0, 0, PointerTarget::Layer(id("title"))));
        assert_eq!(editor.mode(), &InteractionMode::Idle);
        assert!(editor.is_canvas_locked());

        let mut result = editor.document().clone();
        if let Some(layer) = result.layer_mut(&id("title")) {
            layer.content = Some("Generated".into());
        }
        assert_eq!(
            editor.complete_regeneration(ticket, result),
            RegenerationOutcome::Applied
        );
        assert!(!editor.is_canvas_locked());
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_escape_unlocks_and_drops_late_result() {
        let mut editor = editor();
        let ticket = editor.begin_regeneration(RegenerationScope::All);
        editor.handle_event(&key("Escape", KeyModifiers::default()));
        assert!(!editor.is_canvas_locked());

        let outcome = editor.complete_regeneration(ticket, DesignDocument::default());
        assert_eq!(outcome, RegenerationOutcome::DroppedStale);
        assert_eq!(editor.document().layers.len(), 2);
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_cancel_mid_drag_reverts_live_geometry() {
        let mut editor = editor();
        editor.pointer_down(&PointerEvent::down(540.0, 540.0, 0, PointerTarget::Layer(id("title"))));
        editor.pointer_move(&PointerEvent::moved(800.0, 200.0, 5));
        editor.cancel();
        assert_eq!(
            editor.document().layer(&id("title")).map(Layer::anchor),
            Some(Position::new(50.0, 50.0))
        );
        assert_eq!(editor.mode(), &InteractionMode::Idle);
    }

    #[test]
    fn test_restack_emits_order() {
        let mut editor = editor();
        assert!(editor.send_to_back(&id("cta")));
        let events = editor.drain_events();
        assert_eq!(
            events,
            vec![EditorEvent::LayersReordered {
                order: vec![id("cta"), id("title")]
            }]
        );
        assert!(!editor.send_to_back(&id("cta")));
    }

    #[test]
    fn test_editor_config_defaults_from_partial_json() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"snap_threshold": 4.0}"#).expect("parse");
        assert!((config.snap_threshold - 4.0).abs() < f32::EPSILON);
        assert_eq!(config.history_depth, DEFAULT_HISTORY_DEPTH);
        assert_eq!(config.double_click_window_ms, DEFAULT_DOUBLE_CLICK_MS);
    }
}
