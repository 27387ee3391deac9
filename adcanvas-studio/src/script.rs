//! Editing scripts: recorded sessions replayed against a studio.
//!
//! A script is a JSON array of steps tagged by `op`:
//!
//! ```json
//! [
//!   { "op": "drag", "id": "headline", "dx": 10, "dy": 0 },
//!   { "op": "edit_text", "id": "headline", "text": "Fresh roast" },
//!   { "op": "regenerate", "scope": "art-only" },
//!   { "op": "undo" }
//! ]
//! ```
//!
//! Gestures are synthesised as pointer events, so they run through the same
//! state machine, snapping, and lock checks as live input.

use adcanvas_core::{
    BackgroundPatch, InputEvent, KeyModifiers, Layer, LayerId, LayerPatch, PointerEvent,
    PointerPhase, PointerTarget, RegenerationOutcome, RegenerationScope,
};
use adcanvas_renderer::Viewport;
use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};
use crate::studio::Studio;

/// Gap between synthesised pointer events of one gesture.
const FRAME_MS: u64 = 16;
/// Gap inserted before every step so separate steps never read as a double click.
const STEP_GAP_MS: u64 = 1_000;

/// One scripted editing action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Select a layer (or `background`).
    Select {
        /// Layer to select.
        id: LayerId,
    },
    /// Deselect everything.
    ClearSelection,
    /// Drag a layer by a percentage offset.
    Drag {
        /// Layer to drag.
        id: LayerId,
        /// Horizontal offset in percent of canvas width.
        dx: f32,
        /// Vertical offset in percent of canvas height.
        dy: f32,
    },
    /// Resize a layer with its handle to a target width in percent.
    Resize {
        /// Layer to resize.
        id: LayerId,
        /// Target width in percent of canvas width.
        width: f32,
    },
    /// Double-click a layer, type `text`, and blur.
    EditText {
        /// Text or button layer.
        id: LayerId,
        /// Replacement text.
        text: String,
    },
    /// A raw pointer event in canvas units; targets are hit-tested.
    Pointer {
        /// Event phase.
        phase: PointerPhase,
        /// X in canvas units.
        x: f32,
        /// Y in canvas units.
        y: f32,
    },
    /// A key press.
    Key {
        /// Key name (`"Escape"`, `"z"`, `"Delete"`, ...).
        key: String,
        /// Active modifiers.
        #[serde(default)]
        modifiers: KeyModifiers,
    },
    /// Shallow-merge fields into a layer.
    Update {
        /// Layer to update.
        id: LayerId,
        /// Fields to merge.
        patch: LayerPatch,
    },
    /// Flip a layer's visibility.
    ToggleVisibility {
        /// Layer to toggle.
        id: LayerId,
    },
    /// Flip a layer's lock.
    ToggleLock {
        /// Layer to toggle.
        id: LayerId,
    },
    /// Change background fields.
    SetBackground {
        /// Fields to change.
        patch: BackgroundPatch,
    },
    /// Append a layer.
    AddLayer {
        /// The new layer.
        layer: Layer,
    },
    /// Remove a layer.
    RemoveLayer {
        /// Layer to remove.
        id: LayerId,
    },
    /// Move a layer to a stacking index.
    MoveLayer {
        /// Layer to move.
        id: LayerId,
        /// Target index, clamped to the layer count.
        index: usize,
    },
    /// Paint a layer above all others.
    BringToFront {
        /// Layer to move.
        id: LayerId,
    },
    /// Paint a layer below all others.
    SendToBack {
        /// Layer to move.
        id: LayerId,
    },
    /// Undo the last commit.
    Undo,
    /// Redo the last undone commit.
    Redo,
    /// Ask the generation backend for a new version.
    Regenerate {
        /// What to regenerate.
        #[serde(default = "default_scope")]
        scope: RegenerationScope,
        /// Optional creative direction.
        #[serde(default)]
        prompt: Option<String>,
    },
}

fn default_scope() -> RegenerationScope {
    RegenerationScope::All
}

impl ScriptStep {
    /// The step's `op` tag.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::Select { .. } => "select",
            Self::ClearSelection => "clear_selection",
            Self::Drag { .. } => "drag",
            Self::Resize { .. } => "resize",
            Self::EditText { .. } => "edit_text",
            Self::Pointer { .. } => "pointer",
            Self::Key { .. } => "key",
            Self::Update { .. } => "update",
            Self::ToggleVisibility { .. } => "toggle_visibility",
            Self::ToggleLock { .. } => "toggle_lock",
            Self::SetBackground { .. } => "set_background",
            Self::AddLayer { .. } => "add_layer",
            Self::RemoveLayer { .. } => "remove_layer",
            Self::MoveLayer { .. } => "move_layer",
            Self::BringToFront { .. } => "bring_to_front",
            Self::SendToBack { .. } => "send_to_back",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Regenerate { .. } => "regenerate",
        }
    }
}

/// Parse a JSON script.
///
/// # Errors
///
/// Returns an error if the text is not a JSON array of steps.
pub fn parse_script(text: &str) -> StudioResult<Vec<ScriptStep>> {
    Ok(serde_json::from_str(text)?)
}

/// What one step did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    /// Zero-based step index.
    pub step: usize,
    /// The step's `op` tag.
    pub op: &'static str,
    /// Whether the document changed.
    pub changed: bool,
    /// Outcome of a regeneration step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RegenerationOutcome>,
    /// Generation failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Replays scripts against a [`Studio`] with a synthetic clock.
#[derive(Debug, Default)]
pub struct ScriptRunner {
    clock_ms: u64,
}

impl ScriptRunner {
    /// Create a runner starting at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every step in order.
    ///
    /// Invalid targets are no-ops and generation failures are recorded in
    /// the report; any other error aborts the script.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Script`] naming the step that failed.
    pub async fn run(&mut self, studio: &Studio, steps: &[ScriptStep]) -> StudioResult<Vec<StepReport>> {
        let mut reports = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            self.clock_ms += STEP_GAP_MS;
            let mut report = StepReport {
                step: index,
                op: step.op(),
                changed: false,
                outcome: None,
                error: None,
            };
            match step {
                ScriptStep::Regenerate { scope, prompt } => {
                    match studio.regenerate(*scope, prompt.clone()).await {
                        Ok(outcome) => {
                            report.changed = outcome == RegenerationOutcome::Applied;
                            report.outcome = Some(outcome);
                        }
                        Err(e @ (StudioError::Generation(_) | StudioError::TimedOut { .. })) => {
                            tracing::warn!("Step {index}: {e}");
                            report.error = Some(e.to_string());
                        }
                        Err(e) => return Err(script_error(index, &e)),
                    }
                }
                other => {
                    report.changed = self
                        .apply(studio, other)
                        .map_err(|e| script_error(index, &e))?;
                }
            }
            tracing::debug!("Step {index} ({}) changed={}", report.op, report.changed);
            reports.push(report);
        }
        Ok(reports)
    }

    fn apply(&mut self, studio: &Studio, step: &ScriptStep) -> StudioResult<bool> {
        let changed = match step {
            ScriptStep::Select { id } => {
                studio.with_editor(|editor| editor.select(id));
                false
            }
            ScriptStep::ClearSelection => {
                studio.with_editor(adcanvas_core::DocumentEditor::clear_selection);
                false
            }
            ScriptStep::Drag { id, dx, dy } => self.drag(studio, id, *dx, *dy),
            ScriptStep::Resize { id, width } => self.resize(studio, id, *width),
            ScriptStep::EditText { id, text } => self.edit_text(studio, id, text),
            ScriptStep::Pointer { phase, x, y } => {
                let viewport = Viewport::identity(studio.document().dimensions());
                let event = studio.surface_pointer(&viewport, *phase, *x, *y, self.tick())?;
                studio.handle_event(&InputEvent::Pointer(event))
            }
            ScriptStep::Key { key, modifiers } => studio.handle_event(&InputEvent::Key {
                key: key.clone(),
                modifiers: *modifiers,
            }),
            ScriptStep::Update { id, patch } => {
                studio.with_editor(|editor| editor.update_layer(id, patch))
            }
            ScriptStep::ToggleVisibility { id } => {
                studio.with_editor(|editor| editor.toggle_visibility(id))
            }
            ScriptStep::ToggleLock { id } => studio.with_editor(|editor| editor.toggle_lock(id)),
            ScriptStep::SetBackground { patch } => {
                studio.with_editor(|editor| editor.set_background(patch))
            }
            ScriptStep::AddLayer { layer } => {
                studio.with_editor(|editor| editor.add_layer(layer.clone()))?;
                true
            }
            ScriptStep::RemoveLayer { id } => {
                studio.with_editor(|editor| editor.remove_layer(id).is_some())
            }
            ScriptStep::MoveLayer { id, index } => {
                studio.with_editor(|editor| editor.move_layer(id, *index))
            }
            ScriptStep::BringToFront { id } => {
                studio.with_editor(|editor| editor.bring_to_front(id))
            }
            ScriptStep::SendToBack { id } => studio.with_editor(|editor| editor.send_to_back(id)),
            ScriptStep::Undo => studio.with_editor(adcanvas_core::DocumentEditor::undo),
            ScriptStep::Redo => studio.with_editor(adcanvas_core::DocumentEditor::redo),
            ScriptStep::Regenerate { .. } => false,
        };
        Ok(changed)
    }

    fn tick(&mut self) -> u64 {
        self.clock_ms += FRAME_MS;
        self.clock_ms
    }

    /// Pointer-down on the layer's anchor, move by the offset, release.
    fn drag(&mut self, studio: &Studio, id: &LayerId, dx: f32, dy: f32) -> bool {
        let Some((x, y, _)) = anchor_pixels(studio, id) else {
            return false;
        };
        let dims = studio.document().dimensions();
        let (to_x, to_y) = (
            x + adcanvas_core::geometry::percent_to_pixels(dx, dims.width),
            y + adcanvas_core::geometry::percent_to_pixels(dy, dims.height),
        );
        let down = PointerEvent::down(x, y, self.tick(), PointerTarget::Layer(id.clone()));
        let moved = PointerEvent::moved(to_x, to_y, self.tick());
        let up = PointerEvent::up(to_x, to_y, self.tick());
        gesture(studio, [down, moved, up])
    }

    /// Grab the handle at the right edge and pull it to half the target width.
    fn resize(&mut self, studio: &Studio, id: &LayerId, width: f32) -> bool {
        let Some((x, y, half_width)) = anchor_pixels(studio, id) else {
            return false;
        };
        let dims = studio.document().dimensions();
        let to_x = x + adcanvas_core::geometry::percent_to_pixels(width / 2.0, dims.width);
        studio.with_editor(|editor| editor.select(id));
        let down = PointerEvent::down(
            x + half_width,
            y,
            self.tick(),
            PointerTarget::ResizeHandle(id.clone()),
        );
        let moved = PointerEvent::moved(to_x, y, self.tick());
        let up = PointerEvent::up(to_x, y, self.tick());
        gesture(studio, [down, moved, up])
    }

    /// Double pointer-down to enter text editing, type, then blur.
    fn edit_text(&mut self, studio: &Studio, id: &LayerId, text: &str) -> bool {
        let Some((x, y, _)) = anchor_pixels(studio, id) else {
            return false;
        };
        let target = PointerTarget::Layer(id.clone());
        let events = [
            PointerEvent::down(x, y, self.tick(), target.clone()),
            PointerEvent::up(x, y, self.tick()),
            PointerEvent::down(x, y, self.tick(), target),
            PointerEvent::up(x, y, self.tick()),
        ];
        let mut changed = gesture(studio, events);
        changed |= studio.handle_event(&InputEvent::TextInput {
            text: text.to_string(),
        });
        changed |= studio.handle_event(&InputEvent::Blur);
        changed
    }

}

/// Feed a pointer sequence; true if any event changed the document.
fn gesture<const N: usize>(studio: &Studio, events: [PointerEvent; N]) -> bool {
    events.into_iter().fold(false, |changed, event| {
        studio.handle_event(&InputEvent::Pointer(event)) | changed
    })
}

/// Anchor of a layer in canvas units, plus half its width.
fn anchor_pixels(studio: &Studio, id: &LayerId) -> Option<(f32, f32, f32)> {
    studio.with_editor(|editor| {
        let document = editor.document();
        let layer = document.layer(id)?.resolve();
        let dims = document.dimensions();
        let (x, y) = dims.to_pixels(layer.position);
        let half = adcanvas_core::geometry::percent_to_pixels(layer.width, dims.width) / 2.0;
        Some((x, y, half))
    })
}

fn script_error(step: usize, error: &StudioError) -> StudioError {
    StudioError::Script {
        step,
        message: error.to_string(),
    }
}
