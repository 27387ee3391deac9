//! Async host around a [`DocumentEditor`].
//!
//! ```text
//!  regenerate(scope)
//!    │ lock ── begin_regeneration ── unlock
//!    ▼
//!  spawn(generate + retry ─▶ decode payloads on blocking pool)
//!    │
//!    ├── finishes first ──▶ lock ── complete_regeneration (stale check)
//!    │
//!    └── panic timeout ───▶ lock ── panic_unlock
//!                           call keeps running; its late result is
//!                           handed to the editor and dropped as stale
//! ```
//!
//! The editor mutex is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use adcanvas_core::{
    DesignDocument, DocumentEditor, EditorEvent, InputEvent, PointerEvent, PointerPhase,
    PointerTarget, RegenerationOutcome, RegenerationScope, RegenerationTicket,
};
use adcanvas_renderer::backend::svg::render_svg;
use adcanvas_renderer::{ExportConfig, ExportFormat, Exporter, Renderer, Viewport};
use tokio::task::JoinHandle;

use crate::config::{RetryConfig, StudioConfig};
use crate::error::{StudioError, StudioResult};
use crate::generation::{GenerationRequest, GenerationService};
use crate::payload::{decode_images_in_background, restore_rejected, DecodedImages};

/// Extra reach around resize handles when hit-testing, in canvas units.
const HANDLE_SLOP: f32 = 6.0;

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the editor, a renderer, and the generation backend.
pub struct Studio {
    editor: Arc<Mutex<DocumentEditor>>,
    renderer: Mutex<Renderer>,
    service: Arc<dyn GenerationService>,
    config: StudioConfig,
    late_results: Mutex<Vec<JoinHandle<()>>>,
}

impl Studio {
    /// Open `document` for editing.
    #[must_use]
    pub fn new(
        document: DesignDocument,
        service: Arc<dyn GenerationService>,
        config: StudioConfig,
    ) -> Self {
        let editor = DocumentEditor::new(document, config.editor);
        let renderer = Renderer::new(config.render.clone());
        Self {
            editor: Arc::new(Mutex::new(editor)),
            renderer: Mutex::new(renderer),
            service,
            config,
            late_results: Mutex::new(Vec::new()),
        }
    }

    /// Studio configuration.
    #[must_use]
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Run `f` with exclusive access to the editor.
    pub fn with_editor<R>(&self, f: impl FnOnce(&mut DocumentEditor) -> R) -> R {
        f(&mut lock(&self.editor))
    }

    /// A copy of the current document.
    #[must_use]
    pub fn document(&self) -> DesignDocument {
        lock(&self.editor).document().clone()
    }

    /// Whether a regeneration currently locks the canvas.
    #[must_use]
    pub fn is_canvas_locked(&self) -> bool {
        lock(&self.editor).is_canvas_locked()
    }

    /// Route an input event to the editor. Returns whether the document changed.
    pub fn handle_event(&self, event: &InputEvent) -> bool {
        lock(&self.editor).handle_event(event)
    }

    /// Force interaction back to idle and release any regeneration lock.
    pub fn panic_unlock(&self) -> Option<RegenerationTicket> {
        lock(&self.editor).panic_unlock()
    }

    /// Take the pending mutation events.
    pub fn drain_events(&self) -> Vec<EditorEvent> {
        lock(&self.editor).drain_events()
    }

    /// Resolve what canvas coordinates (`x`, `y`) land on in the current frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be rendered.
    pub fn hit_test(&self, x: f32, y: f32) -> StudioResult<Option<PointerTarget>> {
        let editor = lock(&self.editor);
        let mut renderer = lock(&self.renderer);
        renderer.render(editor.document(), Some(editor.interaction()))?;
        Ok(renderer.hit_test(x, y, HANDLE_SLOP))
    }

    /// Build a pointer event from host surface coordinates.
    ///
    /// Coordinates are mapped through `viewport` into canvas units; a press
    /// is hit-tested against the current frame to find its target.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be rendered.
    pub fn surface_pointer(
        &self,
        viewport: &Viewport,
        phase: PointerPhase,
        surface_x: f32,
        surface_y: f32,
        timestamp_ms: u64,
    ) -> StudioResult<PointerEvent> {
        let (x, y) = viewport.to_canvas(surface_x, surface_y);
        let target = match phase {
            PointerPhase::Down if viewport.contains(surface_x, surface_y) => self.hit_test(x, y)?,
            PointerPhase::Down | PointerPhase::Move | PointerPhase::Up => None,
        };
        Ok(PointerEvent {
            phase,
            x,
            y,
            timestamp_ms,
            target,
        })
    }

    /// The current frame as SVG, including editor chrome when enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be rendered.
    pub fn preview_svg(&self) -> StudioResult<String> {
        let editor = lock(&self.editor);
        let mut renderer = lock(&self.renderer);
        let config = renderer.config().clone();
        let frame = renderer.render(editor.document(), Some(editor.interaction()))?;
        Ok(render_svg(frame, &config, config.show_chrome, 1.0))
    }

    /// Export the current document without chrome.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn export(&self, format: ExportFormat, export: &ExportConfig) -> StudioResult<Vec<u8>> {
        let document = self.document();
        let mut renderer = lock(&self.renderer);
        let exporter = Exporter::new(export.clone(), renderer.config().clone());
        let frame = renderer.render(&document, None)?;
        Ok(exporter.export(frame, format)?)
    }

    /// Regenerate the document (or the part named by `scope`).
    ///
    /// The canvas is locked until the call resolves or the panic timeout
    /// elapses, whichever comes first. After a timeout the call keeps
    /// running in the background and its result is dropped as stale.
    ///
    /// # Errors
    ///
    /// Returns the generation failure, or [`StudioError::TimedOut`].
    pub async fn regenerate(
        &self,
        scope: RegenerationScope,
        prompt: Option<String>,
    ) -> StudioResult<RegenerationOutcome> {
        let (ticket, document) = {
            let mut editor = lock(&self.editor);
            let ticket = editor.begin_regeneration(scope);
            (ticket, editor.document().clone())
        };
        let request = GenerationRequest {
            scope,
            document,
            prompt,
        };
        let service = Arc::clone(&self.service);
        let retry = self.config.retry.clone();
        let mut call = tokio::spawn(async move {
            let document = generate_with_retry(service.as_ref(), request, &retry).await?;
            decode_images_in_background(document).await
        });

        let timeout = self.config.panic_timeout();
        tokio::select! {
            joined = &mut call => {
                let result = joined.map_err(StudioError::from).and_then(|result| result);
                self.settle(ticket, result)
            }
            () = tokio::time::sleep(timeout) => {
                {
                    let mut editor = lock(&self.editor);
                    if editor.in_flight() == Some(ticket) {
                        editor.panic_unlock();
                    }
                }
                tracing::warn!(
                    "Regeneration #{} exceeded {}s, canvas unlocked",
                    ticket.seq,
                    timeout.as_secs()
                );
                let editor = Arc::clone(&self.editor);
                let late = tokio::spawn(async move {
                    let result = call.await;
                    let mut editor = lock(&editor);
                    match result {
                        Ok(Ok((document, _))) => {
                            editor.complete_regeneration(ticket, document);
                        }
                        Ok(Err(e)) => {
                            editor.fail_regeneration(ticket, &e.to_string());
                        }
                        Err(e) => {
                            tracing::warn!("Late regeneration #{} task failed: {e}", ticket.seq);
                        }
                    }
                });
                lock(&self.late_results).push(late);
                Err(StudioError::TimedOut { seq: ticket.seq, after: timeout })
            }
        }
    }

    /// Wait for every abandoned call to finish and be discarded.
    pub async fn settle_late_results(&self) {
        let handles = std::mem::take(&mut *lock(&self.late_results));
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Late regeneration task failed: {e}");
            }
        }
    }

    fn settle(
        &self,
        ticket: RegenerationTicket,
        result: StudioResult<(DesignDocument, DecodedImages)>,
    ) -> StudioResult<RegenerationOutcome> {
        let (mut document, decoded) = match result {
            Ok(value) => value,
            Err(e) => {
                lock(&self.editor).fail_regeneration(ticket, &e.to_string());
                return Err(e);
            }
        };
        let outcome = {
            let mut editor = lock(&self.editor);
            restore_rejected(&mut document, editor.document(), &decoded.rejected);
            editor.complete_regeneration(ticket, document)
        };
        if outcome == RegenerationOutcome::Applied {
            let mut renderer = lock(&self.renderer);
            for (src, size) in decoded.sizes {
                renderer.sizes_mut().insert(src, size);
            }
        }
        Ok(outcome)
    }
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Call `service`, retrying transient failures with backoff.
async fn generate_with_retry(
    service: &dyn GenerationService,
    request: GenerationRequest,
    retry: &RetryConfig,
) -> StudioResult<DesignDocument> {
    let mut attempt = 0;
    loop {
        match service.generate(request.clone()).await {
            Ok(document) => return Ok(document),
            Err(error) if error.is_retryable() && attempt + 1 < retry.max_attempts => {
                let delay = retry.delay_for_attempt(attempt);
                tracing::warn!(
                    "Generation ({}) failed (attempt {}/{}), retrying in {}ms: {}",
                    request.scope,
                    attempt + 1,
                    retry.max_attempts,
                    delay.as_millis(),
                    error
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(StudioError::Generation(error)),
        }
    }
}
