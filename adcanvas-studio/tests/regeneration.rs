//! Regeneration Integration Tests
//!
//! Drives a [`Studio`] against scripted generation backends with a paused
//! tokio clock:
//! - Scope merges
//! - Panic unlock after the timeout and late-result discard
//! - Retry of transient failures
//! - Superseded requests
//! - Canvas lock during a call
//! - Script replay

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adcanvas_core::{
    CanvasSize, DesignDocument, InputEvent, KeyModifiers, Layer, LayerKind, PointerEvent,
    PointerTarget, RegenerationOutcome, RegenerationScope,
};
use adcanvas_studio::{
    parse_script, GenerationError, GenerationRequest, GenerationService, RetryConfig,
    ScriptRunner, Studio, StudioConfig, StudioError,
};
use async_trait::async_trait;

// ============================================================================
// Helpers
// ============================================================================

/// Square canvas with a headline and a hero image.
fn document() -> DesignDocument {
    let mut doc = DesignDocument::new(CanvasSize::Square);
    doc.add_layer(
        Layer::new("headline", LayerKind::Text)
            .with_position(50.0, 20.0)
            .with_width(60.0)
            .with_content("Summer sale"),
    )
    .expect("add headline");
    doc.add_layer(
        Layer::new("hero", LayerKind::Image)
            .with_position(50.0, 60.0)
            .with_content("https://cdn.example.com/hero.png"),
    )
    .expect("add hero");
    doc
}

/// What a generation backend might send back: new copy, new art, new layout.
fn regenerated() -> DesignDocument {
    let mut doc = document();
    doc.background_color = "#112233".into();
    if let Some(layer) = doc.layer_mut(&"headline".into()) {
        layer.content = Some("Winter sale".into());
        layer.position = Some(adcanvas_core::Position { x: 30.0, y: 80.0 });
    }
    if let Some(layer) = doc.layer_mut(&"hero".into()) {
        layer.content = Some("https://cdn.example.com/winter.png".into());
    }
    doc
}

fn content(doc: &DesignDocument, id: &str) -> Option<String> {
    doc.layer(&id.into()).and_then(|l| l.content.clone())
}

fn studio(service: impl GenerationService + 'static) -> Studio {
    Studio::new(document(), Arc::new(service), StudioConfig::default())
}

/// Replies from a queue, one `(latency, result)` per call.
#[derive(Default)]
struct ScriptedService {
    replies: Mutex<VecDeque<(Duration, Result<DesignDocument, GenerationError>)>>,
    calls: AtomicU32,
}

impl ScriptedService {
    fn reply(self, latency: Duration, result: Result<DesignDocument, GenerationError>) -> Self {
        self.replies
            .lock()
            .expect("replies")
            .push_back((latency, result));
        self
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn generate(
        &self,
        _request: GenerationRequest,
    ) -> Result<DesignDocument, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().expect("replies").pop_front();
        let Some((latency, result)) = reply else {
            return Err(GenerationError::Rejected("no reply queued".into()));
        };
        tokio::time::sleep(latency).await;
        result
    }
}

/// Same answer every time after a fixed delay.
struct SlowService(Duration);

#[async_trait]
impl GenerationService for SlowService {
    async fn generate(
        &self,
        _request: GenerationRequest,
    ) -> Result<DesignDocument, GenerationError> {
        tokio::time::sleep(self.0).await;
        Ok(regenerated())
    }
}

// ============================================================================
// Scope merges
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_regenerate_all_replaces_document() {
    let studio = studio(SlowService(Duration::from_secs(2)));
    let before = studio.with_editor(|editor| editor.history().len());

    let outcome = studio
        .regenerate(RegenerationScope::All, Some("winter".into()))
        .await
        .expect("regenerate");

    assert_eq!(outcome, RegenerationOutcome::Applied);
    assert_eq!(studio.document(), regenerated());
    assert!(!studio.is_canvas_locked());
    assert_eq!(studio.with_editor(|editor| editor.history().len()), before + 1);
}

#[tokio::test(start_paused = true)]
async fn test_text_only_keeps_layout_and_art() {
    let studio = studio(SlowService(Duration::from_secs(1)));
    studio
        .regenerate(RegenerationScope::TextOnly, None)
        .await
        .expect("regenerate");

    let doc = studio.document();
    assert_eq!(content(&doc, "headline").as_deref(), Some("Winter sale"));
    assert_eq!(
        content(&doc, "hero").as_deref(),
        Some("https://cdn.example.com/hero.png")
    );
    assert_eq!(doc.background_color, document().background_color);
    let headline = doc.layer(&"headline".into()).expect("headline").anchor();
    assert!((headline.x - 50.0).abs() < f32::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn test_art_and_layout_scopes() {
    let studio = studio(SlowService(Duration::from_secs(1)));
    studio
        .regenerate(RegenerationScope::ArtOnly, None)
        .await
        .expect("art");
    let doc = studio.document();
    assert_eq!(doc.background_color, "#112233");
    assert_eq!(
        content(&doc, "hero").as_deref(),
        Some("https://cdn.example.com/winter.png")
    );
    assert_eq!(content(&doc, "headline").as_deref(), Some("Summer sale"));

    studio
        .regenerate(RegenerationScope::LayoutOnly, None)
        .await
        .expect("layout");
    let doc = studio.document();
    let headline = doc.layer(&"headline".into()).expect("headline").anchor();
    assert!((headline.x - 30.0).abs() < f32::EPSILON);
    assert!((headline.y - 80.0).abs() < f32::EPSILON);
    assert_eq!(content(&doc, "headline").as_deref(), Some("Summer sale"));
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_result_adds_no_history() {
    let service = ScriptedService::default().reply(Duration::from_millis(10), Ok(document()));
    let studio = studio(service);
    let before = studio.with_editor(|editor| editor.history().len());

    let outcome = studio
        .regenerate(RegenerationScope::All, None)
        .await
        .expect("regenerate");
    assert_eq!(outcome, RegenerationOutcome::Applied);
    assert_eq!(studio.with_editor(|editor| editor.history().len()), before);
}

// ============================================================================
// Panic unlock
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_slow_call_times_out_and_late_result_is_dropped() {
    let studio = studio(SlowService(Duration::from_secs(60)));

    let err = studio
        .regenerate(RegenerationScope::All, None)
        .await
        .expect_err("timeout");
    match err {
        StudioError::TimedOut { seq, after } => {
            assert_eq!(seq, 1);
            assert_eq!(after, Duration::from_secs(45));
        }
        other => panic!("expected timeout, got {other}"),
    }
    assert!(!studio.is_canvas_locked());
    assert_eq!(studio.with_editor(|editor| editor.in_flight()), None);

    studio.settle_late_results().await;
    assert_eq!(studio.document(), document());
}

#[tokio::test(start_paused = true)]
async fn test_escape_unlocks_during_call() {
    let studio = studio(SlowService(Duration::from_secs(10)));

    let (result, unlocked) = tokio::join!(
        studio.regenerate(RegenerationScope::All, None),
        async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            assert!(studio.is_canvas_locked());
            studio.handle_event(&InputEvent::Key {
                key: "Escape".into(),
                modifiers: KeyModifiers::default(),
            });
            !studio.is_canvas_locked()
        }
    );

    assert!(unlocked);
    assert_eq!(result.expect("regenerate"), RegenerationOutcome::DroppedStale);
    assert_eq!(studio.document(), document());
}

#[tokio::test(start_paused = true)]
async fn test_pointer_input_rejected_while_locked() {
    let studio = studio(SlowService(Duration::from_secs(5)));

    let (result, changed) = tokio::join!(
        studio.regenerate(RegenerationScope::TextOnly, None),
        async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let target = PointerTarget::Layer("headline".into());
            let events = [
                PointerEvent::down(540.0, 216.0, 1_000, target),
                PointerEvent::moved(640.0, 216.0, 1_016),
                PointerEvent::up(640.0, 216.0, 1_032),
            ];
            events
                .into_iter()
                .any(|event| studio.handle_event(&InputEvent::Pointer(event)))
        }
    );

    assert!(!changed);
    assert_eq!(result.expect("regenerate"), RegenerationOutcome::Applied);
    let headline = studio
        .document()
        .layer(&"headline".into())
        .expect("headline")
        .anchor();
    assert!((headline.x - 50.0).abs() < f32::EPSILON);
}

// ============================================================================
// Retry and failure
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_transient_failure_is_retried() {
    let service = Arc::new(
        ScriptedService::default()
            .reply(
                Duration::from_millis(100),
                Err(GenerationError::Unavailable("503".into())),
            )
            .reply(Duration::from_millis(100), Ok(regenerated())),
    );
    let studio = Studio::new(
        document(),
        Arc::clone(&service) as Arc<dyn GenerationService>,
        StudioConfig::default(),
    );

    let outcome = studio
        .regenerate(RegenerationScope::All, None)
        .await
        .expect("regenerate");
    assert_eq!(outcome, RegenerationOutcome::Applied);
    assert_eq!(service.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_rejection_is_not_retried() {
    let service = Arc::new(
        ScriptedService::default()
            .reply(
                Duration::from_millis(100),
                Err(GenerationError::Rejected("policy".into())),
            )
            .reply(Duration::from_millis(100), Ok(regenerated())),
    );
    let studio = Studio::new(
        document(),
        Arc::clone(&service) as Arc<dyn GenerationService>,
        StudioConfig::default(),
    );

    let err = studio
        .regenerate(RegenerationScope::All, None)
        .await
        .expect_err("rejected");
    assert!(matches!(
        err,
        StudioError::Generation(GenerationError::Rejected(_))
    ));
    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    assert!(!studio.is_canvas_locked());
    assert_eq!(studio.document(), document());
}

#[tokio::test(start_paused = true)]
async fn test_retries_exhausted() {
    let unavailable = || Err(GenerationError::Unavailable("down".into()));
    let service = ScriptedService::default()
        .reply(Duration::ZERO, unavailable())
        .reply(Duration::ZERO, unavailable());
    let config = StudioConfig {
        retry: RetryConfig {
            max_attempts: 2,
            ..RetryConfig::default()
        },
        ..StudioConfig::default()
    };
    let studio = Studio::new(document(), Arc::new(service), config);

    let err = studio
        .regenerate(RegenerationScope::All, None)
        .await
        .expect_err("unavailable");
    assert!(matches!(
        err,
        StudioError::Generation(GenerationError::Unavailable(_))
    ));
    assert!(!studio.is_canvas_locked());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_result_fails_unchanged() {
    let mut broken = regenerated();
    broken.layers.push(Layer::new("headline", LayerKind::Text));
    let service = ScriptedService::default().reply(Duration::from_millis(5), Ok(broken));
    let studio = studio(service);

    let outcome = studio
        .regenerate(RegenerationScope::All, None)
        .await
        .expect("settled");
    assert_eq!(outcome, RegenerationOutcome::Failed);
    assert_eq!(studio.document(), document());
    assert!(!studio.is_canvas_locked());
}

// ============================================================================
// Superseded requests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_newer_request_supersedes_older() {
    let mut first = document();
    first.background_color = "#ff0000".into();
    let mut second = document();
    second.background_color = "#00ff00".into();
    let service = ScriptedService::default()
        .reply(Duration::from_secs(10), Ok(first))
        .reply(Duration::from_secs(1), Ok(second));
    let studio = studio(service);

    let (older, newer) = tokio::join!(
        studio.regenerate(RegenerationScope::All, None),
        async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            studio.regenerate(RegenerationScope::All, None).await
        }
    );

    assert_eq!(older.expect("older"), RegenerationOutcome::DroppedStale);
    assert_eq!(newer.expect("newer"), RegenerationOutcome::Applied);
    assert_eq!(studio.document().background_color, "#00ff00");
}

// ============================================================================
// Script replay
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_script_drag_edit_and_undo() {
    let studio = studio(SlowService(Duration::from_secs(1)));
    let script = parse_script(
        r#"[
            {"op": "drag", "id": "headline", "dx": 10, "dy": 0},
            {"op": "edit_text", "id": "headline", "text": "Flash sale"},
            {"op": "undo"}
        ]"#,
    )
    .expect("parse");

    let reports = ScriptRunner::new()
        .run(&studio, &script)
        .await
        .expect("run");
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.changed));

    let doc = studio.document();
    let headline = doc.layer(&"headline".into()).expect("headline");
    assert!((headline.anchor().x - 60.0).abs() < 0.01);
    assert_eq!(headline.content.as_deref(), Some("Summer sale"));
}

#[tokio::test(start_paused = true)]
async fn test_script_records_timeout() {
    let studio = studio(SlowService(Duration::from_secs(60)));
    let script = parse_script(
        r#"[
            {"op": "regenerate", "scope": "text-only"},
            {"op": "drag", "id": "hero", "dx": 0, "dy": -20}
        ]"#,
    )
    .expect("parse");

    let reports = ScriptRunner::new()
        .run(&studio, &script)
        .await
        .expect("run");
    assert!(reports[0].error.as_deref().is_some_and(|e| e.contains("timed out")));
    assert!(!reports[0].changed);
    assert!(reports[1].changed);

    studio.settle_late_results().await;
    let doc = studio.document();
    assert_eq!(content(&doc, "headline").as_deref(), Some("Summer sale"));
    let hero = doc.layer(&"hero".into()).expect("hero").anchor();
    assert!((hero.y - 40.0).abs() < 0.01);
}
