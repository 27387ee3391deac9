//! CLI Integration Tests
//!
//! Runs the `adcanvas` entry point against files in a temporary directory.

use std::path::Path;

use adcanvas_core::{CanvasSize, DesignDocument, Layer, LayerKind, RegenerationOutcome};
use adcanvas_studio::cli::{run, CliArgs};
use clap::Parser;

fn path(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

fn write_json(path: &Path, text: &str) {
    std::fs::write(path, text).expect("write fixture");
}

fn input_document() -> DesignDocument {
    let mut doc = DesignDocument::new(CanvasSize::Story);
    doc.add_layer(
        Layer::new("headline", LayerKind::Text)
            .with_position(50.0, 30.0)
            .with_width(70.0)
            .with_content("Fresh drop"),
    )
    .expect("add headline");
    doc.add_layer(
        Layer::new("cta", LayerKind::Button)
            .with_position(50.0, 80.0)
            .with_content("Shop now"),
    )
    .expect("add cta");
    doc
}

#[tokio::test]
async fn test_script_run_writes_outputs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("ad.json");
    let script = dir.path().join("script.json");
    let generator = dir.path().join("generated.json");
    let output = dir.path().join("out.json");
    let report = dir.path().join("report.json");
    let svg = dir.path().join("ad.svg");
    let png = dir.path().join("ad.png");

    write_json(&input, &input_document().to_json().expect("json"));
    let mut generated = input_document();
    if let Some(layer) = generated.layer_mut(&"cta".into()) {
        layer.content = Some("Grab yours".into());
    }
    generated.background_color = "#000000".into();
    write_json(&generator, &generated.to_json().expect("json"));
    write_json(
        &script,
        r#"[
            {"op": "toggle_lock", "id": "headline"},
            {"op": "drag", "id": "headline", "dx": 20, "dy": 0},
            {"op": "regenerate", "scope": "text-only"}
        ]"#,
    );

    let args = CliArgs::try_parse_from([
        "adcanvas",
        "--input",
        path(&input),
        "--script",
        path(&script),
        "--generator",
        path(&generator),
        "--output",
        path(&output),
        "--report",
        path(&report),
        "--export",
        path(&svg),
        "--export",
        path(&png),
        "--scale",
        "0.5",
    ])
    .expect("args");

    let summary = run(&args).await.expect("run");

    assert_eq!(summary.steps.len(), 3);
    assert!(!summary.steps[1].changed, "locked layer must not move");
    assert_eq!(summary.steps[2].outcome, Some(RegenerationOutcome::Applied));
    assert_eq!(summary.exported, vec![svg.clone(), png.clone()]);

    let written = DesignDocument::from_json(&std::fs::read_to_string(&output).expect("output"))
        .expect("parse output");
    assert_eq!(written, summary.document);
    let cta = written.layer(&"cta".into()).expect("cta");
    assert_eq!(cta.content.as_deref(), Some("Grab yours"));
    assert_ne!(written.background_color, "#000000");

    let steps: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(steps[2]["op"], "regenerate");
    assert_eq!(steps[2]["outcome"], "applied");

    let markup = std::fs::read_to_string(&svg).expect("svg");
    assert!(markup.starts_with("<svg"));
    assert!(markup.contains("Grab yours"));

    let raster = image::open(&png).expect("png");
    assert_eq!((raster.width(), raster.height()), (540, 960));
}

#[tokio::test]
async fn test_blank_document_without_generator() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("script.json");
    write_json(&script, r#"[{"op": "regenerate"}]"#);

    let args = CliArgs::try_parse_from([
        "adcanvas",
        "--size",
        "square",
        "--script",
        path(&script),
    ])
    .expect("args");

    let summary = run(&args).await.expect("run");
    assert_eq!(summary.document, DesignDocument::new(CanvasSize::Square));
    assert!(summary.steps[0].error.is_some());
    assert!(summary.exported.is_empty());
}

#[tokio::test]
async fn test_unknown_export_extension_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("ad.gif");
    let args = CliArgs::try_parse_from([
        "adcanvas",
        "--export",
        path(&target),
    ])
    .expect("args");

    assert!(run(&args).await.is_err());
    assert!(!target.exists());
}
