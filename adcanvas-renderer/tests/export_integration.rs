//! Integration tests for design export (adcanvas-renderer).
//!
//! Tests export across formats and canvas sizes, custom configurations, and
//! edge cases.

use adcanvas_core::{
    CanvasSize, DesignDocument, ImageSource, InteractionConfig, InteractionState, Layer,
    LayerKind, LayerStyle,
};
use adcanvas_renderer::{
    Compositor, DisplayItem, ExportConfig, ExportFormat, Exporter, RenderConfig,
};

/// Create a text layer at a given percentage position.
fn text_layer(id: &str, content: &str, x: f32, y: f32) -> Layer {
    Layer::new(id, LayerKind::Text)
        .with_position(x, y)
        .with_width(80.0)
        .with_content(content)
}

/// A typical ad: background, overlay, headline, and call to action.
fn ad_document(size: CanvasSize) -> DesignDocument {
    let mut doc = DesignDocument::new(size);
    doc.background_color = "#0f172a".into();
    doc.overlay_color = Some("#000000".into());
    doc.overlay_opacity = 0.3;
    doc.add_layer(text_layer("headline", "Fresh coffee, every morning", 50.0, 25.0))
        .expect("add headline");
    doc.add_layer(
        Layer::new("cta", LayerKind::Button)
            .with_position(50.0, 80.0)
            .with_content("Order now")
            .with_style(LayerStyle {
                background_color: Some("#f97316".into()),
                ..LayerStyle::default()
            }),
    )
    .expect("add cta");
    doc
}

fn small_exporter() -> Exporter {
    Exporter::new(
        ExportConfig {
            scale: 0.25,
            ..ExportConfig::default()
        },
        RenderConfig::default(),
    )
}

// ==========================================================================
// Format coverage
// ==========================================================================

#[cfg(feature = "export")]
#[test]
fn test_all_formats_for_same_document() {
    let doc = ad_document(CanvasSize::Portrait);
    let exporter = small_exporter();

    let png = exporter
        .export_document(&doc, ExportFormat::Png)
        .expect("png");
    assert_eq!(&png[0..4], &[137, 80, 78, 71]);

    let jpeg = exporter
        .export_document(&doc, ExportFormat::Jpeg)
        .expect("jpeg");
    assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);

    let svg = exporter
        .export_document(&doc, ExportFormat::Svg)
        .expect("svg");
    let svg = String::from_utf8(svg).expect("utf8");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Order now"));
}

#[cfg(feature = "images")]
#[test]
fn test_png_dimensions_follow_canvas_size_and_scale() {
    let exporter = small_exporter();
    for (size, height) in [
        (CanvasSize::Square, 270),
        (CanvasSize::Portrait, 338),
        (CanvasSize::Story, 480),
    ] {
        let png = exporter
            .export_document(&ad_document(size), ExportFormat::Png)
            .expect("png");
        let decoded = image::load_from_memory(&png).expect("decode");
        assert_eq!(decoded.width(), 270, "{size:?}");
        assert_eq!(decoded.height(), height, "{size:?}");
    }
}

// ==========================================================================
// Chrome and interaction state
// ==========================================================================

#[test]
fn test_export_never_includes_chrome() {
    let doc = ad_document(CanvasSize::Square);
    let mut state = InteractionState::new(InteractionConfig::default());
    state.select("cta".into());
    let config = RenderConfig::default();
    let list = Compositor::new().compose(&doc, Some(&state), &config);
    assert!(list.items.iter().any(DisplayItem::is_chrome));

    let svg = Exporter::with_defaults().render_to_svg(&list);
    assert!(!svg.contains(&config.selection_color));
    assert!(svg.contains("Order now"));
}

#[test]
fn test_hidden_layers_are_not_exported() {
    let mut doc = ad_document(CanvasSize::Square);
    doc.add_layer(text_layer("draft", "Secret draft", 50.0, 50.0).with_visible(false))
        .expect("add");
    let svg = Exporter::with_defaults().render_to_svg(
        &Compositor::new().compose(&doc, None, &RenderConfig::default()),
    );
    assert!(!svg.contains("Secret draft"));
}

// ==========================================================================
// Images
// ==========================================================================

#[cfg(all(feature = "images", feature = "export"))]
#[test]
fn test_inline_image_layer_exports() {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        8,
        4,
        image::Rgba([200, 30, 30, 255]),
    ))
    .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
    .expect("encode");
    let src = ImageSource::data_uri("image/png", &bytes);

    let mut doc = ad_document(CanvasSize::Square);
    doc.add_layer(
        Layer::new("product", LayerKind::Image)
            .with_position(50.0, 50.0)
            .with_width(50.0)
            .with_content(src.clone()),
    )
    .expect("add");

    let mut compositor = Compositor::new();
    let size = adcanvas_renderer::measure_source(&src)
        .expect("measure")
        .expect("inline image has a size");
    compositor.sizes_mut().insert(src, size);
    let list = compositor.compose(&doc, None, &RenderConfig::default());
    let rect = list.layer_rect(&"product".into()).expect("painted");
    // 2:1 image at 540 wide is 270 tall.
    assert!((rect.height - 270.0).abs() < 1e-3);

    let png = small_exporter().export(&list, ExportFormat::Png).expect("png");
    assert_eq!(&png[0..4], &[137, 80, 78, 71]);
}

// ==========================================================================
// Edge cases
// ==========================================================================

#[cfg(feature = "export")]
#[test]
fn test_empty_document_all_formats() {
    let doc = DesignDocument::new(CanvasSize::Story);
    let exporter = small_exporter();
    for format in [ExportFormat::Svg, ExportFormat::Png, ExportFormat::Jpeg] {
        let bytes = exporter.export_document(&doc, format).expect("export");
        assert!(!bytes.is_empty(), "{format:?}");
    }
}

#[test]
fn test_special_characters_in_text() {
    let mut doc = DesignDocument::new(CanvasSize::Square);
    doc.add_layer(text_layer("t", "<b>\"50%\" off & more</b>", 50.0, 50.0))
        .expect("add");
    let svg = Exporter::with_defaults().render_to_svg(
        &Compositor::new().compose(&doc, None, &RenderConfig::default()),
    );
    assert!(!svg.contains("<b>"));
    assert!(svg.contains("&lt;b&gt;"));
    assert!(svg.contains("&amp;"));
}

#[cfg(feature = "export")]
#[test]
fn test_jpeg_quality_is_clamped() {
    let exporter = Exporter::new(
        ExportConfig {
            scale: 0.1,
            jpeg_quality: 0,
            ..ExportConfig::default()
        },
        RenderConfig::default(),
    );
    let jpeg = exporter
        .export_document(&ad_document(CanvasSize::Square), ExportFormat::Jpeg)
        .expect("jpeg");
    assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
}
